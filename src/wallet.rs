//! Wallet connector.
//!
//! `WalletProvider` is what a wallet exposes to the app: account access,
//! the active network id, change notifications and a way to get a token
//! client that signs with one of its accounts.

use crate::error::{DappError, ERROR_CODE_METHOD_NOT_FOUND};
use crate::token::{TokenClient, TokenContract};
use async_trait::async_trait;
use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Notification pushed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The exposed accounts changed; empty when the app lost access.
    AccountsChanged(Vec<Address>),
    /// The wallet switched networks (new `net_version` value).
    NetworkChanged(String),
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError>;

    /// Accounts already exposed without prompting (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<Address>, DappError>;

    /// Active network id as reported by `net_version`.
    async fn network_id(&self) -> Result<String, DappError>;

    /// Receive account/network notifications from now on.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// Token handle that signs with `signer`.
    fn token_client(&self, contract: &TokenContract, signer: Address) -> Arc<dyn TokenClient>;
}

/// Request access and check the network.
///
/// Returns the first exposed account when the wallet is on
/// `expected_network_id`. Nothing is initialized on failure.
pub async fn connect(
    provider: Option<&dyn WalletProvider>,
    expected_network_id: &str,
) -> Result<Address, DappError> {
    let provider = provider.ok_or(DappError::NoWalletDetected)?;

    let accounts = match provider.request_accounts().await {
        Ok(accounts) => accounts,
        // Plain nodes don't implement eth_requestAccounts; their accounts are already exposed
        Err(e) if e.code() == Some(ERROR_CODE_METHOD_NOT_FOUND) => {
            tracing::debug!("eth_requestAccounts not supported, using eth_accounts");
            provider.accounts().await?
        }
        Err(e) => return Err(e),
    };
    let selected = accounts.first().copied().ok_or(DappError::MissingAccount)?;

    let network_id = provider.network_id().await?;
    if network_id != expected_network_id {
        tracing::warn!(
            expected = expected_network_id,
            actual = %network_id,
            "Wallet is connected to the wrong network"
        );
        return Err(DappError::NetworkMismatch {
            expected: expected_network_id.to_string(),
            actual: network_id,
        });
    }

    tracing::info!(account = ?selected, network = %network_id, "Wallet connected");
    Ok(selected)
}

/// Registration of the account/network listeners.
///
/// Wallet events are forwarded into the owner's channel until the guard is
/// dropped, which deregisters them.
pub struct ListenerGuard {
    token: CancellationToken,
}

impl ListenerGuard {
    /// Forward every wallet event through `map` into `sink`.
    pub fn register<T, F>(
        runtime: &tokio::runtime::Handle,
        provider: &dyn WalletProvider,
        sink: mpsc::UnboundedSender<T>,
        map: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(WalletEvent) -> T + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        let mut events = provider.subscribe();

        runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            if sink.send(map(event)).is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Wallet listener lagged behind");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("Wallet listeners deregistered");
        });

        Self { token }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWallet;
    use std::time::Duration;

    fn account(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn test_connect_without_provider_fails() {
        let err = connect(None, "1337").await.unwrap_err();
        assert!(matches!(err, DappError::NoWalletDetected));
    }

    #[tokio::test]
    async fn test_connect_matching_network_returns_first_account() {
        let wallet = MockWallet::new(vec![account(1), account(2)], "1337");
        let selected = connect(Some(&wallet), "1337").await.unwrap();
        assert_eq!(selected, account(1));
    }

    #[tokio::test]
    async fn test_connect_mismatched_network_fails() {
        let wallet = MockWallet::new(vec![account(1)], "1");
        let err = connect(Some(&wallet), "1337").await.unwrap_err();
        match err {
            DappError::NetworkMismatch { expected, actual } => {
                assert_eq!(expected, "1337");
                assert_eq!(actual, "1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connect_falls_back_to_eth_accounts() {
        let wallet = MockWallet::new(vec![account(3)], "1337");
        wallet.fail_request_accounts(DappError::from_rpc(
            ERROR_CODE_METHOD_NOT_FOUND,
            "Method eth_requestAccounts not found",
            None,
        ));
        let selected = connect(Some(&wallet), "1337").await.unwrap();
        assert_eq!(selected, account(3));
    }

    #[tokio::test]
    async fn test_connect_user_rejection_propagates() {
        let wallet = MockWallet::new(vec![account(1)], "1337");
        wallet.fail_request_accounts(DappError::from_rpc(4001, "User rejected the request.", None));
        let err = connect(Some(&wallet), "1337").await.unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[tokio::test]
    async fn test_connect_no_accounts_fails() {
        let wallet = MockWallet::new(vec![], "1337");
        let err = connect(Some(&wallet), "1337").await.unwrap_err();
        assert!(matches!(err, DappError::MissingAccount));
    }

    #[tokio::test]
    async fn test_listener_guard_forwards_until_dropped() {
        let wallet = MockWallet::new(vec![account(1)], "1337");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = ListenerGuard::register(&tokio::runtime::Handle::current(), &wallet, tx, |e| e);
        assert!(guard.is_active());

        wallet.emit(WalletEvent::NetworkChanged("5".into()));
        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(received, Some(WalletEvent::NetworkChanged("5".into())));

        drop(guard);
        // The forwarder exits and drops its sender
        let closed = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(closed, None);
    }
}
