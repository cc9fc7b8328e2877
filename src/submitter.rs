//! Transfer submission lifecycle: send, report the hash, wait for mining,
//! classify the result.
//!
//! A transfer can fail in several places: the user can reject it in the
//! wallet, it can fail before reaching the network (bad input, not enough
//! gas), and it can revert once mined. All of them end in exactly one
//! [`TransferOutcome`]. Nothing is retried.

use crate::error::DappError;
use crate::event::DappEvent;
use crate::token::TokenClient;
use crate::types::TransferReceipt;
use crate::utils::{parse_recipient, parse_token_amount};
use ethers::types::TxHash;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum TransferOutcome {
    /// Mined with a success status
    Confirmed(TransferReceipt),
    /// The user declined in the wallet; nothing is shown
    Rejected,
    /// Anything else; shown to the user
    Failed(DappError),
}

impl TransferOutcome {
    pub fn from_result(result: Result<TransferReceipt, DappError>) -> Self {
        match result {
            Ok(receipt) => TransferOutcome::Confirmed(receipt),
            Err(err) if err.is_user_rejection() => {
                tracing::info!("Transfer rejected by user");
                TransferOutcome::Rejected
            }
            Err(err) => {
                tracing::error!("Transfer failed: {:?}", err);
                TransferOutcome::Failed(err)
            }
        }
    }
}

/// Form input for one transfer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
}

impl TransferRequest {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Both fields filled in; the form only submits then
    pub fn is_complete(&self) -> bool {
        !self.recipient.trim().is_empty() && !self.amount.trim().is_empty()
    }
}

/// Send `request` and wait for it to be mined.
///
/// `on_sent` runs once the wallet has returned the transaction hash, before
/// mining is awaited.
pub async fn submit_transfer<F>(
    client: &dyn TokenClient,
    request: &TransferRequest,
    on_sent: F,
) -> TransferOutcome
where
    F: FnOnce(TxHash) + Send,
{
    TransferOutcome::from_result(send_and_confirm(client, request, on_sent).await)
}

async fn send_and_confirm<F>(
    client: &dyn TokenClient,
    request: &TransferRequest,
    on_sent: F,
) -> Result<TransferReceipt, DappError>
where
    F: FnOnce(TxHash) + Send,
{
    let to = parse_recipient(&request.recipient)?;
    let amount = parse_token_amount(&request.amount)?;

    let pending = client.transfer(to, amount).await?;
    on_sent(pending.hash);

    let receipt = client.wait_mined(pending).await?;
    if !receipt.succeeded() {
        // The receipt doesn't say why it reverted
        return Err(DappError::TransactionFailed);
    }
    tracing::info!(
        hash = ?receipt.hash,
        block = ?receipt.block_number,
        gas_used = ?receipt.gas_used,
        "Transfer mined"
    );
    Ok(receipt)
}

/// Task body: run one submission and report it to the controller.
///
/// `TransactionSettled` is sent on every path, which is what clears the
/// pending hash.
pub async fn run_transfer(
    client: Arc<dyn TokenClient>,
    request: TransferRequest,
    session: u64,
    events: mpsc::UnboundedSender<DappEvent>,
) -> TransferOutcome {
    let sent = events.clone();
    let outcome = submit_transfer(client.as_ref(), &request, move |hash| {
        let _ = sent.send(DappEvent::TransactionSent { session, hash });
    })
    .await;
    let _ = events.send(DappEvent::TransactionSettled {
        session,
        outcome: outcome.clone(),
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tx_hash, MockToken};
    use ethers::types::{Address, U256};
    use std::sync::Mutex;

    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn request(amount: &str) -> TransferRequest {
        TransferRequest::new(RECIPIENT, amount)
    }

    #[tokio::test]
    async fn test_confirmed_transfer() {
        let token = MockToken::new("My Hardhat Token", "MHT");
        let sent = Mutex::new(None);
        let outcome = submit_transfer(&token, &request("5"), |hash| {
            *sent.lock().unwrap() = Some(hash);
        })
        .await;

        match &outcome {
            TransferOutcome::Confirmed(receipt) => {
                assert_eq!(receipt.hash, tx_hash(1));
                assert_eq!(receipt.gas_used, Some(U256::from(51_000u64)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(*sent.lock().unwrap(), Some(tx_hash(1)));
        assert_eq!(
            token.transfers(),
            vec![(RECIPIENT.parse::<Address>().unwrap(), U256::from(5u64))]
        );
    }

    #[tokio::test]
    async fn test_status_zero_is_transaction_failed() {
        let token = MockToken::new("My Hardhat Token", "MHT");
        token.set_receipt_status(Some(0));
        let outcome = submit_transfer(&token, &request("5"), |_| {}).await;
        match outcome {
            TransferOutcome::Failed(err) => assert_eq!(err.display_message(), "Transaction failed"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_status_counts_as_success() {
        let token = MockToken::new("My Hardhat Token", "MHT");
        token.set_receipt_status(None);
        let outcome = submit_transfer(&token, &request("5"), |_| {}).await;
        assert!(matches!(outcome, TransferOutcome::Confirmed(_)));
    }

    #[tokio::test]
    async fn test_user_rejection_is_suppressed() {
        let token = MockToken::new("My Hardhat Token", "MHT");
        token.fail_transfer(DappError::from_rpc(4001, "User denied transaction signature.", None));
        let sent = Mutex::new(false);
        let outcome = submit_transfer(&token, &request("5"), |_| *sent.lock().unwrap() = true).await;
        assert!(matches!(outcome, TransferOutcome::Rejected));
        assert!(!*sent.lock().unwrap());
    }

    #[tokio::test]
    async fn test_rpc_error_keeps_nested_message() {
        let token = MockToken::new("My Hardhat Token", "MHT");
        token.fail_transfer(DappError::from_rpc(
            -32603,
            "Internal JSON-RPC error.",
            Some(serde_json::json!({ "message": "Error: VM Exception while processing transaction: reverted with reason string 'Not enough tokens'" })),
        ));
        let outcome = submit_transfer(&token, &request("5000"), |_| {}).await;
        match outcome {
            TransferOutcome::Failed(err) => {
                assert!(err.display_message().contains("Not enough tokens"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_input_fails_without_sending() {
        let token = MockToken::new("My Hardhat Token", "MHT");
        let outcome = submit_transfer(&token, &TransferRequest::new("0xabc", "5"), |_| {}).await;
        assert!(matches!(outcome, TransferOutcome::Failed(DappError::InvalidInput(_))));

        let outcome = submit_transfer(&token, &request("1.5"), |_| {}).await;
        assert!(matches!(outcome, TransferOutcome::Failed(DappError::InvalidInput(_))));
        assert!(token.transfers().is_empty());
    }

    #[tokio::test]
    async fn test_run_transfer_reports_sent_then_settled() {
        let token: Arc<dyn TokenClient> = Arc::new(MockToken::new("My Hardhat Token", "MHT"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = run_transfer(token, request("5"), 7, tx).await;
        assert!(matches!(outcome, TransferOutcome::Confirmed(_)));

        match rx.recv().await {
            Some(DappEvent::TransactionSent { session, hash }) => {
                assert_eq!(session, 7);
                assert_eq!(hash, tx_hash(1));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await {
            Some(DappEvent::TransactionSettled { session, outcome }) => {
                assert_eq!(session, 7);
                assert!(matches!(outcome, TransferOutcome::Confirmed(_)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_transfer_settles_on_early_failure() {
        let token = Arc::new(MockToken::new("My Hardhat Token", "MHT"));
        token.fail_transfer(DappError::Transport("connection refused".into()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_transfer(token, request("5"), 2, tx).await;

        // No hash was produced, so the only event is the settlement
        match rx.recv().await {
            Some(DappEvent::TransactionSettled { outcome, .. }) => {
                assert!(matches!(outcome, TransferOutcome::Failed(DappError::Transport(_))));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_request_is_complete() {
        assert!(TransferRequest::new(RECIPIENT, "1").is_complete());
        assert!(!TransferRequest::new(RECIPIENT, " ").is_complete());
        assert!(!TransferRequest::new("", "1").is_complete());
    }
}
