//! Wallet backed by a JSON-RPC node with unlocked accounts (Hardhat, anvil).
//!
//! The node signs transactions itself, so the only thing the app chooses
//! is which of its accounts to send from. Account and network changes are
//! noticed by polling and pushed to subscribers as `WalletEvent`s.

use crate::config::Config;
use crate::error::DappError;
use crate::token::{Erc20Token, TokenClient, TokenContract};
use crate::wallet::{WalletEvent, WalletProvider};
use anyhow::Result;
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::Address;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const EVENT_CAPACITY: usize = 32;

#[derive(Default)]
struct WalletState {
    /// Accounts as last reported by the node
    known: Vec<Address>,
    /// Index into `known` the app sends from
    selected: usize,
    /// Set by `disconnect`; the app sees no accounts until reconnected
    detached: bool,
    /// Last `net_version` the watcher read
    network: Option<String>,
}

impl WalletState {
    /// Node accounts with the selected one first
    fn exposed(&self) -> Vec<Address> {
        if self.detached {
            return Vec::new();
        }
        order_accounts(&self.known, self.selected)
    }
}

/// Put `accounts[selected]` first, keeping the rest in node order.
fn order_accounts(accounts: &[Address], selected: usize) -> Vec<Address> {
    match accounts.get(selected) {
        Some(&first) => std::iter::once(first)
            .chain(
                accounts
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != selected)
                    .map(|(_, a)| *a),
            )
            .collect(),
        None => accounts.to_vec(),
    }
}

struct Shared {
    provider: Arc<Provider<Http>>,
    state: Mutex<WalletState>,
    events: broadcast::Sender<WalletEvent>,
}

impl Shared {
    fn emit(&self, event: WalletEvent) {
        // No receivers just means nobody is listening yet
        let _ = self.events.send(event);
    }

    async fn fetch_accounts(&self) -> Result<Vec<Address>, DappError> {
        Ok(self.provider.get_accounts().await?)
    }

    /// Store a fresh account list. Returns the exposed list when it changed.
    fn update_accounts(&self, accounts: Vec<Address>) -> Option<Vec<Address>> {
        let mut state = self.lock_state();
        if state.known == accounts {
            return None;
        }
        // Follow the selected account if it moved, otherwise fall back to the first
        let selected = state
            .known
            .get(state.selected)
            .and_then(|previous| accounts.iter().position(|a| a == previous))
            .unwrap_or(0);
        state.known = accounts;
        state.selected = selected;
        Some(state.exposed())
    }

    /// Record a network reading. True when it differs from the previous one.
    fn update_network(&self, network: String) -> bool {
        let mut state = self.lock_state();
        let changed = state
            .network
            .as_ref()
            .is_some_and(|previous| *previous != network);
        state.network = Some(network);
        changed
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, WalletState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub struct NodeWallet {
    shared: Arc<Shared>,
    poll_interval: Duration,
    watcher: Option<CancellationToken>,
}

impl NodeWallet {
    pub fn new(provider: Arc<Provider<Http>>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                provider,
                state: Mutex::new(WalletState::default()),
                events,
            }),
            poll_interval,
            watcher: None,
        }
    }

    /// Wallet for the configured endpoint, or `None` when no endpoint is set.
    ///
    /// The watcher task is started on `runtime`.
    pub fn detect(config: &Config, runtime: &Handle) -> Result<Option<Self>> {
        if config.rpc_url.is_none() {
            tracing::info!("No wallet endpoint configured");
            return Ok(None);
        }
        let provider = config.get_provider()?;
        let mut wallet = Self::new(provider, config.poll_interval);
        wallet.start_watching(runtime);
        Ok(Some(wallet))
    }

    /// Poll the node for account and network changes until dropped.
    pub fn start_watching(&mut self, runtime: &Handle) {
        if let Some(previous) = self.watcher.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let shared = self.shared.clone();
        let period = self.poll_interval;

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match shared.provider.get_net_version().await {
                    Ok(network) => {
                        if shared.update_network(network.clone()) {
                            tracing::info!(to = %network, "Node network changed");
                            shared.emit(WalletEvent::NetworkChanged(network));
                        }
                    }
                    Err(e) => tracing::debug!("net_version poll failed: {}", e),
                }

                match shared.fetch_accounts().await {
                    Ok(accounts) => {
                        let detached = shared.lock_state().detached;
                        if let Some(exposed) = shared.update_accounts(accounts) {
                            if !detached {
                                shared.emit(WalletEvent::AccountsChanged(exposed));
                            }
                        }
                    }
                    Err(e) => tracing::debug!("eth_accounts poll failed: {}", e),
                }
            }
            tracing::debug!("Node wallet watcher stopped");
        });

        self.watcher = Some(token);
    }

    /// Network the node last reported, if it has answered yet
    pub fn network(&self) -> Option<String> {
        self.shared.lock_state().network.clone()
    }

    /// Accounts the node exposes, in node order
    pub fn known_accounts(&self) -> Vec<Address> {
        self.shared.lock_state().known.clone()
    }

    pub fn selected_account(&self) -> Option<Address> {
        let state = self.shared.lock_state();
        if state.detached {
            return None;
        }
        state.known.get(state.selected).copied()
    }

    /// Switch the sending account; connected apps see `AccountsChanged`.
    pub fn select_account(&self, index: usize) -> Result<(), DappError> {
        let exposed = {
            let mut state = self.shared.lock_state();
            if index >= state.known.len() {
                return Err(DappError::InvalidInput(format!(
                    "Account index {} out of range ({} accounts)",
                    index,
                    state.known.len()
                )));
            }
            if state.selected == index && !state.detached {
                return Ok(());
            }
            state.selected = index;
            state.detached = false;
            state.exposed()
        };
        tracing::info!(account = ?exposed.first(), "Selected wallet account");
        self.shared.emit(WalletEvent::AccountsChanged(exposed));
        Ok(())
    }

    /// Stop exposing accounts to the app.
    pub fn disconnect(&self) {
        self.shared.lock_state().detached = true;
        tracing::info!("Wallet disconnected from app");
        self.shared.emit(WalletEvent::AccountsChanged(Vec::new()));
    }
}

impl Drop for NodeWallet {
    fn drop(&mut self) {
        if let Some(token) = self.watcher.take() {
            token.cancel();
        }
    }
}

#[async_trait]
impl WalletProvider for NodeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        // Nodes answer eth_accounts directly; connecting clears a previous disconnect
        let accounts = self.shared.fetch_accounts().await?;
        self.shared.update_accounts(accounts);
        let mut state = self.shared.lock_state();
        state.detached = false;
        Ok(state.exposed())
    }

    async fn accounts(&self) -> Result<Vec<Address>, DappError> {
        let accounts = self.shared.fetch_accounts().await?;
        self.shared.update_accounts(accounts);
        Ok(self.shared.lock_state().exposed())
    }

    async fn network_id(&self) -> Result<String, DappError> {
        Ok(self.shared.provider.get_net_version().await?)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.shared.events.subscribe()
    }

    fn token_client(&self, contract: &TokenContract, signer: Address) -> Arc<dyn TokenClient> {
        Arc::new(Erc20Token::new(
            self.shared.provider.clone(),
            contract.clone(),
            signer,
        ))
    }
}
