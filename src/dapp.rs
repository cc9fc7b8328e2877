//! Application controller.
//!
//! `Dapp` is the single owner of the Session. Connecting, fetching token
//! data, polling the balance and submitting transfers all run as tasks on
//! the tokio runtime and report back through `DappEvent`s; `pump` applies
//! them on the UI thread once per frame. Wallet listeners and the poller
//! are owned here too and go away with the controller.

use crate::config::{network_display_name, Config};
use crate::error::DappError;
use crate::event::DappEvent;
use crate::operation_log::TransferLog;
use crate::poller::BalancePoller;
use crate::screen::{Banners, Screen};
use crate::session::Session;
use crate::submitter::{self, TransferOutcome, TransferRequest};
use crate::token::{self, TokenClient, TokenContract};
use crate::types::TransferReceipt;
use crate::utils::{format_address, format_hash, short_address};
use crate::wallet::{self, ListenerGuard, WalletEvent, WalletProvider};
use ethers::types::Address;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

pub struct Dapp {
    config: Config,
    runtime: Handle,
    wallet: Option<Arc<dyn WalletProvider>>,
    contract: TokenContract,
    session: Session,
    last_session_id: u64,
    token: Option<Arc<dyn TokenClient>>,
    poller: Option<BalancePoller>,
    listeners: Option<ListenerGuard>,
    connecting: bool,
    events_tx: mpsc::UnboundedSender<DappEvent>,
    events_rx: mpsc::UnboundedReceiver<DappEvent>,
    transfer_log: Option<TransferLog>,
}

impl Dapp {
    /// `wallet` is `None` when no wallet is available at all.
    pub fn new(
        config: Config,
        runtime: Handle,
        wallet: Option<Arc<dyn WalletProvider>>,
        contract: TokenContract,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            runtime,
            wallet,
            contract,
            session: Session::empty(0),
            last_session_id: 0,
            token: None,
            poller: None,
            listeners: None,
            connecting: false,
            events_tx,
            events_rx,
            transfer_log: None,
        }
    }

    pub fn with_transfer_log(mut self, log: TransferLog) -> Self {
        self.transfer_log = Some(log);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn listeners_registered(&self) -> bool {
        self.listeners.as_ref().map(|l| l.is_active()).unwrap_or(false)
    }

    /// Account the running poller reads for, if any
    pub fn polled_account(&self) -> Option<Address> {
        self.poller.as_ref().filter(|p| p.is_running()).map(|p| p.account())
    }

    pub fn screen(&self) -> Screen {
        Screen::select(self.has_wallet(), &self.session)
    }

    pub fn banners(&self) -> Banners {
        Banners::from_session(&self.session)
    }

    /// Start connecting to the wallet. The result arrives as an event.
    pub fn connect(&mut self) {
        if self.connecting {
            return;
        }
        let Some(wallet) = self.wallet.clone() else {
            tracing::warn!("Connect requested but no wallet is available");
            return;
        };
        self.connecting = true;

        let expected = self.config.expected_network_id.clone();
        let events = self.events_tx.clone();
        self.runtime.spawn(async move {
            let event = match wallet::connect(Some(wallet.as_ref()), &expected).await {
                Ok(account) => DappEvent::Connected(account),
                Err(err) => DappEvent::ConnectFailed(err),
            };
            let _ = events.send(event);
        });
    }

    /// Submit a transfer from the connected account.
    pub fn transfer(&mut self, request: TransferRequest) {
        let Some(client) = self.token.clone() else {
            tracing::warn!("Transfer requested without a connected account");
            return;
        };
        self.session.begin_transaction();
        self.log_transfer(
            "transfer_requested",
            format!("to={}\namount={}", request.recipient.trim(), request.amount.trim()),
        );

        let session = self.session.id;
        let events = self.events_tx.clone();
        self.runtime
            .spawn(submitter::run_transfer(client, request, session, events));
    }

    pub fn dismiss_transaction_error(&mut self) {
        self.session.dismiss_transaction_error();
    }

    pub fn dismiss_network_error(&mut self) {
        self.session.dismiss_network_error();
    }

    /// Apply every event that has arrived. Returns notable changes for the activity list.
    pub fn pump(&mut self) -> Vec<String> {
        let mut activity = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(message) = self.apply(event) {
                activity.push(message);
            }
        }
        activity
    }

    /// Wait for the next event and apply it.
    pub async fn process_next(&mut self) -> Option<String> {
        let event = self.events_rx.recv().await?;
        self.apply(event)
    }

    pub fn apply(&mut self, event: DappEvent) -> Option<String> {
        // Transfer log entries are written even for a session that has since been reset
        match &event {
            DappEvent::TransactionSent { hash, .. } => {
                self.log_transfer("transfer_sent", format!("hash={}", format_hash(hash)));
            }
            DappEvent::TransactionSettled { outcome, .. } => self.log_outcome(outcome),
            _ => {}
        }

        if let Some(session) = event.session() {
            if session != self.session.id {
                tracing::debug!(
                    session,
                    current = self.session.id,
                    "Dropping result from a previous session"
                );
                return None;
            }
        }

        match event {
            DappEvent::Connected(account) => {
                self.connecting = false;
                self.register_listeners();
                self.initialize(account);
                Some(format!("Connected as {}", short_address(&account)))
            }
            DappEvent::ConnectFailed(err) => {
                self.connecting = false;
                let message = match &err {
                    DappError::NetworkMismatch { .. } => self.config.network_error_message(),
                    other => other.display_message(),
                };
                tracing::warn!("Connection failed: {}", message);
                self.session.network_error = Some(message.clone());
                Some(format!("Connection failed: {}", message))
            }
            DappEvent::Wallet(WalletEvent::AccountsChanged(accounts)) => match accounts.first() {
                Some(&account) => {
                    tracing::info!(account = ?account, "Wallet account changed");
                    self.initialize(account);
                    Some(format!("Switched to {}", short_address(&account)))
                }
                None => {
                    tracing::info!("Wallet no longer exposes any account");
                    self.reset();
                    Some("Wallet disconnected".to_string())
                }
            },
            DappEvent::Wallet(WalletEvent::NetworkChanged(network)) => {
                tracing::info!(network = %network, "Wallet network changed, resetting");
                self.reset();
                Some(format!("Network changed to {}", network_display_name(&network)))
            }
            DappEvent::TokenData { result, .. } => {
                match result {
                    Ok(data) => self.session.set_token_data(data),
                    Err(err) => {
                        tracing::warn!("Failed to load token data: {}", err);
                        self.session.network_error =
                            Some(format!("Failed to load token data: {}", err.display_message()));
                    }
                }
                None
            }
            DappEvent::Balance {
                account, balance, ..
            } => {
                self.session.set_balance(account, balance);
                None
            }
            DappEvent::TransactionSent { hash, .. } => {
                self.session.transaction_sent(hash);
                Some(format!("Transaction {} sent", format_hash(&hash)))
            }
            DappEvent::TransactionSettled { outcome, .. } => {
                self.session.transaction_settled(&outcome);
                match outcome {
                    TransferOutcome::Confirmed(receipt) => {
                        Some(format!("Transaction {} confirmed", format_hash(&receipt.hash)))
                    }
                    TransferOutcome::Rejected => None,
                    TransferOutcome::Failed(err) => {
                        Some(format!("Transaction failed: {}", err.display_message()))
                    }
                }
            }
        }
    }

    fn register_listeners(&mut self) {
        let Some(wallet) = self.wallet.as_ref() else {
            return;
        };
        // A reconnect replaces the previous registration
        self.listeners = Some(ListenerGuard::register(
            &self.runtime,
            wallet.as_ref(),
            self.events_tx.clone(),
            DappEvent::Wallet,
        ));
    }

    fn next_session_id(&mut self) -> u64 {
        self.last_session_id += 1;
        self.last_session_id
    }

    /// Build a fresh session for `account`, fetch its token data and start polling.
    fn initialize(&mut self, account: Address) {
        let Some(wallet) = self.wallet.clone() else {
            return;
        };
        // Stop the old poller before anything else can be read for the new account
        self.poller = None;

        let id = self.next_session_id();
        self.session = Session::for_account(id, account);
        let client = wallet.token_client(&self.contract, account);
        self.token = Some(client.clone());

        let events = self.events_tx.clone();
        let fetch_client = client.clone();
        self.runtime.spawn(async move {
            let result = token::fetch_token_data(fetch_client.as_ref()).await;
            let _ = events.send(DappEvent::TokenData {
                session: id,
                result,
            });
        });

        self.poller = Some(BalancePoller::start(
            &self.runtime,
            client,
            account,
            id,
            self.config.poll_interval,
            self.events_tx.clone(),
        ));
        tracing::info!(account = %format_address(&account), session = id, "Session initialized");
    }

    /// Drop everything session-related. Listeners stay registered.
    fn reset(&mut self) {
        self.poller = None;
        self.token = None;
        let id = self.next_session_id();
        self.session = Session::empty(id);
    }

    fn log_outcome(&self, outcome: &TransferOutcome) {
        match outcome {
            TransferOutcome::Confirmed(receipt) => {
                self.log_transfer("transfer_confirmed", receipt_details(receipt))
            }
            TransferOutcome::Rejected => self.log_transfer("transfer_rejected", ""),
            TransferOutcome::Failed(err) => {
                self.log_transfer("transfer_failed", format!("error={}", err.display_message()))
            }
        }
    }

    fn log_transfer(&self, event: &str, details: impl AsRef<str>) {
        if let Some(log) = &self.transfer_log {
            if let Err(e) = log.append(event, &self.config.expected_network_id, details) {
                tracing::warn!("Failed to write transfer log: {}", e);
            }
        }
    }
}

/// Transfer log lines for a mined transfer; fields the node left out are skipped.
fn receipt_details(receipt: &TransferReceipt) -> String {
    let mut details = format!("hash={}", format_hash(&receipt.hash));
    if let Some(block) = receipt.block_number {
        details.push_str(&format!("\nblock={}", block));
    }
    if let Some(gas_used) = receipt.gas_used {
        details.push_str(&format!("\ngas_used={}", gas_used));
    }
    details
}
