//! In-memory wallet and token used by the unit tests.

use crate::error::DappError;
use crate::token::{TokenClient, TokenContract};
use crate::types::{PendingTransfer, TransferReceipt};
use crate::wallet::{WalletEvent, WalletProvider};
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

pub struct MockToken {
    pub name: String,
    pub symbol: String,
    balances: Mutex<HashMap<Address, U256>>,
    metadata_error: Mutex<Option<DappError>>,
    transfer_error: Mutex<Option<DappError>>,
    wait_error: Mutex<Option<DappError>>,
    receipt_status: Mutex<Option<u64>>,
    transfers: Mutex<Vec<(Address, U256)>>,
    balance_reads: AtomicUsize,
    mining_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockToken {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            balances: Mutex::new(HashMap::new()),
            metadata_error: Mutex::new(None),
            transfer_error: Mutex::new(None),
            wait_error: Mutex::new(None),
            receipt_status: Mutex::new(Some(1)),
            transfers: Mutex::new(Vec::new()),
            balance_reads: AtomicUsize::new(0),
            mining_gate: Mutex::new(None),
        }
    }

    pub fn set_balance(&self, owner: Address, balance: u64) {
        self.balances.lock().unwrap().insert(owner, U256::from(balance));
    }

    pub fn fail_metadata(&self, err: DappError) {
        *self.metadata_error.lock().unwrap() = Some(err);
    }

    pub fn fail_transfer(&self, err: DappError) {
        *self.transfer_error.lock().unwrap() = Some(err);
    }

    pub fn fail_wait(&self, err: DappError) {
        *self.wait_error.lock().unwrap() = Some(err);
    }

    pub fn set_receipt_status(&self, status: Option<u64>) {
        *self.receipt_status.lock().unwrap() = status;
    }

    /// Hold every `wait_mined` call until the returned notifier fires.
    pub fn hold_mining(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.mining_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn transfers(&self) -> Vec<(Address, U256)> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn balance_reads(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }
}

pub fn tx_hash(n: u8) -> H256 {
    H256::repeat_byte(n)
}

#[async_trait]
impl TokenClient for MockToken {
    async fn name(&self) -> Result<String, DappError> {
        let err = self.metadata_error.lock().unwrap().clone();
        match err {
            Some(err) => Err(err),
            None => Ok(self.name.clone()),
        }
    }

    async fn symbol(&self) -> Result<String, DappError> {
        Ok(self.symbol.clone())
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, DappError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&owner)
            .copied()
            .unwrap_or_default())
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTransfer, DappError> {
        if let Some(err) = self.transfer_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push((to, amount));
        Ok(PendingTransfer {
            hash: tx_hash(transfers.len() as u8),
        })
    }

    async fn wait_mined(&self, pending: PendingTransfer) -> Result<TransferReceipt, DappError> {
        let gate = self.mining_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let err = self.wait_error.lock().unwrap().clone();
        if let Some(err) = err {
            return Err(err);
        }
        Ok(TransferReceipt {
            hash: pending.hash,
            status: *self.receipt_status.lock().unwrap(),
            block_number: Some(1),
            gas_used: Some(U256::from(51_000u64)),
        })
    }
}

pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    network: Mutex<String>,
    request_error: Mutex<Option<DappError>>,
    events: broadcast::Sender<WalletEvent>,
    token: Arc<MockToken>,
    signers: Mutex<Vec<Address>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>, network: &str) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(accounts),
            network: Mutex::new(network.to_string()),
            request_error: Mutex::new(None),
            events,
            token: Arc::new(MockToken::new("My Hardhat Token", "MHT")),
            signers: Mutex::new(Vec::new()),
        }
    }

    pub fn token(&self) -> Arc<MockToken> {
        self.token.clone()
    }

    pub fn fail_request_accounts(&self, err: DappError) {
        *self.request_error.lock().unwrap() = Some(err);
    }

    pub fn set_network(&self, network: &str) {
        *self.network.lock().unwrap() = network.to_string();
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    /// Signers token clients were requested for, in order.
    pub fn signers(&self) -> Vec<Address> {
        self.signers.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, DappError> {
        let err = self.request_error.lock().unwrap().clone();
        if let Some(err) = err {
            return Err(err);
        }
        self.accounts().await
    }

    async fn accounts(&self) -> Result<Vec<Address>, DappError> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn network_id(&self) -> Result<String, DappError> {
        Ok(self.network.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn token_client(&self, _contract: &TokenContract, signer: Address) -> Arc<dyn TokenClient> {
        self.signers.lock().unwrap().push(signer);
        self.token.clone()
    }
}
