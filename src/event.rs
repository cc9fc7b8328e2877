//! Messages background tasks send back to the application controller.

use crate::error::DappError;
use crate::submitter::TransferOutcome;
use crate::types::TokenData;
use crate::wallet::WalletEvent;
use ethers::types::{Address, TxHash, U256};

/// Every variant that belongs to a session carries that session's id so
/// the controller can drop results that arrive after a reset.
#[derive(Debug, Clone)]
pub enum DappEvent {
    Connected(Address),
    ConnectFailed(DappError),
    Wallet(WalletEvent),
    TokenData {
        session: u64,
        result: Result<TokenData, DappError>,
    },
    Balance {
        session: u64,
        account: Address,
        balance: U256,
    },
    TransactionSent {
        session: u64,
        hash: TxHash,
    },
    TransactionSettled {
        session: u64,
        outcome: TransferOutcome,
    },
}

impl DappEvent {
    /// Session the event was produced for, if it is session-scoped.
    pub fn session(&self) -> Option<u64> {
        match self {
            DappEvent::TokenData { session, .. }
            | DappEvent::Balance { session, .. }
            | DappEvent::TransactionSent { session, .. }
            | DappEvent::TransactionSettled { session, .. } => Some(*session),
            DappEvent::Connected(_) | DappEvent::ConnectFailed(_) | DappEvent::Wallet(_) => None,
        }
    }
}
