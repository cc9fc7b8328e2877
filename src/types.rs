//! Common types shared across modules.

use ethers::prelude::*;

/// Token metadata read once per connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub name: String,
    pub symbol: String,
}

/// A transfer that has been accepted by the wallet but not mined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransfer {
    pub hash: TxHash,
}

/// The parts of a mined receipt the submitter looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub hash: TxHash,
    /// `Some(0)` means the transaction reverted. Pre-Byzantium receipts have no status.
    pub status: Option<u64>,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

impl TransferReceipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }
}

impl From<TransactionReceipt> for TransferReceipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            hash: receipt.transaction_hash,
            status: receipt.status.map(|s| s.as_u64()),
            block_number: receipt.block_number.map(|b| b.as_u64()),
            gas_used: receipt.gas_used,
        }
    }
}
