//! Session state of the connected wallet.

use crate::error::DappError;
use crate::submitter::TransferOutcome;
use crate::types::TokenData;
use ethers::types::{Address, TxHash, U256};

/// Everything the view layer renders from.
///
/// A session is never patched across an account or network change: the
/// owner replaces it with a fresh one carrying a new `id`, and results
/// from tasks started for an older id are dropped.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub id: u64,
    pub account: Option<Address>,
    pub token_data: Option<TokenData>,
    pub balance: Option<U256>,
    pub pending_tx: Option<TxHash>,
    pub transaction_error: Option<DappError>,
    pub network_error: Option<String>,
}

impl Session {
    pub fn empty(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn for_account(id: u64, account: Address) -> Self {
        Self {
            id,
            account: Some(account),
            ..Self::default()
        }
    }

    /// True when nothing but the id is set.
    pub fn is_empty(&self) -> bool {
        self.account.is_none()
            && self.token_data.is_none()
            && self.balance.is_none()
            && self.pending_tx.is_none()
            && self.transaction_error.is_none()
            && self.network_error.is_none()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn set_token_data(&mut self, data: TokenData) {
        if self.is_connected() {
            self.token_data = Some(data);
        }
    }

    /// Store a balance read for `account`. Reads for any other account are ignored.
    pub fn set_balance(&mut self, account: Address, balance: U256) -> bool {
        if self.account == Some(account) {
            self.balance = Some(balance);
            true
        } else {
            false
        }
    }

    /// A new submission only ever shows its own error.
    pub fn begin_transaction(&mut self) {
        self.transaction_error = None;
    }

    pub fn transaction_sent(&mut self, hash: TxHash) {
        self.pending_tx = Some(hash);
    }

    /// Conclude a submission: the pending hash goes away whatever happened.
    pub fn transaction_settled(&mut self, outcome: &TransferOutcome) {
        self.pending_tx = None;
        if let TransferOutcome::Failed(err) = outcome {
            self.transaction_error = Some(err.clone());
        }
    }

    pub fn dismiss_transaction_error(&mut self) {
        self.transaction_error = None;
    }

    pub fn dismiss_network_error(&mut self) {
        self.network_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tx_hash;
    use crate::types::TransferReceipt;

    #[test]
    fn test_empty_session_is_empty() {
        let session = Session::empty(3);
        assert!(session.is_empty());
        assert_eq!(session.id, 3);
        assert!(!session.is_connected());
    }

    #[test]
    fn test_for_account_only_sets_account() {
        let account = Address::repeat_byte(1);
        let session = Session::for_account(1, account);
        assert_eq!(session.account, Some(account));
        assert!(session.token_data.is_none());
        assert!(session.balance.is_none());
        assert!(!session.is_empty());
    }

    #[test]
    fn test_set_balance_ignores_other_accounts() {
        let account = Address::repeat_byte(1);
        let mut session = Session::for_account(1, account);

        assert!(!session.set_balance(Address::repeat_byte(2), U256::from(7u64)));
        assert!(session.balance.is_none());

        assert!(session.set_balance(account, U256::from(7u64)));
        assert_eq!(session.balance, Some(U256::from(7u64)));
    }

    #[test]
    fn test_set_token_data_requires_account() {
        let data = TokenData {
            name: "My Hardhat Token".into(),
            symbol: "MHT".into(),
        };
        let mut session = Session::empty(1);
        session.set_token_data(data.clone());
        assert!(session.token_data.is_none());

        let mut session = Session::for_account(1, Address::repeat_byte(1));
        session.set_token_data(data.clone());
        assert_eq!(session.token_data, Some(data));
    }

    #[test]
    fn test_settled_always_clears_pending() {
        let outcomes = [
            TransferOutcome::Confirmed(TransferReceipt {
                hash: tx_hash(1),
                status: Some(1),
                block_number: Some(1),
                gas_used: None,
            }),
            TransferOutcome::Rejected,
            TransferOutcome::Failed(DappError::TransactionFailed),
        ];
        for outcome in outcomes.iter() {
            let mut session = Session::for_account(1, Address::repeat_byte(1));
            session.transaction_sent(tx_hash(1));
            session.transaction_settled(outcome);
            assert!(session.pending_tx.is_none(), "pending left after {outcome:?}");
        }
    }

    #[test]
    fn test_settled_records_only_failures() {
        let mut session = Session::for_account(1, Address::repeat_byte(1));
        session.transaction_settled(&TransferOutcome::Rejected);
        assert!(session.transaction_error.is_none());

        session.transaction_settled(&TransferOutcome::Failed(DappError::TransactionFailed));
        assert_eq!(
            session.transaction_error.as_ref().map(|e| e.display_message()),
            Some("Transaction failed".to_string())
        );

        session.begin_transaction();
        assert!(session.transaction_error.is_none());
    }

    #[test]
    fn test_dismiss_errors() {
        let mut session = Session::empty(1);
        session.network_error = Some("Please connect Metamask to Localhost:8545".into());
        session.transaction_error = Some(DappError::TransactionFailed);
        session.dismiss_network_error();
        session.dismiss_transaction_error();
        assert!(session.is_empty());
    }
}
