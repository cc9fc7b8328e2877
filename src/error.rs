//! Error taxonomy for wallet and token operations.
//!
//! Every error raised by an async operation is caught where it happens and
//! turned into a Session field, so this type carries everything the view
//! layer needs to render it: a code for classification and a best-effort
//! human-readable message.

use ethers::providers::{ProviderError, RpcError};
use ethers::types::TxHash;
use thiserror::Error;

/// Error code a wallet returns when the user declines a request (EIP-1193).
pub const ERROR_CODE_TX_REJECTED_BY_USER: i64 = 4001;

/// JSON-RPC "method not found".
pub const ERROR_CODE_METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Clone, Error)]
pub enum DappError {
    #[error("No Ethereum wallet was detected")]
    NoWalletDetected,

    #[error("Wallet is on network {actual}, expected {expected}")]
    NetworkMismatch { expected: String, actual: String },

    #[error("{message}")]
    UserRejected { message: String },

    #[error("Transaction failed")]
    TransactionFailed,

    #[error("Transaction {0:?} was dropped before being mined")]
    TransactionDropped(TxHash),

    #[error("{message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Contract interface error: {0}")]
    Abi(String),

    #[error("Wallet returned no accounts")]
    MissingAccount,
}

impl DappError {
    /// Build an error from a JSON-RPC error response.
    pub fn from_rpc(code: i64, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        let message = message.into();
        if code == ERROR_CODE_TX_REJECTED_BY_USER {
            DappError::UserRejected { message }
        } else {
            DappError::Rpc { code, message, data }
        }
    }

    /// The wallet/RPC error code, when there is one.
    pub fn code(&self) -> Option<i64> {
        match self {
            DappError::UserRejected { .. } => Some(ERROR_CODE_TX_REJECTED_BY_USER),
            DappError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(ERROR_CODE_TX_REJECTED_BY_USER)
    }

    /// Message to show the user.
    ///
    /// RPC errors raised by the node usually carry the useful text (revert
    /// reason, "sender doesn't have enough funds", ...) in `data.message`, so
    /// that is preferred over the outer message.
    pub fn display_message(&self) -> String {
        if let DappError::Rpc { data: Some(data), .. } = self {
            if let Some(inner) = data.get("message").and_then(|m| m.as_str()) {
                return inner.to_string();
            }
        }
        self.to_string()
    }
}

impl From<ProviderError> for DappError {
    fn from(err: ProviderError) -> Self {
        if let Some(resp) = err.as_error_response() {
            return DappError::from_rpc(resp.code, resp.message.clone(), resp.data.clone());
        }
        DappError::Transport(err.to_string())
    }
}

impl From<ethers::abi::Error> for DappError {
    fn from(err: ethers::abi::Error) -> Self {
        DappError::Abi(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_rpc_rejection_code_maps_to_user_rejected() {
        let err = DappError::from_rpc(4001, "User denied transaction signature.", None);
        assert!(matches!(err, DappError::UserRejected { .. }));
        assert!(err.is_user_rejection());
        assert_eq!(err.code(), Some(ERROR_CODE_TX_REJECTED_BY_USER));
    }

    #[test]
    fn test_from_rpc_other_code_is_not_rejection() {
        let err = DappError::from_rpc(-32603, "Internal JSON-RPC error.", None);
        assert!(!err.is_user_rejection());
        assert_eq!(err.code(), Some(-32603));
    }

    #[test]
    fn test_display_message_prefers_nested_data_message() {
        let err = DappError::from_rpc(
            -32603,
            "Internal JSON-RPC error.",
            Some(json!({ "code": 3, "message": "execution reverted: Not enough tokens" })),
        );
        assert_eq!(err.display_message(), "execution reverted: Not enough tokens");
    }

    #[test]
    fn test_display_message_falls_back_to_top_level() {
        let err = DappError::from_rpc(-32000, "nonce too low", Some(json!("0xdeadbeef")));
        assert_eq!(err.display_message(), "nonce too low");

        let err = DappError::from_rpc(-32000, "gas required exceeds allowance", None);
        assert_eq!(err.display_message(), "gas required exceeds allowance");
    }

    #[test]
    fn test_transaction_failed_message() {
        assert_eq!(DappError::TransactionFailed.display_message(), "Transaction failed");
        assert_eq!(DappError::TransactionFailed.code(), None);
    }

    #[test]
    fn test_non_rpc_errors_have_no_code() {
        assert_eq!(DappError::NoWalletDetected.code(), None);
        assert_eq!(DappError::InvalidInput("bad".into()).code(), None);
        assert_eq!(DappError::Transport("connection refused".into()).code(), None);
    }
}
