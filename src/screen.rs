//! What to render, decided purely from Session State.

use crate::session::Session;
use crate::utils::{format_hash, truncate_chars};

/// Error banners never show more than this many characters of the message.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 100;

/// The five mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No wallet to talk to; ask the user to install one
    NoWallet,
    /// Wallet present, not connected yet
    Connect,
    /// Connected, token data or first balance still on its way
    Loading,
    /// Balance is exactly zero
    NoTokens,
    /// Balance is positive; show the transfer form
    Transfer,
}

impl Screen {
    pub fn select(wallet_present: bool, session: &Session) -> Self {
        if !wallet_present {
            return Screen::NoWallet;
        }
        if session.account.is_none() {
            return Screen::Connect;
        }
        match (&session.token_data, session.balance) {
            (Some(_), Some(balance)) if balance.is_zero() => Screen::NoTokens,
            (Some(_), Some(_)) => Screen::Transfer,
            _ => Screen::Loading,
        }
    }
}

/// Status banners, shown on top of whichever screen is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banners {
    pub pending_tx: Option<String>,
    pub transaction_error: Option<String>,
    pub network_error: Option<String>,
}

impl Banners {
    pub fn from_session(session: &Session) -> Self {
        Self {
            pending_tx: session
                .pending_tx
                .map(|hash| format!("Waiting for transaction {} to be mined", format_hash(&hash))),
            transaction_error: session.transaction_error.as_ref().map(|err| {
                format!(
                    "Error sending transaction: {}",
                    truncate_chars(&err.display_message(), MAX_ERROR_MESSAGE_CHARS)
                )
            }),
            network_error: session
                .network_error
                .as_deref()
                .map(|msg| truncate_chars(msg, MAX_ERROR_MESSAGE_CHARS).to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending_tx.is_none() && self.transaction_error.is_none() && self.network_error.is_none()
    }
}
