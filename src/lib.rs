//! Desktop front end for a single pre-deployed ERC20 token.
//!
//! Connects to a wallet, shows the token's name, symbol and the connected
//! account's balance (polled), and submits `transfer` transactions.

pub mod config;
pub mod dapp;
pub mod error;
pub mod event;
pub mod gui;
pub mod node_wallet;
pub mod operation_log;
pub mod poller;
pub mod screen;
pub mod session;
pub mod submitter;
pub mod token;
pub mod types;
pub mod user_settings;
pub mod utils;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use dapp::Dapp;
pub use error::DappError;
