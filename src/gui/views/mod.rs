//! View modules for the GUI
//!
//! Each submodule adds rendering methods to `DappApp`; they are called from
//! `App::update` in `app.rs`.
//!
//! - `token` - The five token screens, one of which is shown at a time
//! - `banners` - Pending transaction and error banners shown above any screen
//! - `wallet` - Wallet status, account selector and disconnect in the top bar
//! - `activity` - Recent notifications and the transfer log
//! - `settings` - Persisted configuration

pub mod activity;
pub mod banners;
pub mod settings;
pub mod token;
pub mod wallet;
