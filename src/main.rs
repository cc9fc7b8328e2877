#![windows_subsystem = "windows"]

use anyhow::{Context, Result};
use token_dapp::{config::Config, gui};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    // Defaults, then the saved settings file, then DAPP_* environment variables
    let config = Config::load().context("Invalid configuration")?;
    tracing::info!(
        rpc_url = ?config.rpc_url,
        network_id = %config.expected_network_id,
        contracts_dir = %config.contracts_dir.display(),
        "Starting token dApp"
    );
    gui::launch(config)?;

    Ok(())
}
