use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::Url;

const SETTINGS_FILE: &str = "token_dapp_settings.json";

/// Name of the per-user app directory under the platform config dir.
pub const APP_DIR_NAME: &str = "token-dapp";

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_network_id() -> String {
    "1337".to_string() // Hardhat Network id as reported by net_version
}

fn default_network_label() -> String {
    "Localhost:8545".to_string()
}

fn default_contracts_dir() -> String {
    "frontend/src/contracts".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// User settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    /// Wallet endpoint. Empty means no wallet is available.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Network id the token is deployed on
    #[serde(default = "default_network_id")]
    pub expected_network_id: String,
    /// Human-readable name of that network, used in the mismatch message
    #[serde(default = "default_network_label")]
    pub network_label: String,
    /// Directory holding `contract-address.json` and `Token.json`
    #[serde(default = "default_contracts_dir")]
    pub contracts_dir: String,
    /// Token address override; takes precedence over the deploy artifacts
    #[serde(default)]
    pub token_address: Option<String>,
    /// Balance poll and wallet watch period (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            expected_network_id: default_network_id(),
            network_label: default_network_label(),
            contracts_dir: default_contracts_dir(),
            token_address: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl UserSettings {
    /// Get the settings file path
    fn settings_path() -> PathBuf {
        // Try to use the app data directory, fall back to current directory
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join(APP_DIR_NAME);
            if !app_dir.exists() {
                let _ = fs::create_dir_all(&app_dir);
            }
            app_dir.join(SETTINGS_FILE)
        } else {
            PathBuf::from(SETTINGS_FILE)
        }
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let path = Self::settings_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match Self::from_json(&content) {
                    Ok(settings) => {
                        tracing::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse settings file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read settings file: {}", e);
                }
            }
        }
        tracing::info!("Using default settings");
        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::settings_path();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Get the settings file path for display
    pub fn settings_path_display() -> String {
        Self::settings_path().display().to_string()
    }

    /// Reject values that would leave the app unable to start.
    pub fn validate(&self) -> Result<()> {
        let rpc = self.rpc_url.trim();
        if !rpc.is_empty() {
            let url = Url::parse(rpc).map_err(|e| anyhow!("Invalid wallet URL '{}': {}", rpc, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("Wallet URL must use http or https, got '{}'", url.scheme()));
            }
        }
        if self.expected_network_id.trim().is_empty() {
            return Err(anyhow!("Expected network id cannot be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("Poll interval must be greater than zero"));
        }
        Ok(())
    }

    /// Set the wallet endpoint (whitespace-only clears it)
    pub fn set_rpc_url(&mut self, rpc: &str) {
        self.rpc_url = rpc.trim().to_string();
    }
}
