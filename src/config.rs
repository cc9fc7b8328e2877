use crate::token::TokenContract;
use crate::user_settings::UserSettings;
use anyhow::{anyhow, Context, Result};
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A network a development wallet is commonly pointed at.
#[derive(Clone, Debug)]
pub struct KnownNetwork {
    pub label: &'static str,
    /// Value reported by `net_version`
    pub network_id: &'static str,
}

impl KnownNetwork {
    pub const fn new(label: &'static str, network_id: &'static str) -> Self {
        Self { label, network_id }
    }
}

/// Networks we can name when the wallet reports one.
pub const KNOWN_NETWORKS: &[KnownNetwork] = &[
    KnownNetwork::new("Ethereum", "1"),
    KnownNetwork::new("Sepolia", "11155111"),
    KnownNetwork::new("Holesky", "17000"),
    KnownNetwork::new("Localhost:8545", "1337"),
    KnownNetwork::new("Hardhat (chain 31337)", "31337"),
];

/// Find a network label by its `net_version` id
pub fn find_network_by_id(network_id: &str) -> Option<&'static KnownNetwork> {
    KNOWN_NETWORKS.iter().find(|n| n.network_id == network_id)
}

/// Display name for a network id, falling back to the raw id
pub fn network_display_name(network_id: &str) -> String {
    find_network_by_id(network_id)
        .map(|n| n.label.to_string())
        .unwrap_or_else(|| format!("network {}", network_id))
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Wallet endpoint; `None` means no wallet is available
    pub rpc_url: Option<String>,
    pub expected_network_id: String,
    pub network_label: String,
    pub contracts_dir: PathBuf,
    pub token_address: Option<Address>,
    /// Balance poll period, also used for wallet watching and receipt polling
    pub poll_interval: Duration,
}

impl Config {
    /// Build a config from persisted settings
    pub fn from_settings(settings: &UserSettings) -> Result<Self> {
        settings.validate()?;
        let rpc_url = Some(settings.rpc_url.trim().to_string()).filter(|s| !s.is_empty());
        let token_address = match settings.token_address.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => Some(
                addr.parse::<Address>()
                    .map_err(|e| anyhow!("Invalid token address '{}': {}", addr, e))?,
            ),
            _ => None,
        };

        Ok(Self {
            rpc_url,
            expected_network_id: settings.expected_network_id.trim().to_string(),
            network_label: settings.network_label.clone(),
            contracts_dir: PathBuf::from(&settings.contracts_dir),
            token_address,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        })
    }

    /// Defaults, then persisted settings, then the process environment
    pub fn load() -> Result<Self> {
        let settings = UserSettings::load();
        let mut config = Self::from_settings(&settings)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `DAPP_*` overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rpc) = lookup("DAPP_RPC_URL") {
            let rpc = rpc.trim().to_string();
            if rpc.is_empty() {
                self.rpc_url = None;
            } else {
                Url::parse(&rpc).with_context(|| format!("Invalid DAPP_RPC_URL '{}'", rpc))?;
                self.rpc_url = Some(rpc);
            }
        }
        if let Some(id) = lookup("DAPP_NETWORK_ID").filter(|v| !v.trim().is_empty()) {
            self.expected_network_id = id.trim().to_string();
        }
        if let Some(label) = lookup("DAPP_NETWORK_LABEL").filter(|v| !v.trim().is_empty()) {
            self.network_label = label.trim().to_string();
        }
        if let Some(dir) = lookup("DAPP_CONTRACTS_DIR").filter(|v| !v.trim().is_empty()) {
            self.contracts_dir = PathBuf::from(dir.trim());
        }
        if let Some(addr) = lookup("DAPP_TOKEN_ADDRESS").filter(|v| !v.trim().is_empty()) {
            let parsed = addr
                .trim()
                .parse::<Address>()
                .map_err(|e| anyhow!("Invalid DAPP_TOKEN_ADDRESS '{}': {}", addr.trim(), e))?;
            self.token_address = Some(parsed);
        }
        if let Some(ms) = lookup("DAPP_POLL_INTERVAL_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("Invalid DAPP_POLL_INTERVAL_MS '{}'", ms))?;
            if ms == 0 {
                return Err(anyhow!("DAPP_POLL_INTERVAL_MS must be greater than zero"));
            }
            self.poll_interval = Duration::from_millis(ms);
        }
        Ok(())
    }

    /// Banner text shown when the wallet is on the wrong network
    pub fn network_error_message(&self) -> String {
        format!("Please connect Metamask to {}", self.network_label)
    }

    /// Load the deployed token's address and ABI
    pub fn load_token_contract(&self) -> Result<TokenContract> {
        TokenContract::from_artifacts(&self.contracts_dir, self.token_address)
    }

    pub fn get_provider(&self) -> Result<Arc<Provider<Http>>> {
        let rpc_url = self
            .rpc_url
            .as_deref()
            .ok_or_else(|| anyhow!("No wallet endpoint configured"))?;
        let url = Url::parse(rpc_url)?;
        let provider = Provider::<Http>::try_from(url.as_str())?.interval(self.poll_interval);
        Ok(Arc::new(provider))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: Some("http://127.0.0.1:8545".to_string()),
            expected_network_id: "1337".to_string(),
            network_label: "Localhost:8545".to_string(),
            contracts_dir: PathBuf::from("frontend/src/contracts"),
            token_address: None,
            poll_interval: Duration::from_secs(1),
        }
    }
}
