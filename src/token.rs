//! ERC20 token client.
//!
//! `TokenContract` is the pre-deployed contract description (address + ABI)
//! read from the Hardhat deploy artifacts. `TokenClient` is the capability
//! set the rest of the app consumes; `Erc20Token` implements it with ethers
//! ABI encoding over a JSON-RPC provider whose unlocked account signs.

use crate::error::DappError;
use crate::types::{PendingTransfer, TokenData, TransferReceipt};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// File the deploy script writes the contract address to
pub const CONTRACT_ADDRESS_FILE: &str = "contract-address.json";

/// Hardhat artifact holding the token ABI
pub const TOKEN_ARTIFACT_FILE: &str = "Token.json";

/// Used when no artifact is available next to the address file
pub const ERC20_HUMAN_READABLE_ABI: &[&str] = &[
    "function name() external view returns (string)",
    "function symbol() external view returns (string)",
    "function totalSupply() external view returns (uint256)",
    "function balanceOf(address account) external view returns (uint256)",
    "function transfer(address to, uint256 amount) external returns (bool)",
];

const REQUIRED_FUNCTIONS: &[&str] = &["name", "symbol", "balanceOf", "transfer"];

#[derive(Deserialize)]
struct ContractAddresses {
    #[serde(rename = "Token")]
    token: String,
}

#[derive(Deserialize)]
struct Artifact {
    abi: Abi,
}

/// Address and interface of the deployed token.
#[derive(Debug, Clone)]
pub struct TokenContract {
    pub address: Address,
    pub abi: Abi,
}

impl TokenContract {
    pub fn new(address: Address, abi: Abi) -> Result<Self> {
        for name in REQUIRED_FUNCTIONS {
            abi.function(name)
                .map_err(|_| anyhow!("Token ABI is missing function '{}'", name))?;
        }
        Ok(Self { address, abi })
    }

    /// Contract at `address` described by the built-in ERC20 ABI
    pub fn with_builtin_abi(address: Address) -> Result<Self> {
        Self::new(address, builtin_abi()?)
    }

    /// Read `contract-address.json` and `Token.json` from `dir`.
    ///
    /// An explicit `address_override` skips the address file. A missing
    /// artifact falls back to the built-in ABI.
    pub fn from_artifacts(dir: &Path, address_override: Option<Address>) -> Result<Self> {
        let address = match address_override {
            Some(address) => address,
            None => {
                let path = dir.join(CONTRACT_ADDRESS_FILE);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let addresses: ContractAddresses = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                addresses
                    .token
                    .parse::<Address>()
                    .map_err(|e| anyhow!("Invalid token address in {}: {}", path.display(), e))?
            }
        };

        let artifact_path = dir.join(TOKEN_ARTIFACT_FILE);
        let abi = if artifact_path.exists() {
            let content = fs::read_to_string(&artifact_path)
                .with_context(|| format!("Failed to read {}", artifact_path.display()))?;
            let artifact: Artifact = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", artifact_path.display()))?;
            artifact.abi
        } else {
            tracing::info!(
                "No token artifact at {}, using built-in ERC20 ABI",
                artifact_path.display()
            );
            builtin_abi()?
        };

        Self::new(address, abi)
    }
}

fn builtin_abi() -> Result<Abi> {
    ethers::abi::parse_abi(ERC20_HUMAN_READABLE_ABI).map_err(|e| anyhow!("Invalid built-in ABI: {}", e))
}

/// Read-only calls and the transfer call of the token contract.
#[async_trait]
pub trait TokenClient: Send + Sync {
    async fn name(&self) -> Result<String, DappError>;
    async fn symbol(&self) -> Result<String, DappError>;
    async fn balance_of(&self, owner: Address) -> Result<U256, DappError>;
    /// Build, sign and broadcast `transfer(to, amount)`. Resolves once the
    /// wallet returns the transaction hash.
    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTransfer, DappError>;
    /// Wait (without timeout) until the transaction is mined.
    async fn wait_mined(&self, pending: PendingTransfer) -> Result<TransferReceipt, DappError>;
}

/// Fetch name then symbol.
pub async fn fetch_token_data(client: &dyn TokenClient) -> Result<TokenData, DappError> {
    let name = client.name().await?;
    let symbol = client.symbol().await?;
    Ok(TokenData { name, symbol })
}

/// ERC20 handle bound to a signer account of the wallet endpoint
pub struct Erc20Token {
    provider: Arc<Provider<Http>>,
    contract: TokenContract,
    signer: Address,
}

impl Erc20Token {
    pub fn new(provider: Arc<Provider<Http>>, contract: TokenContract, signer: Address) -> Self {
        Self {
            provider,
            contract,
            signer,
        }
    }

    fn build_call(&self, function: &str, args: &[Token]) -> Result<TypedTransaction, DappError> {
        let func = self.contract.abi.function(function)?;
        let calldata = func.encode_input(args)?;
        Ok(TransactionRequest::new()
            .from(self.signer)
            .to(self.contract.address)
            .data(calldata)
            .into())
    }

    async fn call(&self, function: &str, args: &[Token]) -> Result<Vec<Token>, DappError> {
        let tx = self.build_call(function, args)?;
        let output = self.provider.call(&tx, None).await?;
        let func = self.contract.abi.function(function)?;
        Ok(func.decode_output(&output)?)
    }

    async fn call_string(&self, function: &str) -> Result<String, DappError> {
        self.call(function, &[])
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_string)
            .ok_or_else(|| DappError::Abi(format!("{}() did not return a string", function)))
    }
}

#[async_trait]
impl TokenClient for Erc20Token {
    async fn name(&self) -> Result<String, DappError> {
        self.call_string("name").await
    }

    async fn symbol(&self) -> Result<String, DappError> {
        self.call_string("symbol").await
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, DappError> {
        self.call("balanceOf", &[Token::Address(owner)])
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| DappError::Abi("balanceOf() did not return a uint256".to_string()))
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTransfer, DappError> {
        let tx = self.build_call("transfer", &[Token::Address(to), Token::Uint(amount)])?;
        let pending = self.provider.send_transaction(tx, None).await?;
        let hash = pending.tx_hash();
        tracing::info!(?hash, ?to, %amount, "Transfer submitted");
        Ok(PendingTransfer { hash })
    }

    async fn wait_mined(&self, pending: PendingTransfer) -> Result<TransferReceipt, DappError> {
        let receipt = PendingTransaction::new(pending.hash, self.provider.as_ref()).await?;
        match receipt {
            Some(receipt) => Ok(receipt.into()),
            None => Err(DappError::TransactionDropped(pending.hash)),
        }
    }
}
