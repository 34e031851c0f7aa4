//! Network and gateway configuration.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Chain the contract is deployed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    pub fn localhost() -> Self {
        Self {
            name: "Hardhat Local".to_string(),
            chain_id: 31_337,
            rpc_urls: vec!["http://127.0.0.1:8545".to_string()],
            explorer_url: None,
        }
    }

    pub fn sepolia() -> Self {
        Self {
            name: "Sepolia Testnet".to_string(),
            chain_id: 11_155_111,
            rpc_urls: vec!["https://rpc.sepolia.org".to_string()],
            explorer_url: Some("https://sepolia.etherscan.io".to_string()),
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self.chain_id, 5 | 31_337 | 80_001 | 11_155_111)
    }

    /// Explorer link for a transaction, if the network has an explorer.
    pub fn transaction_url(&self, transaction: &str) -> Option<String> {
        self.explorer_link("tx", transaction)
    }

    pub fn address_url(&self, address: &str) -> Option<String> {
        self.explorer_link("address", address)
    }

    fn explorer_link(&self, kind: &str, value: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/{kind}/{value}", base.trim_end_matches('/')))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::localhost()
    }
}

/// Connection settings for a [`crate::LedgerClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    /// Deployed contract address, `0x`-prefixed.
    #[serde(default)]
    pub contract_address: Option<String>,

    /// First block scanned by stream queries.
    #[serde(default)]
    pub genesis_block: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            contract_address: None,
            genesis_block: 0,
        }
    }
}

impl GatewayConfig {
    /// Parsed contract address, if one is configured and well formed.
    pub fn contract(&self) -> Option<Address> {
        self.contract_address
            .as_deref()
            .and_then(|text| provenance_types::parse_address(text).ok())
    }

    pub fn is_contract_configured(&self) -> bool {
        self.contract().is_some()
    }
}
