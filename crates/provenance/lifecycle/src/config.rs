//! Client configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file, then `PROVENANCE__`-prefixed environment variables with `__`
//! between nested keys.

use provenance_gateway::{GatewayConfig, NetworkConfig};
use serde::{Deserialize, Serialize};

pub use config::ConfigError;

/// Which record kinds a timeline includes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineView {
    /// Every record kind.
    #[default]
    Full,
    /// Registration and transfers only.
    Ownership,
}

/// Timeline shaping options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineOptions {
    #[serde(default)]
    pub view: TimelineView,

    /// Keep warranty activation records as their own events.
    #[serde(default)]
    pub include_warranty_activation: bool,
}

impl TimelineOptions {
    pub fn ownership() -> Self {
        Self {
            view: TimelineView::Ownership,
            ..Self::default()
        }
    }

    pub fn with_warranty_activation(mut self) -> Self {
        self.include_warranty_activation = true;
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Ledger connection settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Timeline shaping
    #[serde(default)]
    pub timeline: TimelineOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// A file named explicitly must exist.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ClientConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        // PROVENANCE__GATEWAY__GENESIS_BLOCK=100 style keys.
        builder = builder.add_source(
            config::Environment::with_prefix("PROVENANCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Preset for the public test network.
    pub fn sepolia(contract_address: impl Into<String>) -> Self {
        Self {
            gateway: GatewayConfig {
                network: NetworkConfig::sepolia(),
                contract_address: Some(contract_address.into()),
                genesis_block: 0,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.gateway.network.chain_id, 31_337);
        assert_eq!(config.timeline.view, TimelineView::Full);
        assert!(!config.timeline.include_warranty_activation);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ClientConfig::load(None).unwrap();
        assert_eq!(config.gateway.genesis_block, 0);
        assert_eq!(config.timeline, TimelineOptions::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "provenance-config-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "gateway": {{ "genesis_block": 42, "contract_address": "0x9d7a7eF24CDd32Af4287BA8DC7f2fd8ADBd65186" }},
                "timeline": {{ "view": "ownership", "include_warranty_activation": true }}
            }}"#
        )
        .unwrap();

        let config = ClientConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.gateway.genesis_block, 42);
        assert!(config.gateway.is_contract_configured());
        assert_eq!(
            config.timeline,
            TimelineOptions::ownership().with_warranty_activation()
        );
        assert_eq!(config.gateway.network.chain_id, 31_337);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "provenance-missing-{}.json",
            std::process::id()
        ));
        assert!(ClientConfig::load(path.to_str()).is_err());
    }

    #[test]
    fn test_sepolia_preset() {
        let config = ClientConfig::sepolia("0x9d7a7eF24CDd32Af4287BA8DC7f2fd8ADBd65186");
        assert!(config.gateway.network.is_testnet());
        assert!(config.gateway.network.explorer_url.is_some());
    }
}
