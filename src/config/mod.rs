use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chain::coin::GasPrice;
use crate::chain::wallet::DEFAULT_HD_PATH;
use crate::error::{Result, WalletError};

/// Gas adjustment floor applied when the client is built
pub const MIN_GAS_ADJUSTMENT: f64 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub chain: ChainConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub bech32_prefix: String,
    pub rpc_addr: String,
    pub grpc_addr: String,
    /// Decimal amount and denom, e.g. "0.01udaric"
    pub gas_price: String,
    #[serde(default = "default_gas_adjustment")]
    pub gas_adjustment: f64,
    /// Seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Seconds to wait for broadcast_tx_commit
    #[serde(default = "default_commit_timeout")]
    pub commit_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    // Prefer WALLET_MNEMONIC over storing the phrase here
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mnemonic: String,
    #[serde(default = "default_hd_path")]
    pub hd_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub passphrase: String,
}

fn default_gas_adjustment() -> f64 {
    MIN_GAS_ADJUSTMENT
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_commit_timeout() -> u64 {
    60
}

fn default_hd_path() -> String {
    DEFAULT_HD_PATH.to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            bech32_prefix: "cosmos".to_string(),
            rpc_addr: "http://localhost:26657".to_string(),
            grpc_addr: "http://localhost:9090".to_string(),
            gas_price: "0.025stake".to_string(),
            gas_adjustment: default_gas_adjustment(),
            connection_timeout: default_connection_timeout(),
            request_timeout: default_request_timeout(),
            commit_timeout: default_commit_timeout(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            mnemonic: String::new(),
            hd_path: default_hd_path(),
            passphrase: String::new(),
        }
    }
}

impl ChainConfig {
    pub fn parse_gas_price(&self) -> Result<GasPrice> {
        self.gas_price.parse()
    }

    /// Configured adjustment, raised to the floor when lower or not a number
    pub fn effective_gas_adjustment(&self) -> f64 {
        if self.gas_adjustment.is_nan() {
            return MIN_GAS_ADJUSTMENT;
        }
        self.gas_adjustment.max(MIN_GAS_ADJUSTMENT)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bech32_prefix.is_empty() {
            return Err(WalletError::Config("bech32_prefix must not be empty".to_string()));
        }
        if self.rpc_addr.trim().is_empty() {
            return Err(WalletError::Config("rpc_addr must not be empty".to_string()));
        }
        if self.grpc_addr.trim().is_empty() {
            return Err(WalletError::Config("grpc_addr must not be empty".to_string()));
        }
        if self.gas_adjustment.is_infinite() {
            return Err(WalletError::Config("gas_adjustment must be finite".to_string()));
        }
        self.parse_gas_price()?;
        Ok(())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WalletError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| WalletError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| WalletError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            WalletError::Config(format!("failed to write {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.toml");

        let mut config = Config::default();
        config.chain.bech32_prefix = "desmos".to_string();
        config.chain.gas_price = "0.01udaric".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.chain, config.chain);
        assert_eq!(loaded.account, config.account);

        // Empty mnemonic is not written out
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("mnemonic"));
    }

    #[test]
    fn test_load_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(
            &path,
            r#"
[chain]
bech32_prefix = "desmos"
rpc_addr = "https://rpc.morpheus.desmos.network:443"
grpc_addr = "https://grpc.morpheus.desmos.network:443"
gas_price = "0.01udaric"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.chain.gas_adjustment, 1.5);
        assert_eq!(config.chain.commit_timeout, 60);
        assert_eq!(config.account.hd_path, DEFAULT_HD_PATH);
        assert!(config.account.mnemonic.is_empty());

        let price = config.chain.parse_gas_price().unwrap();
        assert_eq!(price.amount, Decimal::from_str("0.01").unwrap());
        assert_eq!(price.denom, "udaric");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(WalletError::Config(_))));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[chain\nbech32_prefix = 1").unwrap();
        assert!(matches!(Config::load(&broken), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_gas_adjustment_floor() {
        let mut config = ChainConfig::default();
        config.gas_adjustment = 1.0;
        assert_eq!(config.effective_gas_adjustment(), 1.5);

        config.gas_adjustment = 2.0;
        assert_eq!(config.effective_gas_adjustment(), 2.0);

        config.gas_adjustment = f64::NAN;
        assert_eq!(config.effective_gas_adjustment(), 1.5);
    }

    #[test]
    fn test_validate() {
        assert!(ChainConfig::default().validate().is_ok());

        let mut config = ChainConfig::default();
        config.gas_price = "abc".to_string();
        assert!(matches!(config.validate(), Err(WalletError::Config(_))));

        let mut config = ChainConfig::default();
        config.bech32_prefix = String::new();
        assert!(matches!(config.validate(), Err(WalletError::Config(_))));
    }
}
