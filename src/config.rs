//! Delegate configuration, loaded from TOML.
//!
//! ```toml
//! owner = "0x00000000000000000000000000000000000000a0"
//! trade_wallet = "0x00000000000000000000000000000000000000a1"
//! spender = "0x00000000000000000000000000000000000000b0"
//! state_path = "delegate-book.ssz"
//!
//! [log]
//! level = "info"
//! format = "compact"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DelegateError, Result};
use crate::logging::LogConfig;
use crate::types::Address;

/// Delegate configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DelegateConfig {
    /// Account allowed to create and delete rules
    pub owner: Address,

    /// Wallet that funds trades; defaults to `owner`
    #[serde(default)]
    pub trade_wallet: Option<Address>,

    /// Address the trade wallet approves for transfers. Max quotes are
    /// bounded by the trade wallet's allowance to it, so it has no default.
    pub spender: Address,

    /// Durable snapshot path; in-memory only when unset
    #[serde(default)]
    pub state_path: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

impl DelegateConfig {
    /// Minimal in-memory configuration
    pub fn new(owner: Address, spender: Address) -> Self {
        Self {
            owner,
            trade_wallet: None,
            spender,
            state_path: None,
            log: LogConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| DelegateError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DelegateError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() {
            return Err(DelegateError::Config("owner must be a nonzero address".into()));
        }
        if self.trade_wallet.is_some_and(|w| w.is_zero()) {
            return Err(DelegateError::TradeWalletRequired);
        }
        if self.spender.is_zero() {
            return Err(DelegateError::Config("spender must be a nonzero address".into()));
        }
        Ok(())
    }

    /// Trade wallet, falling back to the owner
    pub fn effective_trade_wallet(&self) -> Address {
        self.trade_wallet.unwrap_or(self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    const A0: &str = "0x00000000000000000000000000000000000000a0";
    const B0: &str = "0x00000000000000000000000000000000000000b0";

    const SAMPLE: &str = r#"
owner = "0x00000000000000000000000000000000000000a0"
trade_wallet = "0x00000000000000000000000000000000000000a1"
spender = "0x00000000000000000000000000000000000000b0"
state_path = "book.ssz"

[log]
level = "debug"
format = "compact"
"#;

    #[test]
    fn test_parse_sample() {
        let config = DelegateConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.owner, Address::from_low_u64(0xa0));
        assert_eq!(config.effective_trade_wallet(), Address::from_low_u64(0xa1));
        assert_eq!(config.spender, Address::from_low_u64(0xb0));
        assert_eq!(config.state_path, Some(PathBuf::from("book.ssz")));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Compact);
    }

    #[test]
    fn test_trade_wallet_defaults_to_owner() {
        let config = DelegateConfig::from_toml_str(&format!("owner = \"{A0}\"\nspender = \"{B0}\""))
            .unwrap();
        assert_eq!(config.effective_trade_wallet(), config.owner);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_spender_is_required() {
        assert!(matches!(
            DelegateConfig::from_toml_str(&format!("owner = \"{A0}\"")),
            Err(DelegateError::Config(_))
        ));

        let zero = "0x0000000000000000000000000000000000000000";
        let toml = format!("owner = \"{A0}\"\nspender = \"{zero}\"");
        assert!(matches!(
            DelegateConfig::from_toml_str(&toml),
            Err(DelegateError::Config(_))
        ));
        assert!(DelegateConfig::new(Address::from_low_u64(0xa0), Address::ZERO).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_owner_and_trade_wallet() {
        let zero = "0x0000000000000000000000000000000000000000";
        let toml = format!("owner = \"{zero}\"\nspender = \"{B0}\"");
        assert!(DelegateConfig::from_toml_str(&toml).is_err());

        let toml = format!("owner = \"{A0}\"\nspender = \"{B0}\"\ntrade_wallet = \"{zero}\"");
        assert!(matches!(
            DelegateConfig::from_toml_str(&toml),
            Err(DelegateError::TradeWalletRequired)
        ));
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(matches!(
            DelegateConfig::from_toml_str(&format!("owner = \"0x12\"\nspender = \"{B0}\"")),
            Err(DelegateError::Config(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DelegateConfig::from_toml_str(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(DelegateConfig::from_toml_str(&text).unwrap(), config);
    }
}
