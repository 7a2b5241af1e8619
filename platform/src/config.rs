//! Platform configuration with TOML file support.

use serde::{Deserialize, Serialize};

use brix_types::Address;

use crate::PlatformError;

/// A trusted claim issuer and the topics it may attest to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Issuer address, `0x`-prefixed hex.
    pub address: String,
    /// Topic ids this issuer is trusted for.
    pub topics: Vec<u64>,
}

/// Configuration for one BRIX deployment.
///
/// Can be loaded from a TOML file via [`PlatformConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Addresses are hex strings in the
/// file and parsed during validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform owner/administrator address.
    pub owner: String,

    /// Address the deployed token instance lives at.
    pub token_address: String,

    /// Marketplace custody address (holds listing escrow; must be a
    /// registered identity before the first listing).
    pub market_custody: String,

    /// Recipient of marketplace fees.
    pub fee_recipient: String,

    #[serde(default = "default_token_name")]
    pub token_name: String,

    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    #[serde(default)]
    pub token_decimals: u8,

    /// Marketplace transaction fee in basis points.
    #[serde(default = "default_transaction_fee_bps")]
    pub transaction_fee_bps: u16,

    /// Marketplace listing fee in basis points.
    #[serde(default = "default_listing_fee_bps")]
    pub listing_fee_bps: u16,

    /// Hard ceiling for either fee.
    #[serde(default = "default_max_fee_bps")]
    pub max_fee_bps: u16,

    /// Designated recovery addresses (hex). Empty means recovery stays
    /// unconfigured; when set, the length must equal
    /// `recovery_address_count`.
    #[serde(default)]
    pub recovery_addresses: Vec<String>,

    #[serde(default = "default_recovery_address_count")]
    pub recovery_address_count: usize,

    /// Claim topics every investor must hold.
    #[serde(default)]
    pub required_claim_topics: Vec<u64>,

    #[serde(default)]
    pub trusted_issuers: Vec<IssuerConfig>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_token_name() -> String {
    "BRIX Property Token".to_string()
}

fn default_token_symbol() -> String {
    "BRIX".to_string()
}

fn default_transaction_fee_bps() -> u16 {
    100
}

fn default_listing_fee_bps() -> u16 {
    50
}

fn default_max_fee_bps() -> u16 {
    1_000
}

fn default_recovery_address_count() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PlatformConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, PlatformError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PlatformError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PlatformError> {
        let config: Self = toml::from_str(s).map_err(|e| PlatformError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("PlatformConfig is always serializable to TOML")
    }

    /// Check internal consistency without wiring anything up.
    pub fn validate(&self) -> Result<(), PlatformError> {
        self.parse_address("owner", &self.owner)?;
        self.parse_address("token_address", &self.token_address)?;
        self.parse_address("market_custody", &self.market_custody)?;
        self.parse_address("fee_recipient", &self.fee_recipient)?;
        if self.transaction_fee_bps > self.max_fee_bps {
            return Err(PlatformError::Config(format!(
                "transaction_fee_bps {} exceeds max_fee_bps {}",
                self.transaction_fee_bps, self.max_fee_bps
            )));
        }
        if self.listing_fee_bps > self.max_fee_bps {
            return Err(PlatformError::Config(format!(
                "listing_fee_bps {} exceeds max_fee_bps {}",
                self.listing_fee_bps, self.max_fee_bps
            )));
        }
        if !self.recovery_addresses.is_empty()
            && self.recovery_addresses.len() != self.recovery_address_count
        {
            return Err(PlatformError::Config(format!(
                "expected {} recovery addresses, got {}",
                self.recovery_address_count,
                self.recovery_addresses.len()
            )));
        }
        for addr in &self.recovery_addresses {
            self.parse_address("recovery_addresses", addr)?;
        }
        for issuer in &self.trusted_issuers {
            self.parse_address("trusted_issuers", &issuer.address)?;
            if issuer.topics.is_empty() {
                return Err(PlatformError::Config(format!(
                    "issuer {} has no topics",
                    issuer.address
                )));
            }
        }
        Ok(())
    }

    fn parse_address(&self, field: &str, value: &str) -> Result<Address, PlatformError> {
        let addr = Address::from_hex(value)
            .map_err(|_| PlatformError::Config(format!("{field}: bad address {value:?}")))?;
        if addr.is_zero() {
            return Err(PlatformError::Config(format!(
                "{field}: the null address is not a valid participant"
            )));
        }
        Ok(addr)
    }
}
