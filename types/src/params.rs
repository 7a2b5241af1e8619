//! Platform parameters — deployment-tunable values shared across engines.

use serde::{Deserialize, Serialize};

/// Denominator for basis-point math: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Tunable platform values, fixed at deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformParams {
    /// Number of designated recovery addresses per token deployment.
    /// Majority threshold is derived: floor(n/2) + 1.
    pub recovery_address_count: usize,

    /// Hard ceiling on any marketplace fee (basis points). Default 1000 = 10%.
    pub max_fee_bps: u16,

    /// Default marketplace transaction fee (basis points of each settlement).
    pub default_transaction_fee_bps: u16,

    /// Default marketplace listing fee (basis points, reserved for listing
    /// creation charges).
    pub default_listing_fee_bps: u16,

    /// Scale factor for the rental-income per-token accumulator. Keeps
    /// truncation loss below one raw unit per `income_precision` tokens.
    pub income_precision: u128,
}

impl PlatformParams {
    /// BRIX defaults — the intended configuration for a live deployment.
    pub fn brix_defaults() -> Self {
        Self {
            recovery_address_count: 2,
            max_fee_bps: 1000,               // 10%
            default_transaction_fee_bps: 100, // 1%
            default_listing_fee_bps: 50,      // 0.5%
            income_precision: 1_000_000_000_000, // 1e12
        }
    }

    /// Approvals required to execute an account recovery.
    pub fn recovery_majority(&self) -> usize {
        self.recovery_address_count / 2 + 1
    }
}

/// Default is the BRIX deployment configuration.
impl Default for PlatformParams {
    fn default() -> Self {
        Self::brix_defaults()
    }
}
