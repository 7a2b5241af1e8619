//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the BRIX platform.
///
/// Per-crate errors (`IdentityError`, `TokenError`, `MarketError`) convert
/// into this for callers that span subsystems.
#[derive(Debug, Error)]
pub enum BrixError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("caller is not authorized: {0}")]
    NotAuthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not registered: {0}")]
    NotRegistered(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("external call failed: {0}")]
    ExternalCallFailed(String),

    #[error("{0}")]
    Other(String),
}
