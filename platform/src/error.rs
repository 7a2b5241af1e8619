//! Platform-level errors.

use brix_identity::IdentityError;
use brix_market::MarketError;
use brix_token::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Market(#[from] MarketError),
}
