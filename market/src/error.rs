//! Marketplace errors.

use brix_token::TokenError;
use brix_types::{Address, BrixError, ListingId, OfferId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("caller {0} is not the marketplace owner")]
    NotOwner(Address),

    #[error("caller {0} may not act on this listing")]
    NotSeller(Address),

    #[error("caller {0} may not act on this offer")]
    NotBuyer(Address),

    #[error("token {0} is not allowed on the marketplace")]
    TokenNotAllowed(Address),

    #[error("listing {0} not found")]
    ListingNotFound(ListingId),

    #[error("offer {0} not found")]
    OfferNotFound(OfferId),

    #[error("fee of {bps} bps exceeds the {max} bps ceiling")]
    FeeTooHigh { bps: u16, max: u16 },

    #[error("payment mismatch: expected {expected}, got {provided}")]
    BadPayment { expected: u128, provided: u128 },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("reentrant call")]
    ReentrantCall,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<brix_token::ReentrancyError> for MarketError {
    fn from(_: brix_token::ReentrancyError) -> Self {
        MarketError::ReentrantCall
    }
}

impl From<brix_token::PaymentError> for MarketError {
    fn from(err: brix_token::PaymentError) -> Self {
        MarketError::Token(TokenError::ExternalCallFailed(err.to_string()))
    }
}

impl From<MarketError> for BrixError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::InvalidArgument(msg) => BrixError::InvalidArgument(msg),
            MarketError::NotOwner(addr)
            | MarketError::NotSeller(addr)
            | MarketError::NotBuyer(addr) => BrixError::NotAuthorized(addr.to_string()),
            MarketError::TokenNotAllowed(addr) => {
                BrixError::InvalidState(format!("token {addr} is not allowed"))
            }
            MarketError::ListingNotFound(id) => BrixError::NotFound(id.to_string()),
            MarketError::OfferNotFound(id) => BrixError::NotFound(id.to_string()),
            MarketError::FeeTooHigh { bps, max } => {
                BrixError::InvalidArgument(format!("fee {bps} bps exceeds {max} bps"))
            }
            MarketError::BadPayment { expected, provided } => BrixError::InsufficientFunds {
                needed: expected,
                available: provided,
            },
            MarketError::InvalidState(msg) => BrixError::InvalidState(msg),
            MarketError::ReentrantCall => BrixError::InvalidState("reentrant call".into()),
            MarketError::Token(inner) => inner.into(),
        }
    }
}
