//! Token-engine errors.

use brix_types::{Address, BrixError};
use thiserror::Error;

use crate::gate::GateError;
use crate::payments::PaymentError;
use crate::reentrancy::ReentrancyError;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("caller {0} is not the token owner")]
    NotOwner(Address),

    #[error("caller {0} is not a token agent")]
    NotAgent(Address),

    #[error("caller {0} is not a recovery address")]
    NotRecoveryAddress(Address),

    #[error("token is paused")]
    TokenPaused,

    #[error("token is not paused")]
    NotPaused,

    #[error("recipient {0} is not verified")]
    RecipientNotVerified(Address),

    #[error("transfer rejected by compliance module: {0}")]
    ComplianceRejected(String),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("recovery already requested by {0} for this account")]
    AlreadyRequested(Address),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("reentrant call")]
    ReentrantCall,

    #[error("external call failed: {0}")]
    ExternalCallFailed(String),
}

impl From<GateError> for TokenError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::RecipientNotVerified(addr) => TokenError::RecipientNotVerified(addr),
            GateError::ComplianceRejected(reason) => TokenError::ComplianceRejected(reason),
        }
    }
}

impl From<ReentrancyError> for TokenError {
    fn from(_: ReentrancyError) -> Self {
        TokenError::ReentrantCall
    }
}

impl From<PaymentError> for TokenError {
    fn from(err: PaymentError) -> Self {
        TokenError::ExternalCallFailed(err.to_string())
    }
}

impl From<TokenError> for BrixError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidArgument(msg) => BrixError::InvalidArgument(msg),
            TokenError::NotOwner(addr)
            | TokenError::NotAgent(addr)
            | TokenError::NotRecoveryAddress(addr) => BrixError::NotAuthorized(addr.to_string()),
            TokenError::TokenPaused => BrixError::InvalidState("token is paused".into()),
            TokenError::NotPaused => BrixError::InvalidState("token is not paused".into()),
            TokenError::RecipientNotVerified(addr) => {
                BrixError::InvalidState(format!("recipient {addr} is not verified"))
            }
            TokenError::ComplianceRejected(reason) => BrixError::InvalidState(reason),
            TokenError::InsufficientBalance { needed, available } => {
                BrixError::InsufficientBalance { needed, available }
            }
            TokenError::AlreadyRequested(addr) => BrixError::AlreadyExists(addr.to_string()),
            TokenError::InvalidState(msg) => BrixError::InvalidState(msg),
            TokenError::ReentrantCall => BrixError::InvalidState("reentrant call".into()),
            TokenError::ExternalCallFailed(msg) => BrixError::ExternalCallFailed(msg),
        }
    }
}
