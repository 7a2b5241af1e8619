//! Identity-subsystem errors.

use brix_types::{Address, BrixError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("caller {0} is not the registry owner")]
    NotOwner(Address),

    #[error("account {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("account {0} is not registered")]
    NotRegistered(Address),

    #[error("trusted issuer {0} already exists")]
    IssuerAlreadyExists(Address),

    #[error("trusted issuer {0} not found")]
    IssuerNotFound(Address),

    #[error("claim topic {0} already required")]
    TopicAlreadyExists(u64),

    #[error("claim topic {0} not found")]
    TopicNotFound(u64),
}

impl From<IdentityError> for BrixError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidArgument(msg) => BrixError::InvalidArgument(msg),
            IdentityError::NotOwner(addr) => BrixError::NotAuthorized(addr.to_string()),
            IdentityError::AlreadyRegistered(addr) => BrixError::AlreadyExists(addr.to_string()),
            IdentityError::NotRegistered(addr) => BrixError::NotRegistered(addr.to_string()),
            IdentityError::IssuerAlreadyExists(addr) => BrixError::AlreadyExists(addr.to_string()),
            IdentityError::IssuerNotFound(addr) => BrixError::NotFound(addr.to_string()),
            IdentityError::TopicAlreadyExists(id) => BrixError::AlreadyExists(format!("topic {id}")),
            IdentityError::TopicNotFound(id) => BrixError::NotFound(format!("topic {id}")),
        }
    }
}
