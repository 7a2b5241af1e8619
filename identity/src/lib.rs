//! Identity registry subsystem.
//!
//! Four components compose into the platform's compliance source of truth:
//! - [`IdentityStore`] — account → (identity contract, country) records
//! - [`TrustedIssuerRegistry`] — which attestors may attest which topics
//! - [`ClaimTopicsRegistry`] — the topics an investor must hold claims for
//! - [`IdentityRegistry`] — composes the three and derives `is_verified`
//!
//! External identity contracts are reached through the [`ClaimSource`]
//! capability; their failures never propagate out of verification.

pub mod claims;
pub mod error;
pub mod events;
pub mod issuers;
pub mod registry;
pub mod store;
pub mod topics;

pub use claims::{Claim, ClaimLookupError, ClaimSource, ClaimVault};
pub use error::IdentityError;
pub use events::IdentityEvent;
pub use issuers::TrustedIssuerRegistry;
pub use registry::IdentityRegistry;
pub use store::{IdentityRecord, IdentityStore};
pub use topics::ClaimTopicsRegistry;
