//! Fundamental types for the BRIX platform.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, timestamps, claim/country/marketplace identifiers,
//! platform parameters, and the shared error enum.

pub mod address;
pub mod error;
pub mod ids;
pub mod params;
pub mod time;

pub use address::Address;
pub use error::BrixError;
pub use ids::{ClaimId, ClaimTopic, CountryCode, ListingId, OfferId};
pub use params::{PlatformParams, BPS_DENOMINATOR};
pub use time::Timestamp;
