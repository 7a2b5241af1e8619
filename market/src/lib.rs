//! Escrowed marketplace for compliance-gated property tokens.
//!
//! Listings escrow tokens into marketplace custody; offers escrow the full
//! native bid value. Settlement delivers tokens through the same transfer
//! gate as any other movement, then splits the native total between fee
//! recipient and seller.

pub mod error;
pub mod events;
pub mod listing;
pub mod marketplace;

pub use error::MarketError;
pub use events::MarketEvent;
pub use listing::{Listing, Offer, OfferStatus};
pub use marketplace::Marketplace;
