//! Listing and offer records.

use brix_types::{Address, ListingId, OfferId, Timestamp};
use serde::{Deserialize, Serialize};

/// A seller's escrow-backed sale order. The listed tokens sit in marketplace
/// custody from creation until purchase or cancellation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller: Address,
    pub token: Address,
    /// Remaining unsold amount, all of it escrowed.
    pub amount: u128,
    /// Native units per token unit.
    pub price_per_unit: u128,
    pub active: bool,
}

impl Listing {
    /// Total native value of the remaining amount.
    pub fn remaining_value(&self) -> u128 {
        self.amount.saturating_mul(self.price_per_unit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// A buyer's counter-bid on a listing, fully funded at creation. The escrowed
/// native value is `amount * price_per_unit` exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub listing: ListingId,
    pub buyer: Address,
    pub amount: u128,
    pub price_per_unit: u128,
    /// Advisory deadline: checked at acceptance, never auto-refunded.
    pub expiration: Timestamp,
    pub status: OfferStatus,
}

impl Offer {
    pub fn escrowed_value(&self) -> u128 {
        self.amount.saturating_mul(self.price_per_unit)
    }

    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiration
    }
}
