//! Events emitted by the marketplace for external indexers.

use brix_types::{Address, ListingId, OfferId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarketEvent {
    TokenAllowed {
        token: Address,
    },
    TokenDisallowed {
        token: Address,
    },
    ListingCreated {
        id: ListingId,
        seller: Address,
        token: Address,
        amount: u128,
        price_per_unit: u128,
    },
    ListingUpdated {
        id: ListingId,
        amount: u128,
        price_per_unit: u128,
    },
    ListingCancelled {
        id: ListingId,
    },
    ListingPurchased {
        id: ListingId,
        buyer: Address,
        amount: u128,
        total: u128,
        fee: u128,
    },
    OfferCreated {
        id: OfferId,
        listing: ListingId,
        buyer: Address,
        amount: u128,
        price_per_unit: u128,
    },
    OfferAccepted {
        id: OfferId,
        total: u128,
        fee: u128,
    },
    OfferRejected {
        id: OfferId,
        refunded: u128,
    },
    OfferCancelled {
        id: OfferId,
        refunded: u128,
    },
    TransactionFeeSet {
        bps: u16,
    },
    ListingFeeSet {
        bps: u16,
    },
    FeeRecipientSet {
        recipient: Address,
    },
}
