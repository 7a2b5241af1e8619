//! The marketplace engine — escrowed listings and funded offers.
//!
//! Sellers escrow tokens into marketplace custody at listing time; buyers
//! escrow the full native value of an offer at creation. Settlement order is
//! fixed: tokens leave escrow first (gate-checked), internal bookkeeping is
//! reduced, and only then do native payouts go out through the
//! [`PaymentOutlet`], under the reentrancy lock.

use brix_token::{ComplianceToken, PaymentOutlet, ReentrancyLock, TransferGate};
use brix_types::{Address, ListingId, OfferId, PlatformParams, Timestamp, BPS_DENOMINATOR};
use std::collections::{BTreeSet, HashMap};

use crate::error::MarketError;
use crate::events::MarketEvent;
use crate::listing::{Listing, Offer, OfferStatus};

pub struct Marketplace {
    owner: Address,
    /// The marketplace's own address. Escrowed tokens sit on this account in
    /// each token's ledger, so it must be a verified identity.
    custody: Address,
    fee_recipient: Address,
    transaction_fee_bps: u16,
    listing_fee_bps: u16,
    allowed_tokens: BTreeSet<Address>,
    listings: HashMap<ListingId, Listing>,
    offers: HashMap<OfferId, Offer>,
    next_listing: ListingId,
    next_offer: OfferId,
    /// Native funds locked for pending offers. Only ever debited by
    /// settlement or refund, never below zero.
    held_funds: u128,
    params: PlatformParams,
    lock: ReentrancyLock,
    pending_events: Vec<MarketEvent>,
}

/// `total * bps / 10_000` without overflowing on large totals.
fn fee_for(total: u128, bps: u16) -> u128 {
    let bps = bps as u128;
    match total.checked_mul(bps) {
        Some(product) => product / BPS_DENOMINATOR,
        None => (total / BPS_DENOMINATOR) * bps + (total % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR,
    }
}

impl Marketplace {
    pub fn new(
        custody: Address,
        owner: Address,
        fee_recipient: Address,
        params: PlatformParams,
    ) -> Self {
        Self {
            owner,
            custody,
            fee_recipient,
            transaction_fee_bps: params.default_transaction_fee_bps,
            listing_fee_bps: params.default_listing_fee_bps,
            allowed_tokens: BTreeSet::new(),
            listings: HashMap::new(),
            offers: HashMap::new(),
            next_listing: ListingId::new(1),
            next_offer: OfferId::new(1),
            held_funds: 0,
            params,
            lock: ReentrancyLock::new(),
            pending_events: Vec::new(),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn custody(&self) -> &Address {
        &self.custody
    }

    pub fn fee_recipient(&self) -> &Address {
        &self.fee_recipient
    }

    pub fn transaction_fee_bps(&self) -> u16 {
        self.transaction_fee_bps
    }

    pub fn listing_fee_bps(&self) -> u16 {
        self.listing_fee_bps
    }

    pub fn is_token_allowed(&self, token: &Address) -> bool {
        self.allowed_tokens.contains(token)
    }

    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.listings.get(&id)
    }

    pub fn offer(&self, id: OfferId) -> Option<&Offer> {
        self.offers.get(&id)
    }

    /// Native funds currently locked for pending offers.
    pub fn held_funds(&self) -> u128 {
        self.held_funds
    }

    // ── Administration ───────────────────────────────────────────────────

    pub fn allow_token(&mut self, caller: &Address, token: &Address) -> Result<(), MarketError> {
        self.require_owner(caller)?;
        if token.is_zero() {
            return Err(MarketError::InvalidArgument("token must be non-null".into()));
        }
        if !self.allowed_tokens.insert(*token) {
            return Err(MarketError::InvalidArgument(format!(
                "token {token} is already allowed"
            )));
        }
        self.pending_events
            .push(MarketEvent::TokenAllowed { token: *token });
        Ok(())
    }

    /// Remove a token from the allow-list. Existing listings survive (their
    /// escrow must remain releasable); only new listings are blocked.
    pub fn disallow_token(&mut self, caller: &Address, token: &Address) -> Result<(), MarketError> {
        self.require_owner(caller)?;
        if !self.allowed_tokens.remove(token) {
            return Err(MarketError::TokenNotAllowed(*token));
        }
        self.pending_events
            .push(MarketEvent::TokenDisallowed { token: *token });
        Ok(())
    }

    pub fn set_transaction_fee(&mut self, caller: &Address, bps: u16) -> Result<(), MarketError> {
        self.require_owner(caller)?;
        self.check_fee(bps)?;
        self.transaction_fee_bps = bps;
        self.pending_events
            .push(MarketEvent::TransactionFeeSet { bps });
        Ok(())
    }

    pub fn set_listing_fee(&mut self, caller: &Address, bps: u16) -> Result<(), MarketError> {
        self.require_owner(caller)?;
        self.check_fee(bps)?;
        self.listing_fee_bps = bps;
        self.pending_events.push(MarketEvent::ListingFeeSet { bps });
        Ok(())
    }

    pub fn set_fee_recipient(
        &mut self,
        caller: &Address,
        recipient: &Address,
    ) -> Result<(), MarketError> {
        self.require_owner(caller)?;
        if recipient.is_zero() {
            return Err(MarketError::InvalidArgument(
                "fee recipient must be non-null".into(),
            ));
        }
        self.fee_recipient = *recipient;
        self.pending_events.push(MarketEvent::FeeRecipientSet {
            recipient: *recipient,
        });
        Ok(())
    }

    // ── Listings ─────────────────────────────────────────────────────────

    /// Escrow-first listing creation: the tokens move into custody before
    /// any listing record exists, so a failed gate check leaves nothing.
    pub fn create_listing(
        &mut self,
        caller: &Address,
        token: &mut ComplianceToken,
        amount: u128,
        price_per_unit: u128,
        gate: &dyn TransferGate,
    ) -> Result<ListingId, MarketError> {
        if !self.allowed_tokens.contains(token.address()) {
            return Err(MarketError::TokenNotAllowed(*token.address()));
        }
        if amount == 0 || price_per_unit == 0 {
            return Err(MarketError::InvalidArgument(
                "listing needs non-zero amount and price".into(),
            ));
        }
        checked_total(amount, price_per_unit)?;

        token.transfer(caller, &self.custody, amount, gate)?;

        let id = self.next_listing;
        self.next_listing = id.next();
        self.listings.insert(
            id,
            Listing {
                id,
                seller: *caller,
                token: *token.address(),
                amount,
                price_per_unit,
                active: true,
            },
        );
        self.pending_events.push(MarketEvent::ListingCreated {
            id,
            seller: *caller,
            token: *token.address(),
            amount,
            price_per_unit,
        });
        Ok(id)
    }

    /// Reprice and/or shrink a listing. The amount may only decrease; the
    /// excess goes back to the seller from escrow.
    pub fn update_listing(
        &mut self,
        caller: &Address,
        id: ListingId,
        new_amount: u128,
        new_price: u128,
        token: &mut ComplianceToken,
        gate: &dyn TransferGate,
    ) -> Result<(), MarketError> {
        let listing = self
            .listings
            .get(&id)
            .ok_or(MarketError::ListingNotFound(id))?;
        if listing.seller != *caller {
            return Err(MarketError::NotSeller(*caller));
        }
        if !listing.active {
            return Err(MarketError::InvalidState(format!("{id} is not active")));
        }
        if new_amount == 0 || new_price == 0 {
            return Err(MarketError::InvalidArgument(
                "updated listing needs non-zero amount and price".into(),
            ));
        }
        if new_amount > listing.amount {
            return Err(MarketError::InvalidArgument(format!(
                "listing amount may only decrease (have {}, asked {new_amount})",
                listing.amount
            )));
        }
        if listing.token != *token.address() {
            return Err(MarketError::InvalidArgument(
                "token does not match the listing".into(),
            ));
        }
        checked_total(new_amount, new_price)?;

        let excess = listing.amount - new_amount;
        if excess > 0 {
            token.transfer(&self.custody, caller, excess, gate)?;
        }
        let listing = self.listings.get_mut(&id).expect("checked above");
        listing.amount = new_amount;
        listing.price_per_unit = new_price;
        self.pending_events.push(MarketEvent::ListingUpdated {
            id,
            amount: new_amount,
            price_per_unit: new_price,
        });
        Ok(())
    }

    /// Direct purchase at the listed price.
    ///
    /// `payment` is the native value the buyer put up; anything above the
    /// total is refunded. The fee is truncated down, so a residue of less
    /// than one native unit per settlement stays with the marketplace.
    pub fn purchase_listing(
        &mut self,
        caller: &Address,
        id: ListingId,
        amount: u128,
        payment: u128,
        token: &mut ComplianceToken,
        gate: &dyn TransferGate,
        outlet: &mut dyn PaymentOutlet,
    ) -> Result<(), MarketError> {
        let listing = self
            .listings
            .get(&id)
            .ok_or(MarketError::ListingNotFound(id))?;
        if !listing.active {
            return Err(MarketError::InvalidState(format!("{id} is not active")));
        }
        if amount == 0 || amount > listing.amount {
            return Err(MarketError::InvalidArgument(format!(
                "purchase amount {amount} out of range (listing has {})",
                listing.amount
            )));
        }
        if listing.token != *token.address() {
            return Err(MarketError::InvalidArgument(
                "token does not match the listing".into(),
            ));
        }
        let seller = listing.seller;
        let total = checked_total(amount, listing.price_per_unit)?;
        if payment < total {
            return Err(MarketError::BadPayment {
                expected: total,
                provided: payment,
            });
        }

        let _guard = self.lock.enter()?;
        token.transfer(&self.custody, caller, amount, gate)?;

        let listing = self.listings.get_mut(&id).expect("checked above");
        listing.amount -= amount;
        if listing.amount == 0 {
            listing.active = false;
        }

        let fee = fee_for(total, self.transaction_fee_bps);
        self.pending_events.push(MarketEvent::ListingPurchased {
            id,
            buyer: *caller,
            amount,
            total,
            fee,
        });
        if fee > 0 {
            outlet.pay(&self.fee_recipient, fee)?;
        }
        outlet.pay(&seller, total - fee)?;
        if payment > total {
            outlet.pay(caller, payment - total)?;
        }
        Ok(())
    }

    /// Return all remaining escrowed tokens and deactivate. Seller or
    /// marketplace owner.
    pub fn cancel_listing(
        &mut self,
        caller: &Address,
        id: ListingId,
        token: &mut ComplianceToken,
        gate: &dyn TransferGate,
    ) -> Result<(), MarketError> {
        let listing = self
            .listings
            .get(&id)
            .ok_or(MarketError::ListingNotFound(id))?;
        if listing.seller != *caller && self.owner != *caller {
            return Err(MarketError::NotSeller(*caller));
        }
        if !listing.active {
            return Err(MarketError::InvalidState(format!("{id} is not active")));
        }
        if listing.token != *token.address() {
            return Err(MarketError::InvalidArgument(
                "token does not match the listing".into(),
            ));
        }
        let seller = listing.seller;
        let remaining = listing.amount;
        if remaining > 0 {
            token.transfer(&self.custody, &seller, remaining, gate)?;
        }
        let listing = self.listings.get_mut(&id).expect("checked above");
        listing.amount = 0;
        listing.active = false;
        self.pending_events.push(MarketEvent::ListingCancelled { id });
        Ok(())
    }

    // ── Offers ───────────────────────────────────────────────────────────

    /// A funded counter-bid. `payment` must equal `amount * price_per_unit`
    /// exactly; holding an imprecise escrow would make refunds ambiguous.
    pub fn create_offer(
        &mut self,
        caller: &Address,
        listing_id: ListingId,
        amount: u128,
        price_per_unit: u128,
        payment: u128,
        expiration: Timestamp,
        now: Timestamp,
    ) -> Result<OfferId, MarketError> {
        let listing = self
            .listings
            .get(&listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if !listing.active {
            return Err(MarketError::InvalidState(format!(
                "{listing_id} is not active"
            )));
        }
        if amount == 0 || amount > listing.amount {
            return Err(MarketError::InvalidArgument(format!(
                "offer amount {amount} out of range (listing has {})",
                listing.amount
            )));
        }
        if price_per_unit == 0 {
            return Err(MarketError::InvalidArgument("offer price is zero".into()));
        }
        if expiration <= now {
            return Err(MarketError::InvalidArgument(
                "offer expiration must be in the future".into(),
            ));
        }
        let total = checked_total(amount, price_per_unit)?;
        if payment != total {
            return Err(MarketError::BadPayment {
                expected: total,
                provided: payment,
            });
        }

        self.held_funds += total;
        let id = self.next_offer;
        self.next_offer = id.next();
        self.offers.insert(
            id,
            Offer {
                id,
                listing: listing_id,
                buyer: *caller,
                amount,
                price_per_unit,
                expiration,
                status: OfferStatus::Pending,
            },
        );
        self.pending_events.push(MarketEvent::OfferCreated {
            id,
            listing: listing_id,
            buyer: *caller,
            amount,
            price_per_unit,
        });
        Ok(id)
    }

    /// Seller takes the offer: settles at the offered price from the escrowed
    /// funds, delivers tokens from listing escrow, reduces the listing.
    pub fn accept_offer(
        &mut self,
        caller: &Address,
        id: OfferId,
        now: Timestamp,
        token: &mut ComplianceToken,
        gate: &dyn TransferGate,
        outlet: &mut dyn PaymentOutlet,
    ) -> Result<(), MarketError> {
        let offer = self.offers.get(&id).ok_or(MarketError::OfferNotFound(id))?;
        if !offer.is_pending() {
            return Err(MarketError::InvalidState(format!("{id} is not pending")));
        }
        if offer.is_expired(now) {
            return Err(MarketError::InvalidState(format!("{id} has expired")));
        }
        let listing_id = offer.listing;
        let buyer = offer.buyer;
        let amount = offer.amount;
        let total = offer.escrowed_value();

        let listing = self
            .listings
            .get(&listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;
        if listing.seller != *caller {
            return Err(MarketError::NotSeller(*caller));
        }
        if !listing.active {
            return Err(MarketError::InvalidState(format!(
                "{listing_id} is not active"
            )));
        }
        if amount > listing.amount {
            return Err(MarketError::InvalidState(format!(
                "listing holds {} but the offer wants {amount}",
                listing.amount
            )));
        }
        if listing.token != *token.address() {
            return Err(MarketError::InvalidArgument(
                "token does not match the listing".into(),
            ));
        }

        let _guard = self.lock.enter()?;
        token.transfer(&self.custody, &buyer, amount, gate)?;

        let listing = self.listings.get_mut(&listing_id).expect("checked above");
        listing.amount -= amount;
        if listing.amount == 0 {
            listing.active = false;
        }
        let offer = self.offers.get_mut(&id).expect("checked above");
        offer.status = OfferStatus::Accepted;
        self.held_funds -= total;

        let fee = fee_for(total, self.transaction_fee_bps);
        self.pending_events
            .push(MarketEvent::OfferAccepted { id, total, fee });
        if fee > 0 {
            outlet.pay(&self.fee_recipient, fee)?;
        }
        outlet.pay(caller, total - fee)?;
        Ok(())
    }

    /// Seller (or marketplace owner) declines: full escrow back to the buyer.
    pub fn reject_offer(
        &mut self,
        caller: &Address,
        id: OfferId,
        outlet: &mut dyn PaymentOutlet,
    ) -> Result<(), MarketError> {
        let offer = self.offers.get(&id).ok_or(MarketError::OfferNotFound(id))?;
        if !offer.is_pending() {
            return Err(MarketError::InvalidState(format!("{id} is not pending")));
        }
        let listing = self
            .listings
            .get(&offer.listing)
            .ok_or(MarketError::ListingNotFound(offer.listing))?;
        if listing.seller != *caller && self.owner != *caller {
            return Err(MarketError::NotSeller(*caller));
        }
        let buyer = offer.buyer;
        let refund = offer.escrowed_value();

        let _guard = self.lock.enter()?;
        let offer = self.offers.get_mut(&id).expect("checked above");
        offer.status = OfferStatus::Rejected;
        self.held_funds -= refund;
        self.pending_events
            .push(MarketEvent::OfferRejected { id, refunded: refund });
        outlet.pay(&buyer, refund)?;
        Ok(())
    }

    /// Buyer withdraws a pending offer. Works after expiry too; expiry alone
    /// never releases funds.
    pub fn cancel_offer(
        &mut self,
        caller: &Address,
        id: OfferId,
        outlet: &mut dyn PaymentOutlet,
    ) -> Result<(), MarketError> {
        let offer = self.offers.get(&id).ok_or(MarketError::OfferNotFound(id))?;
        if !offer.is_pending() {
            return Err(MarketError::InvalidState(format!("{id} is not pending")));
        }
        if offer.buyer != *caller {
            return Err(MarketError::NotBuyer(*caller));
        }
        let refund = offer.escrowed_value();

        let _guard = self.lock.enter()?;
        let offer = self.offers.get_mut(&id).expect("checked above");
        offer.status = OfferStatus::Cancelled;
        self.held_funds -= refund;
        self.pending_events
            .push(MarketEvent::OfferCancelled { id, refunded: refund });
        outlet.pay(caller, refund)?;
        Ok(())
    }

    /// Drain accumulated events for the caller to index/log.
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn require_owner(&self, caller: &Address) -> Result<(), MarketError> {
        if caller != &self.owner {
            return Err(MarketError::NotOwner(*caller));
        }
        Ok(())
    }

    fn check_fee(&self, bps: u16) -> Result<(), MarketError> {
        if bps > self.params.max_fee_bps {
            return Err(MarketError::FeeTooHigh {
                bps,
                max: self.params.max_fee_bps,
            });
        }
        Ok(())
    }
}

fn checked_total(amount: u128, price_per_unit: u128) -> Result<u128, MarketError> {
    amount
        .checked_mul(price_per_unit)
        .ok_or_else(|| MarketError::InvalidArgument("order value overflows".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brix_token::{CashLedger, OpenGate, TokenError, TokenInfo};

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    const OWNER: u8 = 1;
    const CUSTODY: u8 = 2;
    const FEES: u8 = 3;
    const SELLER: u8 = 4;
    const BUYER: u8 = 5;

    fn setup() -> (Marketplace, ComplianceToken) {
        let params = PlatformParams::brix_defaults();
        let mut market = Marketplace::new(addr(CUSTODY), addr(OWNER), addr(FEES), params.clone());
        let mut token = ComplianceToken::new(
            addr(10),
            addr(OWNER),
            TokenInfo {
                name: "Maple Street 12".into(),
                symbol: "MPL12".into(),
                decimals: 0,
            },
            params,
        );
        market.allow_token(&addr(OWNER), &addr(10)).unwrap();
        token
            .mint(&addr(OWNER), &addr(SELLER), 1_000, &OpenGate)
            .unwrap();
        (market, token)
    }

    #[test]
    fn listing_requires_allowed_token() {
        let (mut market, mut token) = setup();
        market.disallow_token(&addr(OWNER), &addr(10)).unwrap();
        assert!(matches!(
            market.create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate),
            Err(MarketError::TokenNotAllowed(_))
        ));
    }

    #[test]
    fn listing_escrows_tokens_into_custody() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        assert_eq!(token.balance_of(&addr(SELLER)), 900);
        assert_eq!(token.balance_of(&addr(CUSTODY)), 100);
        assert_eq!(market.listing(id).unwrap().amount, 100);
    }

    #[test]
    fn listing_beyond_balance_creates_nothing() {
        let (mut market, mut token) = setup();
        let err = market
            .create_listing(&addr(SELLER), &mut token, 2_000, 10, &OpenGate)
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Token(TokenError::InsufficientBalance { .. })
        ));
        assert!(market.listing(ListingId::new(1)).is_none());
        assert_eq!(token.balance_of(&addr(SELLER)), 1_000);
    }

    #[test]
    fn purchase_splits_fee_exactly() {
        // 100 tokens at 10 each, buy 40: total 400, 1% fee = 4, seller 396.
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();

        let mut cash = CashLedger::new();
        market
            .purchase_listing(&addr(BUYER), id, 40, 400, &mut token, &OpenGate, &mut cash)
            .unwrap();

        assert_eq!(token.balance_of(&addr(BUYER)), 40);
        assert_eq!(token.balance_of(&addr(CUSTODY)), 60);
        assert_eq!(cash.balance(&addr(FEES)), 4);
        assert_eq!(cash.balance(&addr(SELLER)), 396);
        assert_eq!(market.listing(id).unwrap().amount, 60);
        assert!(market.listing(id).unwrap().active);
    }

    #[test]
    fn purchase_refunds_overpayment() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let mut cash = CashLedger::new();
        market
            .purchase_listing(&addr(BUYER), id, 10, 150, &mut token, &OpenGate, &mut cash)
            .unwrap();
        assert_eq!(cash.balance(&addr(BUYER)), 50);
    }

    #[test]
    fn purchase_underpayment_rejected() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let mut cash = CashLedger::new();
        assert!(matches!(
            market.purchase_listing(&addr(BUYER), id, 40, 399, &mut token, &OpenGate, &mut cash),
            Err(MarketError::BadPayment {
                expected: 400,
                provided: 399
            })
        ));
    }

    #[test]
    fn exhausted_listing_deactivates() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 50, 10, &OpenGate)
            .unwrap();
        let mut cash = CashLedger::new();
        market
            .purchase_listing(&addr(BUYER), id, 50, 500, &mut token, &OpenGate, &mut cash)
            .unwrap();
        assert!(!market.listing(id).unwrap().active);
        assert!(matches!(
            market.purchase_listing(&addr(BUYER), id, 1, 10, &mut token, &OpenGate, &mut cash),
            Err(MarketError::InvalidState(_))
        ));
    }

    #[test]
    fn tiny_settlement_fee_truncates_to_zero() {
        // Total 50 at 1% = 0.5, truncated to 0: seller gets everything.
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 1, &OpenGate)
            .unwrap();
        let mut cash = CashLedger::new();
        market
            .purchase_listing(&addr(BUYER), id, 50, 50, &mut token, &OpenGate, &mut cash)
            .unwrap();
        assert_eq!(cash.balance(&addr(FEES)), 0);
        assert_eq!(cash.balance(&addr(SELLER)), 50);
    }

    #[test]
    fn update_listing_only_shrinks() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();

        assert!(matches!(
            market.update_listing(&addr(SELLER), id, 200, 10, &mut token, &OpenGate),
            Err(MarketError::InvalidArgument(_))
        ));

        market
            .update_listing(&addr(SELLER), id, 60, 12, &mut token, &OpenGate)
            .unwrap();
        // Excess 40 returned from escrow.
        assert_eq!(token.balance_of(&addr(SELLER)), 940);
        assert_eq!(token.balance_of(&addr(CUSTODY)), 60);
        let listing = market.listing(id).unwrap();
        assert_eq!(listing.amount, 60);
        assert_eq!(listing.price_per_unit, 12);
    }

    #[test]
    fn update_listing_is_seller_only() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        assert!(matches!(
            market.update_listing(&addr(BUYER), id, 50, 10, &mut token, &OpenGate),
            Err(MarketError::NotSeller(_))
        ));
    }

    #[test]
    fn cancel_listing_returns_escrow() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        market
            .cancel_listing(&addr(SELLER), id, &mut token, &OpenGate)
            .unwrap();
        assert_eq!(token.balance_of(&addr(SELLER)), 1_000);
        assert_eq!(token.balance_of(&addr(CUSTODY)), 0);
        assert!(!market.listing(id).unwrap().active);
    }

    #[test]
    fn owner_may_cancel_any_listing() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        market
            .cancel_listing(&addr(OWNER), id, &mut token, &OpenGate)
            .unwrap();
        assert_eq!(token.balance_of(&addr(SELLER)), 1_000);
    }

    #[test]
    fn offer_escrow_must_match_exactly() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let err = market
            .create_offer(
                &addr(BUYER),
                id,
                5,
                10,
                60,
                Timestamp::new(100),
                Timestamp::new(1),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::BadPayment {
                expected: 50,
                provided: 60
            }
        ));
    }

    #[test]
    fn rejected_offer_refunds_full_escrow() {
        // 5 tokens at 10 = 50 locked; rejection refunds exactly 50 and
        // releases the hold.
        let (mut market, mut token) = setup();
        let listing = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let offer = market
            .create_offer(
                &addr(BUYER),
                listing,
                5,
                10,
                50,
                Timestamp::new(100),
                Timestamp::new(1),
            )
            .unwrap();
        assert_eq!(market.held_funds(), 50);

        let mut cash = CashLedger::new();
        market
            .reject_offer(&addr(SELLER), offer, &mut cash)
            .unwrap();
        assert_eq!(cash.balance(&addr(BUYER)), 50);
        assert_eq!(market.held_funds(), 0);
        assert_eq!(market.offer(offer).unwrap().status, OfferStatus::Rejected);
    }

    #[test]
    fn accepted_offer_settles_at_offered_price() {
        let (mut market, mut token) = setup();
        let listing = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        // Buyer bids under list: 20 tokens at 8 = 160. Fee 1% = 1 (truncated).
        let offer = market
            .create_offer(
                &addr(BUYER),
                listing,
                20,
                8,
                160,
                Timestamp::new(100),
                Timestamp::new(1),
            )
            .unwrap();

        let mut cash = CashLedger::new();
        market
            .accept_offer(
                &addr(SELLER),
                offer,
                Timestamp::new(50),
                &mut token,
                &OpenGate,
                &mut cash,
            )
            .unwrap();

        assert_eq!(token.balance_of(&addr(BUYER)), 20);
        assert_eq!(cash.balance(&addr(FEES)), 1);
        assert_eq!(cash.balance(&addr(SELLER)), 159);
        assert_eq!(market.listing(listing).unwrap().amount, 80);
        assert_eq!(market.held_funds(), 0);
    }

    #[test]
    fn expired_offer_cannot_be_accepted_but_can_be_cancelled() {
        let (mut market, mut token) = setup();
        let listing = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let offer = market
            .create_offer(
                &addr(BUYER),
                listing,
                5,
                10,
                50,
                Timestamp::new(100),
                Timestamp::new(1),
            )
            .unwrap();

        let mut cash = CashLedger::new();
        assert!(matches!(
            market.accept_offer(
                &addr(SELLER),
                offer,
                Timestamp::new(100),
                &mut token,
                &OpenGate,
                &mut cash
            ),
            Err(MarketError::InvalidState(_))
        ));
        // Funds stay locked until someone acts.
        assert_eq!(market.held_funds(), 50);

        market.cancel_offer(&addr(BUYER), offer, &mut cash).unwrap();
        assert_eq!(cash.balance(&addr(BUYER)), 50);
    }

    #[test]
    fn only_buyer_cancels_only_seller_or_owner_rejects() {
        let (mut market, mut token) = setup();
        let listing = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let offer = market
            .create_offer(
                &addr(BUYER),
                listing,
                5,
                10,
                50,
                Timestamp::new(100),
                Timestamp::new(1),
            )
            .unwrap();

        let mut cash = CashLedger::new();
        assert!(matches!(
            market.cancel_offer(&addr(SELLER), offer, &mut cash),
            Err(MarketError::NotBuyer(_))
        ));
        assert!(matches!(
            market.reject_offer(&addr(BUYER), offer, &mut cash),
            Err(MarketError::NotSeller(_))
        ));
        market.reject_offer(&addr(OWNER), offer, &mut cash).unwrap();
    }

    #[test]
    fn settled_offer_cannot_be_reused() {
        let (mut market, mut token) = setup();
        let listing = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        let offer = market
            .create_offer(
                &addr(BUYER),
                listing,
                5,
                10,
                50,
                Timestamp::new(100),
                Timestamp::new(1),
            )
            .unwrap();
        let mut cash = CashLedger::new();
        market
            .accept_offer(
                &addr(SELLER),
                offer,
                Timestamp::new(50),
                &mut token,
                &OpenGate,
                &mut cash,
            )
            .unwrap();
        assert!(matches!(
            market.cancel_offer(&addr(BUYER), offer, &mut cash),
            Err(MarketError::InvalidState(_))
        ));
        assert!(matches!(
            market.reject_offer(&addr(SELLER), offer, &mut cash),
            Err(MarketError::InvalidState(_))
        ));
    }

    #[test]
    fn offer_on_inactive_listing_rejected() {
        let (mut market, mut token) = setup();
        let listing = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        market
            .cancel_listing(&addr(SELLER), listing, &mut token, &OpenGate)
            .unwrap();
        assert!(matches!(
            market.create_offer(
                &addr(BUYER),
                listing,
                5,
                10,
                50,
                Timestamp::new(100),
                Timestamp::new(1)
            ),
            Err(MarketError::InvalidState(_))
        ));
    }

    #[test]
    fn fee_setters_enforce_ceiling() {
        let (mut market, _token) = setup();
        assert!(matches!(
            market.set_transaction_fee(&addr(OWNER), 1_001),
            Err(MarketError::FeeTooHigh { .. })
        ));
        market.set_transaction_fee(&addr(OWNER), 1_000).unwrap();
        assert_eq!(market.transaction_fee_bps(), 1_000);

        assert!(matches!(
            market.set_listing_fee(&addr(BUYER), 10),
            Err(MarketError::NotOwner(_))
        ));
        market.set_listing_fee(&addr(OWNER), 10).unwrap();
        assert_eq!(market.listing_fee_bps(), 10);
    }

    #[test]
    fn fee_recipient_must_be_non_null() {
        let (mut market, _token) = setup();
        assert!(market
            .set_fee_recipient(&addr(OWNER), &Address::ZERO)
            .is_err());
        market.set_fee_recipient(&addr(OWNER), &addr(9)).unwrap();
        assert_eq!(market.fee_recipient(), &addr(9));
    }

    #[test]
    fn disallow_leaves_existing_listings_releasable() {
        let (mut market, mut token) = setup();
        let id = market
            .create_listing(&addr(SELLER), &mut token, 100, 10, &OpenGate)
            .unwrap();
        market.disallow_token(&addr(OWNER), &addr(10)).unwrap();
        market
            .cancel_listing(&addr(SELLER), id, &mut token, &OpenGate)
            .unwrap();
        assert_eq!(token.balance_of(&addr(SELLER)), 1_000);
    }

    #[test]
    fn fee_for_truncates_down() {
        assert_eq!(fee_for(400, 100), 4);
        assert_eq!(fee_for(50, 100), 0);
        assert_eq!(fee_for(10_000, 1_000), 1_000);
        // Overflow fallback stays close to the exact value.
        assert_eq!(fee_for(u128::MAX - 5, 10_000), u128::MAX - 5);
    }
}
