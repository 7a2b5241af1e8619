//! Deployment wiring: one config in, every engine out.
//!
//! `Deployment` owns the identity registry, claim vault, token, marketplace,
//! and a native cash ledger, and exposes the high-level flows the platform
//! operator actually runs. It is also the one place engine events are drained
//! and logged.

use brix_identity::{Claim, ClaimVault, IdentityError, IdentityRegistry};
use brix_market::Marketplace;
use brix_token::{CashLedger, ComplianceToken, TokenInfo, VerificationGate};
use brix_types::{Address, ClaimTopic, CountryCode, ListingId, OfferId, PlatformParams, Timestamp};
use brix_utils::format_duration;
use tracing::info;

use crate::config::PlatformConfig;
use crate::PlatformError;

pub struct Deployment {
    pub registry: IdentityRegistry,
    pub claims: ClaimVault,
    pub token: ComplianceToken,
    pub market: Marketplace,
    pub cash: CashLedger,
    owner: Address,
}

impl Deployment {
    /// Wire up a full deployment from a validated config.
    pub fn from_config(config: &PlatformConfig) -> Result<Self, PlatformError> {
        config.validate()?;
        let owner = Address::from_hex(&config.owner).expect("validated");
        let token_address = Address::from_hex(&config.token_address).expect("validated");
        let custody = Address::from_hex(&config.market_custody).expect("validated");
        let fee_recipient = Address::from_hex(&config.fee_recipient).expect("validated");

        let params = PlatformParams {
            recovery_address_count: config.recovery_address_count,
            max_fee_bps: config.max_fee_bps,
            default_transaction_fee_bps: config.transaction_fee_bps,
            default_listing_fee_bps: config.listing_fee_bps,
            ..PlatformParams::brix_defaults()
        };

        let mut registry = IdentityRegistry::new(owner);
        for topic in &config.required_claim_topics {
            registry.add_claim_topic(&owner, ClaimTopic::new(*topic))?;
        }
        for issuer in &config.trusted_issuers {
            let issuer_addr = Address::from_hex(&issuer.address).expect("validated");
            let topics = issuer.topics.iter().copied().map(ClaimTopic::new).collect();
            registry.add_trusted_issuer(&owner, &issuer_addr, topics)?;
        }

        let mut token = ComplianceToken::new(
            token_address,
            owner,
            TokenInfo {
                name: config.token_name.clone(),
                symbol: config.token_symbol.clone(),
                decimals: config.token_decimals,
            },
            params.clone(),
        );
        if !config.recovery_addresses.is_empty() {
            let addresses = config
                .recovery_addresses
                .iter()
                .map(|a| Address::from_hex(a).expect("validated"))
                .collect();
            token.set_recovery_addresses(&owner, addresses)?;
        }

        let mut market = Marketplace::new(custody, owner, fee_recipient, params);
        market.allow_token(&owner, &token_address)?;

        info!(%owner, token = %token_address, %custody, "deployment wired");
        let mut deployment = Self {
            registry,
            claims: ClaimVault::new(),
            token,
            market,
            cash: CashLedger::new(),
            owner,
        };
        deployment.log_events();
        Ok(deployment)
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    // ── Identity flows ───────────────────────────────────────────────────

    pub fn register_investor(
        &mut self,
        account: &Address,
        identity: &Address,
        country: CountryCode,
    ) -> Result<(), PlatformError> {
        let owner = self.owner;
        self.registry
            .register_identity(&owner, account, identity, country)?;
        self.log_events();
        Ok(())
    }

    /// Issue a claim into the vault for a registered account's identity.
    pub fn attest(&mut self, account: &Address, claim: Claim) -> Result<(), PlatformError> {
        let identity = self
            .registry
            .identity_of(account)
            .ok_or(IdentityError::NotRegistered(*account))?;
        self.claims.issue_claim(&identity, claim);
        Ok(())
    }

    pub fn is_verified(&self, account: &Address) -> bool {
        self.registry.is_verified(account, &self.claims)
    }

    // ── Token flows ──────────────────────────────────────────────────────

    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), PlatformError> {
        let owner = self.owner;
        let gate = VerificationGate::new(&self.registry, &self.claims);
        self.token.mint(&owner, to, amount, &gate)?;
        self.log_events();
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), PlatformError> {
        let gate = VerificationGate::new(&self.registry, &self.claims);
        self.token.transfer(from, to, amount, &gate)?;
        self.log_events();
        Ok(())
    }

    pub fn recover_account(
        &mut self,
        caller: &Address,
        lost: &Address,
        new: &Address,
    ) -> Result<(), PlatformError> {
        let gate = VerificationGate::new(&self.registry, &self.claims);
        self.token.recover_account(caller, lost, new, &gate)?;
        self.log_events();
        Ok(())
    }

    pub fn receive_income(&mut self, amount: u128) -> Result<(), PlatformError> {
        let owner = self.owner;
        self.token.receive_rental_income(&owner, amount)?;
        self.log_events();
        Ok(())
    }

    pub fn distribute_income(&mut self, now: Timestamp) -> Result<u128, PlatformError> {
        let owner = self.owner;
        let previous = self.token.last_income_distribution();
        let distributed = self.token.distribute_rental_income(&owner, now)?;
        if let Some(previous) = previous {
            info!(
                distributed,
                since_last = %format_duration(previous.elapsed_since(now)),
                "rental income distributed"
            );
        }
        self.log_events();
        Ok(distributed)
    }

    pub fn claim_income(&mut self, holder: &Address) -> Result<u128, PlatformError> {
        let amount = self.token.claim_rental_income(holder, &mut self.cash)?;
        self.log_events();
        Ok(amount)
    }

    // ── Marketplace flows ────────────────────────────────────────────────

    pub fn create_listing(
        &mut self,
        seller: &Address,
        amount: u128,
        price_per_unit: u128,
    ) -> Result<ListingId, PlatformError> {
        let gate = VerificationGate::new(&self.registry, &self.claims);
        let id = self
            .market
            .create_listing(seller, &mut self.token, amount, price_per_unit, &gate)?;
        self.log_events();
        Ok(id)
    }

    pub fn purchase_listing(
        &mut self,
        buyer: &Address,
        id: ListingId,
        amount: u128,
        payment: u128,
    ) -> Result<(), PlatformError> {
        let gate = VerificationGate::new(&self.registry, &self.claims);
        self.market.purchase_listing(
            buyer,
            id,
            amount,
            payment,
            &mut self.token,
            &gate,
            &mut self.cash,
        )?;
        self.log_events();
        Ok(())
    }

    pub fn create_offer(
        &mut self,
        buyer: &Address,
        listing: ListingId,
        amount: u128,
        price_per_unit: u128,
        payment: u128,
        expiration: Timestamp,
        now: Timestamp,
    ) -> Result<OfferId, PlatformError> {
        let id = self.market.create_offer(
            buyer,
            listing,
            amount,
            price_per_unit,
            payment,
            expiration,
            now,
        )?;
        self.log_events();
        Ok(id)
    }

    pub fn accept_offer(
        &mut self,
        seller: &Address,
        id: OfferId,
        now: Timestamp,
    ) -> Result<(), PlatformError> {
        let gate = VerificationGate::new(&self.registry, &self.claims);
        self.market
            .accept_offer(seller, id, now, &mut self.token, &gate, &mut self.cash)?;
        self.log_events();
        Ok(())
    }

    pub fn reject_offer(&mut self, caller: &Address, id: OfferId) -> Result<(), PlatformError> {
        self.market.reject_offer(caller, id, &mut self.cash)?;
        self.log_events();
        Ok(())
    }

    pub fn cancel_offer(&mut self, buyer: &Address, id: OfferId) -> Result<(), PlatformError> {
        self.market.cancel_offer(buyer, id, &mut self.cash)?;
        self.log_events();
        Ok(())
    }

    pub fn cancel_listing(&mut self, caller: &Address, id: ListingId) -> Result<(), PlatformError> {
        let gate = VerificationGate::new(&self.registry, &self.claims);
        self.market
            .cancel_listing(caller, id, &mut self.token, &gate)?;
        self.log_events();
        Ok(())
    }

    /// Drain and log every engine's pending events.
    pub fn log_events(&mut self) {
        for event in self.registry.drain_events() {
            info!(?event, "identity event");
        }
        for event in self.token.drain_events() {
            info!(?event, "token event");
        }
        for event in self.market.drain_events() {
            info!(?event, "market event");
        }
    }
}
