//! The composed identity registry — the platform's single source of truth for
//! "is this account verified".

use brix_types::{Address, ClaimTopic, CountryCode};

use crate::claims::ClaimSource;
use crate::error::IdentityError;
use crate::events::IdentityEvent;
use crate::issuers::TrustedIssuerRegistry;
use crate::store::{IdentityRecord, IdentityStore};
use crate::topics::ClaimTopicsRegistry;

/// Composes identity storage, trusted issuers, and required claim topics.
///
/// Verification is always derived fresh per call — there is no cached
/// verification state, so swapping a sub-registry takes effect prospectively
/// and never triggers a recompute.
#[derive(Clone, Debug)]
pub struct IdentityRegistry {
    owner: Address,
    store: IdentityStore,
    issuers: TrustedIssuerRegistry,
    topics: ClaimTopicsRegistry,
    pending_events: Vec<IdentityEvent>,
}

impl IdentityRegistry {
    /// Create a registry whose sub-registries share the same owner.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            store: IdentityStore::new(owner),
            issuers: TrustedIssuerRegistry::new(owner),
            topics: ClaimTopicsRegistry::new(owner),
            pending_events: Vec::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    fn require_owner(&self, caller: &Address) -> Result<(), IdentityError> {
        if caller != &self.owner {
            return Err(IdentityError::NotOwner(*caller));
        }
        Ok(())
    }

    // ── Identity CRUD ────────────────────────────────────────────────────

    pub fn register_identity(
        &mut self,
        caller: &Address,
        account: &Address,
        identity: &Address,
        country: CountryCode,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.store.add_identity(caller, account, identity, country)?;
        self.pending_events.push(IdentityEvent::IdentityRegistered {
            account: *account,
            identity: *identity,
        });
        self.pending_events.push(IdentityEvent::CountryUpdated {
            account: *account,
            country,
        });
        Ok(())
    }

    pub fn update_identity(
        &mut self,
        caller: &Address,
        account: &Address,
        identity: &Address,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.store.update_identity(caller, account, identity)?;
        self.pending_events.push(IdentityEvent::IdentityUpdated {
            account: *account,
            identity: *identity,
        });
        Ok(())
    }

    pub fn update_country(
        &mut self,
        caller: &Address,
        account: &Address,
        country: CountryCode,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.store.update_country(caller, account, country)?;
        self.pending_events.push(IdentityEvent::CountryUpdated {
            account: *account,
            country,
        });
        Ok(())
    }

    /// Remove an account's record; identity and country go atomically.
    pub fn delete_identity(
        &mut self,
        caller: &Address,
        account: &Address,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        let removed = self.store.remove_identity(caller, account)?;
        self.pending_events.push(IdentityEvent::IdentityRemoved {
            account: *account,
            identity: removed.identity,
        });
        Ok(())
    }

    // ── Issuer / topic administration (delegated, evented here) ──────────

    pub fn add_trusted_issuer(
        &mut self,
        caller: &Address,
        issuer: &Address,
        topics: Vec<ClaimTopic>,
    ) -> Result<(), IdentityError> {
        self.issuers
            .add_trusted_issuer(caller, issuer, topics.clone())?;
        self.pending_events.push(IdentityEvent::TrustedIssuerAdded {
            issuer: *issuer,
            topics,
        });
        Ok(())
    }

    pub fn remove_trusted_issuer(
        &mut self,
        caller: &Address,
        issuer: &Address,
    ) -> Result<(), IdentityError> {
        self.issuers.remove_trusted_issuer(caller, issuer)?;
        self.pending_events
            .push(IdentityEvent::TrustedIssuerRemoved { issuer: *issuer });
        Ok(())
    }

    pub fn update_issuer_topics(
        &mut self,
        caller: &Address,
        issuer: &Address,
        topics: Vec<ClaimTopic>,
    ) -> Result<(), IdentityError> {
        self.issuers
            .update_issuer_topics(caller, issuer, topics.clone())?;
        self.pending_events.push(IdentityEvent::IssuerTopicsUpdated {
            issuer: *issuer,
            topics,
        });
        Ok(())
    }

    pub fn add_claim_topic(
        &mut self,
        caller: &Address,
        topic: ClaimTopic,
    ) -> Result<(), IdentityError> {
        self.topics.add_claim_topic(caller, topic)?;
        self.pending_events
            .push(IdentityEvent::ClaimTopicAdded { topic });
        Ok(())
    }

    pub fn remove_claim_topic(
        &mut self,
        caller: &Address,
        topic: ClaimTopic,
    ) -> Result<(), IdentityError> {
        self.topics.remove_claim_topic(caller, topic)?;
        self.pending_events
            .push(IdentityEvent::ClaimTopicRemoved { topic });
        Ok(())
    }

    // ── Sub-registry pointers ────────────────────────────────────────────

    /// Swap the identity storage wholesale. Prospective only.
    pub fn set_identity_store(
        &mut self,
        caller: &Address,
        store: IdentityStore,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.store = store;
        self.pending_events.push(IdentityEvent::IdentityStoreSet);
        Ok(())
    }

    pub fn set_trusted_issuers_registry(
        &mut self,
        caller: &Address,
        issuers: TrustedIssuerRegistry,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.issuers = issuers;
        self.pending_events
            .push(IdentityEvent::TrustedIssuersRegistrySet);
        Ok(())
    }

    pub fn set_claim_topics_registry(
        &mut self,
        caller: &Address,
        topics: ClaimTopicsRegistry,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.topics = topics;
        self.pending_events
            .push(IdentityEvent::ClaimTopicsRegistrySet);
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn contains(&self, account: &Address) -> bool {
        self.store.contains(account)
    }

    pub fn identity_of(&self, account: &Address) -> Option<Address> {
        self.store.stored_identity(account).map(|r| r.identity)
    }

    pub fn investor_country(&self, account: &Address) -> Option<CountryCode> {
        self.store.stored_country(account)
    }

    pub fn issuers(&self) -> &TrustedIssuerRegistry {
        &self.issuers
    }

    pub fn topics(&self) -> &ClaimTopicsRegistry {
        &self.topics
    }

    /// Derive whether `account` is verified. Never errors: unregistered
    /// accounts, malformed identities, and failing claim sources all read as
    /// "not verified" (or "claim doesn't count"), never as a registry failure.
    pub fn is_verified(&self, account: &Address, claims: &dyn ClaimSource) -> bool {
        let Some(record) = self.store.stored_identity(account) else {
            return false;
        };
        let required = self.topics.claim_topics();
        if required.is_empty() {
            // KYC off: every registered identity passes.
            return true;
        }
        if self.issuers.is_empty() {
            return false;
        }
        required
            .iter()
            .all(|topic| self.topic_satisfied(record, *topic, claims))
    }

    /// One required topic is satisfied by the first resolvable claim whose
    /// issuer is trusted for that topic. Lookup failures are swallowed.
    fn topic_satisfied(
        &self,
        record: &IdentityRecord,
        topic: ClaimTopic,
        claims: &dyn ClaimSource,
    ) -> bool {
        let claim_ids = match claims.claim_ids_by_topic(&record.identity, topic) {
            Ok(ids) => ids,
            Err(_) => return false,
        };
        for claim_id in claim_ids {
            let claim = match claims.claim(&record.identity, &claim_id) {
                Ok(claim) => claim,
                // External identity contract erroring: this claim doesn't count.
                Err(_) => continue,
            };
            if claim.topic == topic && self.issuers.has_topic(&claim.issuer, topic) {
                return true;
            }
        }
        false
    }

    /// Drain accumulated events for the caller to index/log.
    pub fn drain_events(&mut self) -> Vec<IdentityEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
