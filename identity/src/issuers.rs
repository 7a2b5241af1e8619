//! Trusted issuer registry — which attestors are trusted, and for which topics.

use brix_types::{Address, ClaimTopic};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::IdentityError;

/// Owner-gated registry of trusted claim issuers.
///
/// An issuer either has an entry (trusted, with zero or more authorized
/// topics) or has none; removal drops all its topic authorizations with it.
/// Iteration order is deterministic (BTreeMap) so verification scans are
/// reproducible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrustedIssuerRegistry {
    owner: Address,
    issuers: BTreeMap<Address, BTreeSet<ClaimTopic>>,
}

impl TrustedIssuerRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            issuers: BTreeMap::new(),
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

    pub fn add_trusted_issuer(
        &mut self,
        caller: &Address,
        issuer: &Address,
        topics: Vec<ClaimTopic>,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        if issuer.is_zero() {
            return Err(IdentityError::InvalidArgument(
                "issuer must be non-null".into(),
            ));
        }
        if self.issuers.contains_key(issuer) {
            return Err(IdentityError::IssuerAlreadyExists(*issuer));
        }
        self.issuers.insert(*issuer, topics.into_iter().collect());
        Ok(())
    }

    pub fn remove_trusted_issuer(
        &mut self,
        caller: &Address,
        issuer: &Address,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        self.issuers
            .remove(issuer)
            .map(|_| ())
            .ok_or(IdentityError::IssuerNotFound(*issuer))
    }

    /// Replace an issuer's authorized topic set.
    pub fn update_issuer_topics(
        &mut self,
        caller: &Address,
        issuer: &Address,
        topics: Vec<ClaimTopic>,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        let entry = self
            .issuers
            .get_mut(issuer)
            .ok_or(IdentityError::IssuerNotFound(*issuer))?;
        *entry = topics.into_iter().collect();
        Ok(())
    }

    pub fn is_trusted(&self, issuer: &Address) -> bool {
        self.issuers.contains_key(issuer)
    }

    /// Whether `issuer` is trusted AND authorized for `topic`.
    pub fn has_topic(&self, issuer: &Address, topic: ClaimTopic) -> bool {
        self.issuers
            .get(issuer)
            .is_some_and(|topics| topics.contains(&topic))
    }

    pub fn issuer_topics(&self, issuer: &Address) -> Option<Vec<ClaimTopic>> {
        self.issuers
            .get(issuer)
            .map(|topics| topics.iter().copied().collect())
    }

    pub fn trusted_issuers(&self) -> Vec<Address> {
        self.issuers.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}
