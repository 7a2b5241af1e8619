//! Claim lookup capability and the in-memory claim vault.
//!
//! An investor's identity lives in an external identity contract that exposes
//! claims. The registry talks to it through [`ClaimSource`] and treats every
//! lookup failure as "this claim doesn't count" — external identity contracts
//! are unpredictable and must never take the registry down with them.

use brix_types::{Address, ClaimId, ClaimTopic};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A single attestation held by an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub topic: ClaimTopic,
    /// Signature scheme identifier (opaque to the registry).
    pub scheme: u64,
    /// The attestor that issued this claim.
    pub issuer: Address,
    /// Issuer signature over the claim data (opaque bytes, carried for indexers).
    pub signature: Vec<u8>,
    /// Attestation payload (opaque bytes).
    pub data: Vec<u8>,
    /// Off-chain reference for the attestation.
    pub uri: String,
}

/// Failures surfaced by a claim source. The verification algorithm swallows
/// all of these; they exist so implementations can be precise about what went
/// wrong (useful in logs and tests).
#[derive(Debug, Error)]
pub enum ClaimLookupError {
    #[error("identity {0} unknown to this claim source")]
    UnknownIdentity(Address),

    #[error("claim {0} not found")]
    UnknownClaim(ClaimId),

    #[error("claim source unavailable: {0}")]
    Unavailable(String),
}

/// Capability interface over an external identity contract's claim storage.
pub trait ClaimSource {
    /// Ids of the claims an identity holds under a topic.
    fn claim_ids_by_topic(
        &self,
        identity: &Address,
        topic: ClaimTopic,
    ) -> Result<Vec<ClaimId>, ClaimLookupError>;

    /// Resolve a single claim by id.
    fn claim(&self, identity: &Address, claim_id: &ClaimId)
        -> Result<Claim, ClaimLookupError>;
}

/// In-memory claim storage keyed by identity address.
///
/// Stands in for the on-chain identity contracts of a live deployment; issuers
/// write claims here and the registry reads them back through [`ClaimSource`].
#[derive(Clone, Debug, Default)]
pub struct ClaimVault {
    claims: HashMap<Address, HashMap<ClaimId, Claim>>,
}

impl ClaimVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a claim for an identity, keyed by the canonical derived id.
    /// Re-issuing under the same (identity, issuer, topic) overwrites.
    pub fn issue_claim(&mut self, identity: &Address, claim: Claim) -> ClaimId {
        let id = ClaimId::derive(identity, &claim.issuer, claim.topic);
        self.claims.entry(*identity).or_default().insert(id, claim);
        id
    }

    /// Remove a claim. Returns the removed claim if it existed.
    pub fn revoke_claim(&mut self, identity: &Address, claim_id: &ClaimId) -> Option<Claim> {
        self.claims.get_mut(identity)?.remove(claim_id)
    }

    pub fn has_claim(&self, identity: &Address, claim_id: &ClaimId) -> bool {
        self.claims
            .get(identity)
            .is_some_and(|by_id| by_id.contains_key(claim_id))
    }
}

impl ClaimSource for ClaimVault {
    fn claim_ids_by_topic(
        &self,
        identity: &Address,
        topic: ClaimTopic,
    ) -> Result<Vec<ClaimId>, ClaimLookupError> {
        let by_id = self
            .claims
            .get(identity)
            .ok_or(ClaimLookupError::UnknownIdentity(*identity))?;
        let mut ids: Vec<ClaimId> = by_id
            .iter()
            .filter(|(_, claim)| claim.topic == topic)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn claim(
        &self,
        identity: &Address,
        claim_id: &ClaimId,
    ) -> Result<Claim, ClaimLookupError> {
        self.claims
            .get(identity)
            .ok_or(ClaimLookupError::UnknownIdentity(*identity))?
            .get(claim_id)
            .cloned()
            .ok_or(ClaimLookupError::UnknownClaim(*claim_id))
    }
}
