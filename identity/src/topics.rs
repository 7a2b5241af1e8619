//! Claim topics registry — the set of topics required for verification.

use brix_types::{Address, ClaimTopic};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Owner-gated ordered set of required claim topics.
///
/// An empty set means every registered identity is trivially verified — the
/// explicit "KYC off" state. This is policy, not an accident; callers that
/// want gating must require at least one topic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClaimTopicsRegistry {
    owner: Address,
    topics: Vec<ClaimTopic>,
}

impl ClaimTopicsRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            topics: Vec::new(),
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

    pub fn add_claim_topic(
        &mut self,
        caller: &Address,
        topic: ClaimTopic,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        if self.topics.contains(&topic) {
            return Err(IdentityError::TopicAlreadyExists(topic.id()));
        }
        self.topics.push(topic);
        Ok(())
    }

    pub fn remove_claim_topic(
        &mut self,
        caller: &Address,
        topic: ClaimTopic,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        let before = self.topics.len();
        self.topics.retain(|t| t != &topic);
        if self.topics.len() == before {
            return Err(IdentityError::TopicNotFound(topic.id()));
        }
        Ok(())
    }

    /// Required topics, in insertion order.
    pub fn claim_topics(&self) -> &[ClaimTopic] {
        &self.topics
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[test]
    fn add_preserves_insertion_order() {
        let owner = addr(1);
        let mut registry = ClaimTopicsRegistry::new(owner);
        registry.add_claim_topic(&owner, ClaimTopic::new(7)).unwrap();
        registry.add_claim_topic(&owner, ClaimTopic::new(1)).unwrap();

        assert_eq!(
            registry.claim_topics(),
            &[ClaimTopic::new(7), ClaimTopic::new(1)]
        );
    }

    #[test]
    fn duplicates_rejected() {
        let owner = addr(1);
        let mut registry = ClaimTopicsRegistry::new(owner);
        registry.add_claim_topic(&owner, ClaimTopic::new(1)).unwrap();
        assert!(matches!(
            registry.add_claim_topic(&owner, ClaimTopic::new(1)),
            Err(IdentityError::TopicAlreadyExists(1))
        ));
    }

    #[test]
    fn remove_missing_topic_is_not_found() {
        let owner = addr(1);
        let mut registry = ClaimTopicsRegistry::new(owner);
        assert!(matches!(
            registry.remove_claim_topic(&owner, ClaimTopic::new(1)),
            Err(IdentityError::TopicNotFound(1))
        ));
    }

    #[test]
    fn non_owner_rejected() {
        let mut registry = ClaimTopicsRegistry::new(addr(1));
        assert!(matches!(
            registry.add_claim_topic(&addr(9), ClaimTopic::new(1)),
            Err(IdentityError::NotOwner(_))
        ));
    }
}
