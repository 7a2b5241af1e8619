//! Owner/agent access control, by composition rather than inheritance.

use brix_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::TokenError;

/// Owner plus a flat agent set. The owner is always an implicit agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    agents: BTreeSet<Address>,
}

impl AccessControl {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            agents: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_agent(&self, account: &Address) -> bool {
        account == &self.owner || self.agents.contains(account)
    }

    pub fn require_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if caller != &self.owner {
            return Err(TokenError::NotOwner(*caller));
        }
        Ok(())
    }

    pub fn require_agent(&self, caller: &Address) -> Result<(), TokenError> {
        if !self.is_agent(caller) {
            return Err(TokenError::NotAgent(*caller));
        }
        Ok(())
    }

    pub fn add_agent(&mut self, caller: &Address, agent: &Address) -> Result<(), TokenError> {
        self.require_owner(caller)?;
        if agent.is_zero() {
            return Err(TokenError::InvalidArgument("agent must be non-null".into()));
        }
        if !self.agents.insert(*agent) {
            return Err(TokenError::InvalidArgument(format!(
                "{agent} is already an agent"
            )));
        }
        Ok(())
    }

    pub fn remove_agent(&mut self, caller: &Address, agent: &Address) -> Result<(), TokenError> {
        self.require_owner(caller)?;
        if !self.agents.remove(agent) {
            return Err(TokenError::InvalidArgument(format!(
                "{agent} is not an agent"
            )));
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), TokenError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::InvalidArgument("owner must be non-null".into()));
        }
        self.owner = *new_owner;
        Ok(())
    }
}
