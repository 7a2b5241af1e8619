//! Identity storage — account → (identity contract, country) mappings.

use brix_types::{Address, CountryCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::IdentityError;

/// One registered investor: the linked identity contract and tax residence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Address of the investor's external identity contract.
    pub identity: Address,
    /// ISO-3166 numeric country code.
    pub country: CountryCode,
}

/// Owner-gated CRUD over identity records.
///
/// An account has at most one record; a record never exists with a null
/// identity address; removal drops identity and country together.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityStore {
    owner: Address,
    records: HashMap<Address, IdentityRecord>,
}

impl IdentityStore {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            records: HashMap::new(),
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

    /// Create a record. Fails on null addresses or an existing record.
    pub fn add_identity(
        &mut self,
        caller: &Address,
        account: &Address,
        identity: &Address,
        country: CountryCode,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        if account.is_zero() || identity.is_zero() {
            return Err(IdentityError::InvalidArgument(
                "account and identity must be non-null".into(),
            ));
        }
        if self.records.contains_key(account) {
            return Err(IdentityError::AlreadyRegistered(*account));
        }
        self.records.insert(
            *account,
            IdentityRecord {
                identity: *identity,
                country,
            },
        );
        Ok(())
    }

    pub fn update_identity(
        &mut self,
        caller: &Address,
        account: &Address,
        identity: &Address,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        if identity.is_zero() {
            return Err(IdentityError::InvalidArgument(
                "identity must be non-null".into(),
            ));
        }
        let record = self
            .records
            .get_mut(account)
            .ok_or(IdentityError::NotRegistered(*account))?;
        record.identity = *identity;
        Ok(())
    }

    pub fn update_country(
        &mut self,
        caller: &Address,
        account: &Address,
        country: CountryCode,
    ) -> Result<(), IdentityError> {
        self.require_owner(caller)?;
        let record = self
            .records
            .get_mut(account)
            .ok_or(IdentityError::NotRegistered(*account))?;
        record.country = country;
        Ok(())
    }

    /// Remove a record (identity and country go together). Returns the
    /// removed record.
    pub fn remove_identity(
        &mut self,
        caller: &Address,
        account: &Address,
    ) -> Result<IdentityRecord, IdentityError> {
        self.require_owner(caller)?;
        self.records
            .remove(account)
            .ok_or(IdentityError::NotRegistered(*account))
    }

    pub fn stored_identity(&self, account: &Address) -> Option<&IdentityRecord> {
        self.records.get(account)
    }

    pub fn stored_country(&self, account: &Address) -> Option<CountryCode> {
        self.records.get(account).map(|r| r.country)
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.records.contains_key(account)
    }
}
