//! Lost-account recovery — a per-account threshold multisig.
//!
//! The platform designates a fixed number of recovery addresses. Each may
//! approve moving a lost account's balance once; at majority the whole
//! balance moves and the approvals reset so the mechanism can serve future
//! recoveries. Recovery addresses are an explicit enumerable set — never
//! derived or recomputed.

use brix_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::TokenError;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecoveryState {
    addresses: Vec<Address>,
    /// lost account → recovery addresses that have approved.
    approvals: HashMap<Address, BTreeSet<Address>>,
}

impl RecoveryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recovery-address set. Clears all in-flight approvals —
    /// approvals from a retired set must not count toward a new one.
    pub fn set_addresses(
        &mut self,
        addresses: Vec<Address>,
        expected_count: usize,
    ) -> Result<(), TokenError> {
        if addresses.len() != expected_count {
            return Err(TokenError::InvalidArgument(format!(
                "expected {expected_count} recovery addresses, got {}",
                addresses.len()
            )));
        }
        let unique: BTreeSet<&Address> = addresses.iter().collect();
        if unique.len() != addresses.len() || addresses.iter().any(Address::is_zero) {
            return Err(TokenError::InvalidArgument(
                "recovery addresses must be unique and non-null".into(),
            ));
        }
        self.addresses = addresses;
        self.approvals.clear();
        Ok(())
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn is_recovery_address(&self, account: &Address) -> bool {
        self.addresses.contains(account)
    }

    /// Record one approval. Returns the approval count for `lost` afterward.
    pub fn approve(&mut self, lost: &Address, approver: &Address) -> Result<usize, TokenError> {
        if !self.is_recovery_address(approver) {
            return Err(TokenError::NotRecoveryAddress(*approver));
        }
        let approvals = self.approvals.entry(*lost).or_default();
        if !approvals.insert(*approver) {
            return Err(TokenError::AlreadyRequested(*approver));
        }
        Ok(approvals.len())
    }

    pub fn approval_count(&self, lost: &Address) -> usize {
        self.approvals.get(lost).map_or(0, BTreeSet::len)
    }

    /// Reset all approvals for a recovered account.
    pub fn clear(&mut self, lost: &Address) {
        self.approvals.remove(lost);
    }
}
