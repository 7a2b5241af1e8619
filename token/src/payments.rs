//! Native-value payout capability.
//!
//! Paying a seller, refunding a buyer, or releasing claimed rental income all
//! hand value to arbitrary recipient code. Engines reach that code through
//! [`PaymentOutlet`] so the transfer can fail loudly (`ExternalCallFailed`)
//! and tests can swap in hostile or failing recipients.

use brix_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment of {amount} to {to} rejected: {reason}")]
    Rejected {
        to: Address,
        amount: u128,
        reason: String,
    },
}

/// Capability to push native value to a recipient.
pub trait PaymentOutlet {
    fn pay(&mut self, to: &Address, amount: u128) -> Result<(), PaymentError>;
}

/// In-memory native-value ledger. The workspace's stand-in for the hosting
/// ledger's coin balances; payments into it never fail.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CashLedger {
    balances: HashMap<Address, u128>,
}

impl CashLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&mut self, to: &Address, amount: u128) {
        *self.balances.entry(*to).or_default() += amount;
    }

    pub fn balance(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

impl PaymentOutlet for CashLedger {
    fn pay(&mut self, to: &Address, amount: u128) -> Result<(), PaymentError> {
        self.deposit(to, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposits_accumulate() {
        let mut ledger = CashLedger::new();
        let acct = Address::new([1; 20]);
        ledger.pay(&acct, 40).unwrap();
        ledger.pay(&acct, 2).unwrap();
        assert_eq!(ledger.balance(&acct), 42);
    }
}
