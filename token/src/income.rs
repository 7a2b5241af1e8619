//! Rental-income bookkeeping — cumulative per-token accumulator.
//!
//! Distribution advances a global `income_per_token` accumulator (scaled by
//! `income_precision`) in O(1), independent of the holder count. Each account
//! carries a checkpoint of the accumulator; whenever its balance is about to
//! change (or it claims), accrued income since the checkpoint is settled into
//! `unclaimed` first, so balances and accruals never drift apart.

use brix_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct IncomeAccount {
    /// The global accumulator value this account last settled against.
    checkpoint: u128,
    /// Accrued, not-yet-claimed income (raw native units).
    unclaimed: u128,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IncomeState {
    /// Received but not yet distributed income.
    pool: u128,
    /// Cumulative income per token, scaled by `income_precision`.
    income_per_token: u128,
    last_distribution: Option<Timestamp>,
    accounts: HashMap<Address, IncomeAccount>,
}

/// `a * b / den` with an overflow fallback that splits `a` by the
/// denominator; the fallback truncates at most the low-order remainder.
fn mul_div(a: u128, b: u128, den: u128) -> u128 {
    match a.checked_mul(b) {
        Some(product) => product / den,
        None => (a / den)
            .saturating_mul(b)
            .saturating_add((a % den).saturating_mul(b) / den),
    }
}

impl IncomeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self) -> u128 {
        self.pool
    }

    pub fn last_distribution(&self) -> Option<Timestamp> {
        self.last_distribution
    }

    pub fn receive(&mut self, amount: u128) {
        self.pool = self.pool.saturating_add(amount);
    }

    /// Fold the pending pool into the accumulator. Returns the distributed
    /// amount. Caller guarantees `supply > 0` and a non-empty pool.
    pub fn distribute(&mut self, supply: u128, precision: u128, now: Timestamp) -> u128 {
        let distributed = self.pool;
        self.income_per_token = self
            .income_per_token
            .saturating_add(mul_div(distributed, precision, supply));
        self.pool = 0;
        self.last_distribution = Some(now);
        distributed
    }

    /// Settle an account against the accumulator before its balance changes.
    pub fn settle(&mut self, account: &Address, balance: u128, precision: u128) {
        let entry = self.accounts.entry(*account).or_default();
        let delta = self.income_per_token - entry.checkpoint;
        if delta > 0 && balance > 0 {
            entry.unclaimed = entry
                .unclaimed
                .saturating_add(mul_div(balance, delta, precision));
        }
        entry.checkpoint = self.income_per_token;
    }

    /// Unclaimed income as of the last settlement (call `settle` first for a
    /// current figure).
    pub fn unclaimed(&self, account: &Address) -> u128 {
        self.accounts.get(account).map_or(0, |a| a.unclaimed)
    }

    /// Zero and return the account's unclaimed income (mutate-then-call:
    /// invoked before any external payout).
    pub fn take_unclaimed(&mut self, account: &Address) -> u128 {
        match self.accounts.get_mut(account) {
            Some(entry) => std::mem::take(&mut entry.unclaimed),
            None => 0,
        }
    }
}
