//! The compliance-gated token engine.
//!
//! A fungible balance ledger where every balance-changing operation runs
//! through a [`TransferGate`] before anything moves. Supports pause,
//! per-account freezing, agent-restricted mint, forced transfer, threshold
//! account recovery, and rental-income distribution to holders.

use brix_types::{Address, PlatformParams, Timestamp};
use std::collections::HashMap;

use crate::access::AccessControl;
use crate::error::TokenError;
use crate::events::TokenEvent;
use crate::gate::TransferGate;
use crate::income::IncomeState;
use crate::payments::PaymentOutlet;
use crate::recovery::RecoveryState;
use crate::reentrancy::ReentrancyLock;

/// Immutable token metadata.
#[derive(Clone, Debug)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// One deployed property token.
pub struct ComplianceToken {
    /// This token instance's own address (marketplace allow-lists and escrow
    /// bookkeeping refer to tokens by address).
    address: Address,
    info: TokenInfo,
    access: AccessControl,
    paused: bool,
    balances: HashMap<Address, u128>,
    /// Administratively blocked portion of each balance. Invariant:
    /// frozen[a] <= balances[a] for every account, at all times.
    frozen: HashMap<Address, u128>,
    total_supply: u128,
    recovery: RecoveryState,
    income: IncomeState,
    params: PlatformParams,
    lock: ReentrancyLock,
    pending_events: Vec<TokenEvent>,
}

impl ComplianceToken {
    pub fn new(address: Address, owner: Address, info: TokenInfo, params: PlatformParams) -> Self {
        Self {
            address,
            info,
            access: AccessControl::new(owner),
            paused: false,
            balances: HashMap::new(),
            frozen: HashMap::new(),
            total_supply: 0,
            recovery: RecoveryState::new(),
            income: IncomeState::new(),
            params,
            lock: ReentrancyLock::new(),
            pending_events: Vec::new(),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn info(&self) -> &TokenInfo {
        &self.info
    }

    pub fn owner(&self) -> &Address {
        self.access.owner()
    }

    pub fn is_agent(&self, account: &Address) -> bool {
        self.access.is_agent(account)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn frozen_of(&self, account: &Address) -> u128 {
        self.frozen.get(account).copied().unwrap_or(0)
    }

    /// Balance minus the frozen amount — what the account may actually move.
    pub fn available_balance(&self, account: &Address) -> u128 {
        self.balance_of(account) - self.frozen_of(account)
    }

    pub fn recovery_addresses(&self) -> &[Address] {
        self.recovery.addresses()
    }

    pub fn undistributed_income(&self) -> u128 {
        self.income.pool()
    }

    pub fn last_income_distribution(&self) -> Option<Timestamp> {
        self.income.last_distribution()
    }

    /// Unclaimed rental income if the holder settled right now.
    pub fn claimable_income(&self, account: &Address) -> u128 {
        // Read-only preview: settle on a scratch copy.
        let mut preview = self.income.clone();
        preview.settle(account, self.balance_of(account), self.params.income_precision);
        preview.unclaimed(account)
    }

    // ── Agent / owner administration ─────────────────────────────────────

    pub fn add_agent(&mut self, caller: &Address, agent: &Address) -> Result<(), TokenError> {
        self.access.add_agent(caller, agent)?;
        self.pending_events.push(TokenEvent::AgentAdded { agent: *agent });
        Ok(())
    }

    pub fn remove_agent(&mut self, caller: &Address, agent: &Address) -> Result<(), TokenError> {
        self.access.remove_agent(caller, agent)?;
        self.pending_events
            .push(TokenEvent::AgentRemoved { agent: *agent });
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), TokenError> {
        self.access.transfer_ownership(caller, new_owner)
    }

    pub fn pause(&mut self, caller: &Address) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        if self.paused {
            return Err(TokenError::InvalidState("token already paused".into()));
        }
        self.paused = true;
        self.pending_events.push(TokenEvent::Paused { by: *caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        if !self.paused {
            return Err(TokenError::NotPaused);
        }
        self.paused = false;
        self.pending_events.push(TokenEvent::Unpaused { by: *caller });
        Ok(())
    }

    /// Configure the recovery-address set (exactly
    /// `params.recovery_address_count` unique non-null addresses).
    pub fn set_recovery_addresses(
        &mut self,
        caller: &Address,
        addresses: Vec<Address>,
    ) -> Result<(), TokenError> {
        self.access.require_owner(caller)?;
        self.recovery
            .set_addresses(addresses.clone(), self.params.recovery_address_count)?;
        self.pending_events
            .push(TokenEvent::RecoveryAddressesSet { addresses });
        Ok(())
    }

    // ── Supply ───────────────────────────────────────────────────────────

    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
    ) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        self.ensure_not_paused()?;
        if to.is_zero() || amount == 0 {
            return Err(TokenError::InvalidArgument(
                "mint needs a non-null recipient and non-zero amount".into(),
            ));
        }
        gate.check(None, Some(to), amount)?;
        self.settle_income(to);
        *self.balances.entry(*to).or_default() += amount;
        self.total_supply += amount;
        self.pending_events.push(TokenEvent::Minted {
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Burn from the caller's own balance. Frozen tokens cannot be burned.
    pub fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), TokenError> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(TokenError::InvalidArgument("burn amount is zero".into()));
        }
        self.ensure_available(caller, amount)?;
        self.settle_income(caller);
        self.debit(caller, amount);
        self.total_supply -= amount;
        self.pending_events.push(TokenEvent::Burned {
            from: *caller,
            amount,
        });
        Ok(())
    }

    // ── Transfers ────────────────────────────────────────────────────────

    /// Ordinary transfer: sender authorization is the caller itself; frozen
    /// tokens do not move; the gate decides whether the recipient may hold.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
    ) -> Result<(), TokenError> {
        self.ensure_not_paused()?;
        if to.is_zero() || amount == 0 {
            return Err(TokenError::InvalidArgument(
                "transfer needs a non-null recipient and non-zero amount".into(),
            ));
        }
        self.ensure_available(caller, amount)?;
        gate.check(Some(caller), Some(to), amount)?;
        self.move_balance(caller, to, amount);
        self.pending_events.push(TokenEvent::Transferred {
            from: *caller,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Privileged override for regulatory seizure/correction. Bypasses the
    /// sender's authorization but not the recipient gate. May dip into the
    /// sender's frozen balance: the deficit is unfrozen first (evented), then
    /// moved.
    pub fn forced_transfer(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
    ) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        self.ensure_not_paused()?;
        if from.is_zero() || to.is_zero() || amount == 0 {
            return Err(TokenError::InvalidArgument(
                "forced transfer needs non-null endpoints and a non-zero amount".into(),
            ));
        }
        let balance = self.balance_of(from);
        if amount > balance {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }
        gate.check(Some(from), Some(to), amount)?;
        let available = self.available_balance(from);
        if amount > available {
            let deficit = amount - available;
            *self.frozen.entry(*from).or_default() -= deficit;
            self.pending_events.push(TokenEvent::TokensUnfrozen {
                account: *from,
                amount: deficit,
            });
        }
        self.move_balance(from, to, amount);
        self.pending_events.push(TokenEvent::ForcedTransfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    // ── Freezing ─────────────────────────────────────────────────────────

    pub fn freeze_tokens(
        &mut self,
        caller: &Address,
        account: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        if amount == 0 {
            return Err(TokenError::InvalidArgument("freeze amount is zero".into()));
        }
        let available = self.available_balance(account);
        if amount > available {
            return Err(TokenError::InvalidArgument(format!(
                "cannot freeze {amount}: only {available} available"
            )));
        }
        *self.frozen.entry(*account).or_default() += amount;
        self.pending_events.push(TokenEvent::TokensFrozen {
            account: *account,
            amount,
        });
        Ok(())
    }

    pub fn unfreeze_tokens(
        &mut self,
        caller: &Address,
        account: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        if amount == 0 {
            return Err(TokenError::InvalidArgument("unfreeze amount is zero".into()));
        }
        let frozen = self.frozen_of(account);
        if amount > frozen {
            return Err(TokenError::InvalidArgument(format!(
                "cannot unfreeze {amount}: only {frozen} frozen"
            )));
        }
        *self.frozen.entry(*account).or_default() -= amount;
        self.pending_events.push(TokenEvent::TokensUnfrozen {
            account: *account,
            amount,
        });
        Ok(())
    }

    // ── Recovery ─────────────────────────────────────────────────────────

    /// One recovery-address approval toward moving `lost`'s whole balance to
    /// `new`. Executes at majority; approval state resets after execution so
    /// future recoveries start clean.
    pub fn recover_account(
        &mut self,
        caller: &Address,
        lost: &Address,
        new: &Address,
        gate: &dyn TransferGate,
    ) -> Result<(), TokenError> {
        self.ensure_not_paused()?;
        if lost.is_zero() || new.is_zero() || lost == new {
            return Err(TokenError::InvalidArgument(
                "recovery needs distinct non-null lost/new addresses".into(),
            ));
        }
        if !self.recovery.is_recovery_address(caller) {
            return Err(TokenError::NotRecoveryAddress(*caller));
        }
        let majority = self.params.recovery_majority();
        let executing = self.recovery.approval_count(lost) + 1 >= majority;
        if executing {
            // Validate before recording the tipping approval: a failed gate
            // check must leave no partial approval behind.
            gate.check(Some(lost), Some(new), self.balance_of(lost))?;
        }
        let approvals = self.recovery.approve(lost, caller)?;
        if !executing {
            self.pending_events.push(TokenEvent::RecoveryRequested {
                lost: *lost,
                new: *new,
                approvals,
            });
            return Ok(());
        }

        let amount = self.balance_of(lost);
        let frozen = self.frozen_of(lost);
        self.settle_income(lost);
        self.settle_income(new);
        if amount > 0 {
            self.debit_all(lost);
            *self.balances.entry(*new).or_default() += amount;
        }
        if frozen > 0 {
            // The frozen portion travels and stays frozen on the new address.
            self.frozen.remove(lost);
            *self.frozen.entry(*new).or_default() += frozen;
        }
        self.recovery.clear(lost);
        self.pending_events.push(TokenEvent::AccountRecovered {
            lost: *lost,
            new: *new,
            amount,
        });
        Ok(())
    }

    // ── Rental income ────────────────────────────────────────────────────

    /// Agent deposits rental proceeds into the distribution pool.
    pub fn receive_rental_income(
        &mut self,
        caller: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.access.require_agent(caller)?;
        if amount == 0 {
            return Err(TokenError::InvalidArgument("income amount is zero".into()));
        }
        self.income.receive(amount);
        self.pending_events.push(TokenEvent::RentalIncomeReceived {
            from: *caller,
            amount,
        });
        Ok(())
    }

    /// Fold the pool into the per-token accumulator (O(1) in holder count).
    pub fn distribute_rental_income(
        &mut self,
        caller: &Address,
        now: Timestamp,
    ) -> Result<u128, TokenError> {
        self.access.require_agent(caller)?;
        if self.income.pool() == 0 {
            return Err(TokenError::InvalidState("no income to distribute".into()));
        }
        if self.total_supply == 0 {
            return Err(TokenError::InvalidState(
                "cannot distribute with zero supply".into(),
            ));
        }
        let distributed =
            self.income
                .distribute(self.total_supply, self.params.income_precision, now);
        self.pending_events.push(TokenEvent::RentalIncomeDistributed {
            amount: distributed,
            at: now,
        });
        Ok(distributed)
    }

    /// Holder withdraws accrued income. Internal state is zeroed before the
    /// external payout, under the reentrancy lock.
    pub fn claim_rental_income(
        &mut self,
        caller: &Address,
        outlet: &mut dyn PaymentOutlet,
    ) -> Result<u128, TokenError> {
        if self.paused {
            return Err(TokenError::TokenPaused);
        }
        let _guard = self.lock.enter()?;
        let balance = self.balances.get(caller).copied().unwrap_or(0);
        self.income
            .settle(caller, balance, self.params.income_precision);
        let amount = self.income.take_unclaimed(caller);
        if amount == 0 {
            return Err(TokenError::InvalidState("no rental income to claim".into()));
        }
        self.pending_events.push(TokenEvent::RentalIncomeClaimed {
            holder: *caller,
            amount,
        });
        outlet.pay(caller, amount)?;
        Ok(amount)
    }

    /// Drain accumulated events for the caller to index/log.
    pub fn drain_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn ensure_not_paused(&self) -> Result<(), TokenError> {
        if self.paused {
            return Err(TokenError::TokenPaused);
        }
        Ok(())
    }

    fn ensure_available(&self, account: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.available_balance(account);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Settle the income checkpoint before a balance change.
    fn settle_income(&mut self, account: &Address) {
        let balance = self.balances.get(account).copied().unwrap_or(0);
        self.income
            .settle(account, balance, self.params.income_precision);
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) {
        self.settle_income(from);
        self.settle_income(to);
        self.debit(from, amount);
        *self.balances.entry(*to).or_default() += amount;
    }

    fn debit(&mut self, account: &Address, amount: u128) {
        let balance = self.balances.entry(*account).or_default();
        *balance -= amount;
        if *balance == 0 {
            self.balances.remove(account);
        }
    }

    fn debit_all(&mut self, account: &Address) {
        self.balances.remove(account);
    }
}
