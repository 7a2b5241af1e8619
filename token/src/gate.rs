//! The transfer gate — the single compliance choke-point.
//!
//! Every balance-changing operation (transfer, mint, forced transfer,
//! marketplace settlement, recovery payout) is checked through a
//! [`TransferGate`] before any balance moves. The canonical gate consults the
//! identity registry; deployments with an extra compliance module compose it
//! in with [`CompositeGate`] — composition, never replacement.

use brix_identity::{ClaimSource, IdentityRegistry};
use brix_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("recipient {0} is not verified")]
    RecipientNotVerified(Address),

    #[error("transfer rejected by compliance module: {0}")]
    ComplianceRejected(String),
}

/// Pre-transfer check capability.
///
/// `from` is `None` for mints, `to` is `None` for burns — neither endpoint
/// of a supply change needs verification.
pub trait TransferGate {
    fn check(
        &self,
        from: Option<&Address>,
        to: Option<&Address>,
        amount: u128,
    ) -> Result<(), GateError>;
}

/// Optional compliance extension point. When a deployment carries one, its
/// `can_transfer` is consulted in addition to identity verification; the
/// notification hooks are driven by the wiring layer from drained token
/// events after each successful call.
pub trait ComplianceModule {
    fn can_transfer(
        &self,
        from: Option<&Address>,
        to: Option<&Address>,
        amount: u128,
    ) -> Result<(), String>;

    fn transferred(&mut self, from: &Address, to: &Address, amount: u128);
    fn created(&mut self, to: &Address, amount: u128);
    fn destroyed(&mut self, from: &Address, amount: u128);
}

/// The canonical gate: recipient must be verified in the identity registry.
pub struct VerificationGate<'a> {
    registry: &'a IdentityRegistry,
    claims: &'a dyn ClaimSource,
}

impl<'a> VerificationGate<'a> {
    pub fn new(registry: &'a IdentityRegistry, claims: &'a dyn ClaimSource) -> Self {
        Self { registry, claims }
    }
}

impl TransferGate for VerificationGate<'_> {
    fn check(
        &self,
        _from: Option<&Address>,
        to: Option<&Address>,
        _amount: u128,
    ) -> Result<(), GateError> {
        if let Some(to) = to {
            if !self.registry.is_verified(to, self.claims) {
                return Err(GateError::RecipientNotVerified(*to));
            }
        }
        Ok(())
    }
}

/// Verification gate plus a compliance module, checked in that order.
pub struct CompositeGate<'a> {
    verification: VerificationGate<'a>,
    module: &'a dyn ComplianceModule,
}

impl<'a> CompositeGate<'a> {
    pub fn new(verification: VerificationGate<'a>, module: &'a dyn ComplianceModule) -> Self {
        Self {
            verification,
            module,
        }
    }
}

impl TransferGate for CompositeGate<'_> {
    fn check(
        &self,
        from: Option<&Address>,
        to: Option<&Address>,
        amount: u128,
    ) -> Result<(), GateError> {
        self.verification.check(from, to, amount)?;
        self.module
            .can_transfer(from, to, amount)
            .map_err(GateError::ComplianceRejected)
    }
}

/// Gate that approves everything. For tests and ungated internal plumbing.
pub struct OpenGate;

impl TransferGate for OpenGate {
    fn check(
        &self,
        _from: Option<&Address>,
        _to: Option<&Address>,
        _amount: u128,
    ) -> Result<(), GateError> {
        Ok(())
    }
}
