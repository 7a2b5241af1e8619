//! Compliance-gated property token.
//!
//! The token engine holds balances and supply; every balance change is vetted
//! by a [`TransferGate`] built over the identity registry. Around the core
//! sit per-account freezing, threshold account recovery, and pro-rata rental
//! income distribution.

pub mod access;
pub mod error;
pub mod events;
pub mod gate;
pub mod income;
pub mod payments;
pub mod recovery;
pub mod reentrancy;
pub mod token;

pub use access::AccessControl;
pub use error::TokenError;
pub use events::TokenEvent;
pub use gate::{ComplianceModule, CompositeGate, GateError, OpenGate, TransferGate, VerificationGate};
pub use income::IncomeState;
pub use payments::{CashLedger, PaymentError, PaymentOutlet};
pub use recovery::RecoveryState;
pub use reentrancy::{ReentrancyError, ReentrancyGuard, ReentrancyLock};
pub use token::{ComplianceToken, TokenInfo};
