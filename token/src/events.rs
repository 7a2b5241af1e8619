//! Events emitted by the token engine for external indexers.

use brix_types::{Address, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenEvent {
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    Minted {
        to: Address,
        amount: u128,
    },
    Burned {
        from: Address,
        amount: u128,
    },
    Transferred {
        from: Address,
        to: Address,
        amount: u128,
    },
    TokensFrozen {
        account: Address,
        amount: u128,
    },
    TokensUnfrozen {
        account: Address,
        amount: u128,
    },
    ForcedTransfer {
        from: Address,
        to: Address,
        amount: u128,
    },
    RecoveryRequested {
        lost: Address,
        new: Address,
        approvals: usize,
    },
    AccountRecovered {
        lost: Address,
        new: Address,
        amount: u128,
    },
    RecoveryAddressesSet {
        addresses: Vec<Address>,
    },
    AgentAdded {
        agent: Address,
    },
    AgentRemoved {
        agent: Address,
    },
    RentalIncomeReceived {
        from: Address,
        amount: u128,
    },
    RentalIncomeDistributed {
        amount: u128,
        at: Timestamp,
    },
    RentalIncomeClaimed {
        holder: Address,
        amount: u128,
    },
}
