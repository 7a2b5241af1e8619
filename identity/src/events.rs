//! Events emitted by the identity subsystem for external indexers.

use brix_types::{Address, ClaimTopic, CountryCode};

/// Emitted on every successful state change; each variant carries enough data
/// for an observer to reconstruct registry state without replaying calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityEvent {
    IdentityRegistered {
        account: Address,
        identity: Address,
    },
    IdentityUpdated {
        account: Address,
        identity: Address,
    },
    IdentityRemoved {
        account: Address,
        identity: Address,
    },
    CountryUpdated {
        account: Address,
        country: CountryCode,
    },
    TrustedIssuerAdded {
        issuer: Address,
        topics: Vec<ClaimTopic>,
    },
    TrustedIssuerRemoved {
        issuer: Address,
    },
    IssuerTopicsUpdated {
        issuer: Address,
        topics: Vec<ClaimTopic>,
    },
    ClaimTopicAdded {
        topic: ClaimTopic,
    },
    ClaimTopicRemoved {
        topic: ClaimTopic,
    },
    IdentityStoreSet,
    TrustedIssuersRegistrySet,
    ClaimTopicsRegistrySet,
}
