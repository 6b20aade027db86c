use passport_checkpoints::CheckpointError;
use passport_types::{Address, BlockNumber};
use thiserror::Error;

/// Every variant is raised before any state is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{0} cannot link to itself")]
    SelfLink(Address),

    #[error("entity {entity} is already linked to passport {passport}")]
    AlreadyLinked { entity: Address, passport: Address },

    #[error("{target} already holds the maximum of {cap} relations")]
    CapacityExceeded { target: Address, cap: u64 },

    #[error("no link found for {0}")]
    NotLinked(Address),

    #[error("links are one hop deep: {0} is an entity or already has entities")]
    NestedLink(Address),

    #[error("{caller} is not a party to this relation")]
    Unauthorized { caller: Address },

    #[error("invalid consent signature from {signer}")]
    InvalidSignature { signer: Address },

    #[error("consent expired at block {deadline}, current block is {now}")]
    SignatureExpired {
        deadline: BlockNumber,
        now: BlockNumber,
    },

    #[error("{0} cannot delegate to itself")]
    SelfDelegation(Address),

    #[error("delegator {0} is an entity")]
    FromEntity(Address),

    #[error("delegatee {0} is an entity")]
    ToEntity(Address),

    #[error("no delegation found for {0}")]
    NotDelegated(Address),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
