//! Narrow interfaces to the collaborators the ledger does not own.
//!
//! The application registry, the membership-token contract, the block clock and
//! the emissions round scheduler all live elsewhere; the ledger only reads them
//! through these traits. In-memory implementations live in `passport-nullables`.

use crate::{Address, AppId, BlockNumber, RoundId};

/// Application registry: existence and administrator lookups.
pub trait AppRegistry: Send + Sync {
    fn app_exists(&self, app: &AppId) -> bool;

    /// The administrator of `app`, or `None` for an unknown app.
    fn app_admin(&self, app: &AppId) -> Option<Address>;
}

/// Membership-token contract: read-only level lookup. `0` means no token.
pub trait MembershipLevels: Send + Sync {
    fn level_of(&self, holder: &Address) -> u8;
}

/// Monotonic block clock; the axis of every checkpoint.
pub trait BlockClock: Send + Sync {
    fn current_block(&self) -> BlockNumber;
}

/// Emissions round scheduler.
pub trait RoundClock: Send + Sync {
    fn current_round(&self) -> RoundId;

    /// The round that was current at `block`.
    fn round_at(&self, block: BlockNumber) -> RoundId;
}
