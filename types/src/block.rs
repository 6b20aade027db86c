//! Block numbers (the checkpoint axis) and scoring rounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scoring round. Rounds are numbered from 1; round 0 never holds scores.
pub type RoundId = u32;

/// A monotonic block number.
///
/// Every historical query in the ledger is keyed by block number: a value
/// checkpointed at block `b` is visible to every read at `b` or later.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockNumber(u64);

impl BlockNumber {
    /// The first block.
    pub const GENESIS: Self = Self(0);

    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The following block (saturating).
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The preceding block, or genesis.
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Blocks elapsed since `self` up to `now` (saturating).
    pub fn elapsed_until(&self, now: BlockNumber) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BlockNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}
