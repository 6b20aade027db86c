//! Nullable clocks: deterministic blocks and rounds for testing.

use passport_types::{BlockClock, BlockNumber, RoundClock, RoundId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A deterministic block clock.
///
/// The block only advances when you tell it to.
#[derive(Debug, Default)]
pub struct NullBlockClock {
    current: AtomicU64,
}

impl NullBlockClock {
    pub fn new(initial: u64) -> Self {
        Self {
            current: AtomicU64::new(initial),
        }
    }

    /// Advance by a number of blocks, returning the new block.
    pub fn advance(&self, blocks: u64) -> BlockNumber {
        let previous = self.current.fetch_add(blocks, Ordering::SeqCst);
        BlockNumber::new(previous.saturating_add(blocks))
    }

    /// Set the block to a specific value.
    pub fn set(&self, block: u64) {
        self.current.store(block, Ordering::SeqCst);
    }
}

impl BlockClock for NullBlockClock {
    fn current_block(&self) -> BlockNumber {
        BlockNumber::new(self.current.load(Ordering::SeqCst))
    }
}

/// A deterministic round scheduler.
///
/// Round 1 starts at genesis; each call to [`NullRoundClock::begin_round`]
/// starts the next round at the given block.
#[derive(Debug)]
pub struct NullRoundClock {
    /// `(first block, round)`, ascending in both.
    starts: Mutex<Vec<(BlockNumber, RoundId)>>,
}

impl NullRoundClock {
    pub fn new() -> Self {
        Self {
            starts: Mutex::new(vec![(BlockNumber::GENESIS, 1)]),
        }
    }

    /// Start the next round at `block`, returning its id. A block earlier than
    /// the current round's start is moved up to it.
    pub fn begin_round(&self, block: BlockNumber) -> RoundId {
        let mut starts = self.starts.lock().unwrap_or_else(|e| e.into_inner());
        let (last_block, last_round) = starts.last().copied().unwrap_or((BlockNumber::GENESIS, 0));
        let next = last_round.saturating_add(1);
        starts.push((block.max(last_block), next));
        next
    }
}

impl Default for NullRoundClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundClock for NullRoundClock {
    fn current_round(&self) -> RoundId {
        let starts = self.starts.lock().unwrap_or_else(|e| e.into_inner());
        starts.last().map_or(0, |(_, round)| *round)
    }

    fn round_at(&self, block: BlockNumber) -> RoundId {
        let starts = self.starts.lock().unwrap_or_else(|e| e.into_inner());
        let idx = starts.partition_point(|(start, _)| *start <= block);
        if idx == 0 {
            0
        } else {
            starts[idx - 1].1
        }
    }
}
