//! Append-only checkpoint timeline.

use crate::error::CheckpointError;
use passport_types::BlockNumber;
use serde::{Deserialize, Serialize};

/// One recorded value and the block it took effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint<T> {
    pub block: BlockNumber,
    pub value: T,
}

/// A value's history keyed by block number.
///
/// Checkpoints are strictly increasing by block. Writing twice in the same
/// block overwrites that block's checkpoint, so a read at any block sees the
/// value as it stood at the end of that block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace<T> {
    checkpoints: Vec<Checkpoint<T>>,
}

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self {
            checkpoints: Vec::new(),
        }
    }
}

impl<T: Clone> Trace<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace holding a single checkpoint.
    pub fn starting_at(block: BlockNumber, value: T) -> Self {
        Self {
            checkpoints: vec![Checkpoint { block, value }],
        }
    }

    /// Record `value` as of `block` and return the previous latest value.
    pub fn push(&mut self, block: BlockNumber, value: T) -> Result<Option<T>, CheckpointError> {
        if let Some(last) = self.checkpoints.last_mut() {
            if block < last.block {
                return Err(CheckpointError::OutOfOrder {
                    last: last.block,
                    attempted: block,
                });
            }
            if block == last.block {
                return Ok(Some(std::mem::replace(&mut last.value, value)));
            }
        }
        let previous = self.latest().cloned();
        self.checkpoints.push(Checkpoint { block, value });
        Ok(previous)
    }

    pub fn latest(&self) -> Option<&T> {
        self.checkpoints.last().map(|c| &c.value)
    }

    pub fn latest_block(&self) -> Option<BlockNumber> {
        self.checkpoints.last().map(|c| c.block)
    }

    /// The value in force at `block`: the last checkpoint at or before it.
    pub fn at(&self, block: BlockNumber) -> Option<&T> {
        let idx = self.checkpoints.partition_point(|c| c.block <= block);
        idx.checked_sub(1).map(|i| &self.checkpoints[i].value)
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint<T>> {
        self.checkpoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(n: u64) -> BlockNumber {
        BlockNumber::new(n)
    }

    #[test]
    fn empty_trace_has_no_value() {
        let trace: Trace<u64> = Trace::new();
        assert_eq!(trace.latest(), None);
        assert_eq!(trace.at(b(100)), None);
    }

    #[test]
    fn reads_before_first_checkpoint_are_none() {
        let trace = Trace::starting_at(b(10), 7u64);
        assert_eq!(trace.at(b(9)), None);
        assert_eq!(trace.at(b(10)), Some(&7));
        assert_eq!(trace.at(b(1_000)), Some(&7));
    }

    #[test]
    fn at_returns_last_checkpoint_not_after_block() {
        let mut trace = Trace::new();
        trace.push(b(1), 10u64).unwrap();
        trace.push(b(5), 20).unwrap();
        trace.push(b(9), 30).unwrap();

        assert_eq!(trace.at(b(4)), Some(&10));
        assert_eq!(trace.at(b(5)), Some(&20));
        assert_eq!(trace.at(b(8)), Some(&20));
        assert_eq!(trace.at(b(9)), Some(&30));
        assert_eq!(trace.latest(), Some(&30));
    }

    #[test]
    fn same_block_write_overwrites() {
        let mut trace = Trace::new();
        assert_eq!(trace.push(b(3), 1u64).unwrap(), None);
        assert_eq!(trace.push(b(3), 2).unwrap(), Some(1));
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.at(b(3)), Some(&2));
    }

    #[test]
    fn out_of_order_write_rejected() {
        let mut trace = Trace::new();
        trace.push(b(5), 1u64).unwrap();
        assert_eq!(
            trace.push(b(4), 2),
            Err(CheckpointError::OutOfOrder {
                last: b(5),
                attempted: b(4)
            })
        );
        assert_eq!(trace.latest(), Some(&1));
    }

    #[test]
    fn option_values_model_relations() {
        let mut trace: Trace<Option<&str>> = Trace::new();
        trace.push(b(2), Some("passport")).unwrap();
        trace.push(b(6), None).unwrap();
        assert_eq!(trace.at(b(1)), None);
        assert_eq!(trace.at(b(3)), Some(&Some("passport")));
        assert_eq!(trace.at(b(6)), Some(&None));
    }
}
