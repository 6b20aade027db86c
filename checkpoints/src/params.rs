//! Checkpointed parameter store.
//!
//! Every governable value (thresholds, toggles, decay rate, window size,
//! security multipliers) has its own append-only timeline. Readers either take
//! the latest value or the value in force at a given block.

use crate::error::CheckpointError;
use crate::trace::Trace;
use passport_types::{BlockNumber, Check, ParamKey, PassportParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParamStore {
    traces: BTreeMap<ParamKey, Trace<u64>>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `params` as of `genesis`.
    pub fn with_defaults(
        params: &PassportParams,
        genesis: BlockNumber,
    ) -> Result<Self, CheckpointError> {
        let mut store = Self::new();
        for (key, value) in params.entries() {
            store.set(key, value, genesis)?;
        }
        Ok(store)
    }

    /// Record a new value for `key` as of `block`; returns the previous value.
    ///
    /// Percentages must be within 0..=100 and check toggles must be 0 or 1.
    pub fn set(
        &mut self,
        key: ParamKey,
        value: u64,
        block: BlockNumber,
    ) -> Result<Option<u64>, CheckpointError> {
        if (key.is_percentage() && value > 100) || (key.is_flag() && value > 1) {
            return Err(CheckpointError::InvalidValue { key, value });
        }
        let previous = self.traces.entry(key).or_default().push(block, value)?;
        tracing::debug!(param = %key, value, block = %block, "parameter checkpointed");
        Ok(previous)
    }

    /// Latest value; parameters never set read as zero.
    pub fn current(&self, key: ParamKey) -> u64 {
        self.traces
            .get(&key)
            .and_then(|t| t.latest())
            .copied()
            .unwrap_or(0)
    }

    /// Value in force at `block`; zero before the first checkpoint.
    pub fn at(&self, key: ParamKey, block: BlockNumber) -> u64 {
        self.traces
            .get(&key)
            .and_then(|t| t.at(block))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_enabled(&self, check: Check) -> bool {
        self.current(ParamKey::CheckEnabled(check)) == 1
    }

    pub fn is_enabled_at(&self, check: Check, block: BlockNumber) -> bool {
        self.at(ParamKey::CheckEnabled(check), block) == 1
    }

    /// The full timeline of one parameter.
    pub fn history(&self, key: ParamKey) -> Option<&Trace<u64>> {
        self.traces.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passport_types::SecurityTier;

    fn b(n: u64) -> BlockNumber {
        BlockNumber::new(n)
    }

    #[test]
    fn defaults_are_seeded_at_genesis() {
        let store = ParamStore::with_defaults(&PassportParams::default(), b(1)).unwrap();
        assert_eq!(store.current(ParamKey::RoundsForCumulativeScore), 8);
        assert_eq!(
            store.current(ParamKey::SecurityMultiplier(SecurityTier::Medium)),
            200
        );
        assert!(!store.is_enabled(Check::Signals));
        assert_eq!(store.at(ParamKey::SignalsThreshold, b(0)), 0);
    }

    #[test]
    fn historical_read_is_frozen_after_change() {
        let mut store = ParamStore::new();
        store.set(ParamKey::ParticipationScoreThreshold, 100, b(10)).unwrap();
        store.set(ParamKey::ParticipationScoreThreshold, 500, b(20)).unwrap();

        assert_eq!(store.at(ParamKey::ParticipationScoreThreshold, b(19)), 100);
        assert_eq!(store.at(ParamKey::ParticipationScoreThreshold, b(20)), 500);
        assert_eq!(store.current(ParamKey::ParticipationScoreThreshold), 500);
    }

    #[test]
    fn toggles_are_checkpointed() {
        let mut store = ParamStore::new();
        store.set(ParamKey::CheckEnabled(Check::AllowList), 1, b(5)).unwrap();
        store.set(ParamKey::CheckEnabled(Check::AllowList), 0, b(8)).unwrap();
        assert!(store.is_enabled_at(Check::AllowList, b(7)));
        assert!(!store.is_enabled_at(Check::AllowList, b(8)));
        assert!(!store.is_enabled_at(Check::AllowList, b(4)));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let mut store = ParamStore::new();
        assert_eq!(
            store.set(ParamKey::DecayRate, 101, b(1)),
            Err(CheckpointError::InvalidValue {
                key: ParamKey::DecayRate,
                value: 101
            })
        );
        assert!(store.set(ParamKey::CheckEnabled(Check::Signals), 2, b(1)).is_err());
        assert!(store.history(ParamKey::DecayRate).is_none());
    }

    #[test]
    fn parameters_are_independent() {
        let mut store = ParamStore::new();
        store.set(ParamKey::DecayRate, 20, b(3)).unwrap();
        store.set(ParamKey::SignalsThreshold, 4, b(1)).unwrap();
        assert_eq!(store.at(ParamKey::SignalsThreshold, b(2)), 4);
        assert_eq!(store.at(ParamKey::DecayRate, b(2)), 0);
    }
}
