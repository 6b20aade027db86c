//! Per-round and lifetime score accounts.

use crate::decay::cumulative_score;
use crate::error::ScoringError;
use passport_checkpoints::ParamStore;
use passport_types::{Address, AppId, AppRegistry, ParamKey, RoundId, SecurityTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score accounts of every address, plus the security tier of each app.
///
/// Stored round scores are never rewritten: changing the window or decay rate
/// only changes how later reads fold them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScoreLedger {
    app_tiers: HashMap<AppId, SecurityTier>,
    round_scores: HashMap<(Address, RoundId), u64>,
    app_round_scores: HashMap<(Address, RoundId, AppId), u64>,
    totals: HashMap<Address, u64>,
    app_totals: HashMap<(Address, AppId), u64>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Application tiers ─────────────────────────────────────────────────

    /// Classify `app`. Only apps known to the registry can be tiered.
    pub fn set_app_security(
        &mut self,
        registry: &dyn AppRegistry,
        app: AppId,
        tier: SecurityTier,
    ) -> Result<Option<SecurityTier>, ScoringError> {
        if !registry.app_exists(&app) {
            return Err(ScoringError::UnknownApp(app));
        }
        let previous = self.app_tiers.insert(app, tier);
        tracing::info!(app = %app, tier = tier.name(), "app security tier set");
        Ok(previous)
    }

    pub fn app_security(&self, app: &AppId) -> Option<SecurityTier> {
        self.app_tiers.get(app).copied()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Credit one action in `app` to `target` for `round`. Returns the points
    /// added: the current multiplier of the app's tier, or 0 for an untiered app.
    pub fn register_action(
        &mut self,
        target: &Address,
        app: AppId,
        round: RoundId,
        params: &ParamStore,
    ) -> Result<u64, ScoringError> {
        let Some(tier) = self.app_security(&app) else {
            tracing::debug!(target_addr = %target, app = %app, "action in untiered app scores nothing");
            return Ok(0);
        };
        let points = params.current(ParamKey::SecurityMultiplier(tier));
        self.add_points(target, app, round, points)?;
        Ok(points)
    }

    /// Credit an admin-supplied total to `target` for `round`.
    pub fn add_points(
        &mut self,
        target: &Address,
        app: AppId,
        round: RoundId,
        points: u64,
    ) -> Result<(), ScoringError> {
        if round == 0 {
            return Err(ScoringError::InvalidRound);
        }

        // Compute every new value first so an overflow leaves no partial write.
        let round_key = (target.clone(), round);
        let app_round_key = (target.clone(), round, app);
        let app_total_key = (target.clone(), app);
        let round_score = add(self.round_scores.get(&round_key), points)?;
        let app_round_score = add(self.app_round_scores.get(&app_round_key), points)?;
        let total = add(self.totals.get(target), points)?;
        let app_total = add(self.app_totals.get(&app_total_key), points)?;

        self.round_scores.insert(round_key, round_score);
        self.app_round_scores.insert(app_round_key, app_round_score);
        self.totals.insert(target.clone(), total);
        self.app_totals.insert(app_total_key, app_total);

        tracing::debug!(target_addr = %target, app = %app, round, points, round_score, "score registered");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn round_score(&self, addr: &Address, round: RoundId) -> u64 {
        self.round_scores
            .get(&(addr.clone(), round))
            .copied()
            .unwrap_or(0)
    }

    pub fn app_round_score(&self, addr: &Address, round: RoundId, app: &AppId) -> u64 {
        self.app_round_scores
            .get(&(addr.clone(), round, *app))
            .copied()
            .unwrap_or(0)
    }

    /// Lifetime points of `addr`, undecayed.
    pub fn total_score(&self, addr: &Address) -> u64 {
        self.totals.get(addr).copied().unwrap_or(0)
    }

    pub fn app_total_score(&self, addr: &Address, app: &AppId) -> u64 {
        self.app_totals
            .get(&(addr.clone(), *app))
            .copied()
            .unwrap_or(0)
    }

    /// Decayed score of `addr` over the `window` rounds ending at `last_round`.
    pub fn cumulative_score(
        &self,
        addr: &Address,
        last_round: RoundId,
        window: u64,
        decay_rate: u64,
    ) -> u64 {
        cumulative_score(|round| self.round_score(addr, round), last_round, window, decay_rate)
    }
}

fn add(current: Option<&u64>, points: u64) -> Result<u64, ScoringError> {
    current
        .copied()
        .unwrap_or(0)
        .checked_add(points)
        .ok_or(ScoringError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use passport_nullables::NullAppRegistry;
    use passport_types::{BlockNumber, PassportParams};

    fn acct(name: &str) -> Address {
        Address::new(format!("psp_{name}"))
    }

    fn app(n: u8) -> AppId {
        AppId::new([n; 32])
    }

    fn params() -> ParamStore {
        ParamStore::with_defaults(&PassportParams::default(), BlockNumber::GENESIS).unwrap()
    }

    fn registry_with(apps: &[AppId]) -> NullAppRegistry {
        let registry = NullAppRegistry::new();
        for a in apps {
            registry.register(*a, acct("admin"));
        }
        registry
    }

    #[test]
    fn tier_multiplier_is_credited() {
        let mut ledger = ScoreLedger::new();
        let registry = registry_with(&[app(1)]);
        ledger
            .set_app_security(&registry, app(1), SecurityTier::Medium)
            .unwrap();

        let user = acct("user");
        let points = ledger.register_action(&user, app(1), 1, &params()).unwrap();
        assert_eq!(points, 200);
        assert_eq!(ledger.round_score(&user, 1), 200);
        assert_eq!(ledger.app_round_score(&user, 1, &app(1)), 200);
        assert_eq!(ledger.total_score(&user), 200);
        assert_eq!(ledger.app_total_score(&user, &app(1)), 200);
    }

    #[test]
    fn untiered_app_scores_nothing() {
        let mut ledger = ScoreLedger::new();
        let user = acct("user");
        assert_eq!(ledger.register_action(&user, app(9), 1, &params()).unwrap(), 0);
        assert_eq!(ledger.total_score(&user), 0);
    }

    #[test]
    fn unknown_app_cannot_be_tiered() {
        let mut ledger = ScoreLedger::new();
        let registry = registry_with(&[]);
        assert_eq!(
            ledger.set_app_security(&registry, app(2), SecurityTier::High),
            Err(ScoringError::UnknownApp(app(2)))
        );
        assert_eq!(ledger.app_security(&app(2)), None);
    }

    #[test]
    fn multiplier_change_applies_to_later_actions() {
        let mut ledger = ScoreLedger::new();
        let registry = registry_with(&[app(1)]);
        ledger
            .set_app_security(&registry, app(1), SecurityTier::Low)
            .unwrap();
        let mut params = params();
        let user = acct("user");

        ledger.register_action(&user, app(1), 1, &params).unwrap();
        params
            .set(
                ParamKey::SecurityMultiplier(SecurityTier::Low),
                50,
                BlockNumber::new(10),
            )
            .unwrap();
        ledger.register_action(&user, app(1), 1, &params).unwrap();
        assert_eq!(ledger.round_score(&user, 1), 150);
    }

    #[test]
    fn round_zero_rejected() {
        let mut ledger = ScoreLedger::new();
        assert_eq!(
            ledger.add_points(&acct("user"), app(1), 0, 10),
            Err(ScoringError::InvalidRound)
        );
    }

    #[test]
    fn overflow_leaves_no_partial_write() {
        let mut ledger = ScoreLedger::new();
        let user = acct("user");
        ledger.add_points(&user, app(1), 1, u64::MAX).unwrap();
        assert_eq!(
            ledger.add_points(&user, app(2), 2, 1),
            Err(ScoringError::Overflow)
        );
        assert_eq!(ledger.round_score(&user, 2), 0);
        assert_eq!(ledger.app_total_score(&user, &app(2)), 0);
    }

    #[test]
    fn cumulative_score_over_rounds() {
        let mut ledger = ScoreLedger::new();
        let user = acct("user");
        for (round, points) in [(1, 100), (2, 100), (3, 200), (4, 200), (5, 400)] {
            ledger.add_points(&user, app(1), round, points).unwrap();
        }
        assert_eq!(ledger.cumulative_score(&user, 5, 8, 20), 780);
        assert_eq!(ledger.cumulative_score(&user, 5, 8, 0), 1000);
        assert_eq!(ledger.cumulative_score(&user, 5, 1, 0), 400);
    }
}
