//! Signal counters and signaler assignment.

use crate::error::SignalError;
use passport_types::{Address, AppId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignalBook {
    /// Signals filed directly against each address.
    own: HashMap<Address, u64>,
    /// Per-app counters. `reset_all` leaves these alone; they are the audit trail.
    app_counts: HashMap<(AppId, Address), u64>,
    app_totals: HashMap<AppId, u64>,
    /// signaler → the single app it signals for.
    signalers: HashMap<Address, AppId>,
}

impl SignalBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Signalers ─────────────────────────────────────────────────────────

    pub fn assign_signaler(&mut self, signaler: &Address, app: AppId) -> Result<(), SignalError> {
        if let Some(current) = self.signalers.get(signaler) {
            if *current != app {
                return Err(SignalError::AlreadyAssigned {
                    signaler: signaler.clone(),
                    app: *current,
                });
            }
            return Ok(());
        }
        self.signalers.insert(signaler.clone(), app);
        tracing::info!(signaler = %signaler, app = %app, "signaler assigned");
        Ok(())
    }

    pub fn remove_signaler(&mut self, signaler: &Address, app: AppId) -> Result<(), SignalError> {
        if self.signalers.get(signaler) != Some(&app) {
            return Err(SignalError::NotSignaler(signaler.clone()));
        }
        self.signalers.remove(signaler);
        tracing::info!(signaler = %signaler, app = %app, "signaler removed");
        Ok(())
    }

    pub fn signaler_app(&self, signaler: &Address) -> Option<AppId> {
        self.signalers.get(signaler).copied()
    }

    // ── Counting ──────────────────────────────────────────────────────────

    /// File one signal by `signaler` against `user`, returning the app it
    /// counts for.
    pub fn signal(
        &mut self,
        signaler: &Address,
        user: &Address,
        reason: &str,
    ) -> Result<AppId, SignalError> {
        let app = self
            .signaler_app(signaler)
            .ok_or_else(|| SignalError::NotSignaler(signaler.clone()))?;

        let own = bump(self.own.get(user))?;
        let app_key = (app, user.clone());
        let app_count = bump(self.app_counts.get(&app_key))?;
        let app_total = bump(self.app_totals.get(&app))?;

        self.own.insert(user.clone(), own);
        self.app_counts.insert(app_key, app_count);
        self.app_totals.insert(app, app_total);
        tracing::debug!(user = %user, signaler = %signaler, app = %app, reason, count = own, "user signaled");
        Ok(app)
    }

    /// Zero the direct count of `addr` and of each given entity. Pass the
    /// Active entities to clear a passport's whole aggregate, or none to clear
    /// a single address. Returns the number of signals cleared.
    pub fn reset_all(&mut self, addr: &Address, entities: &[Address]) -> u64 {
        let mut cleared = self.own.remove(addr).unwrap_or(0);
        for entity in entities {
            cleared = cleared.saturating_add(self.own.remove(entity).unwrap_or(0));
        }
        cleared
    }

    /// Remove exactly `app`'s signals against `user` from every counter.
    /// Returns the number removed.
    pub fn reset_for_app(&mut self, app: AppId, user: &Address) -> u64 {
        let removed = self.app_counts.remove(&(app, user.clone())).unwrap_or(0);
        if removed == 0 {
            return 0;
        }
        if let Some(own) = self.own.get_mut(user) {
            *own = own.saturating_sub(removed);
            if *own == 0 {
                self.own.remove(user);
            }
        }
        if let Some(total) = self.app_totals.get_mut(&app) {
            *total = total.saturating_sub(removed);
        }
        removed
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn own_count(&self, addr: &Address) -> u64 {
        self.own.get(addr).copied().unwrap_or(0)
    }

    pub fn app_count(&self, app: &AppId, addr: &Address) -> u64 {
        self.app_counts
            .get(&(*app, addr.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn app_total(&self, app: &AppId) -> u64 {
        self.app_totals.get(app).copied().unwrap_or(0)
    }

    /// A passport's own count plus the live sum over `entities`.
    pub fn aggregate(&self, passport: &Address, entities: &[Address]) -> u64 {
        entities
            .iter()
            .fold(self.own_count(passport), |sum, e| {
                sum.saturating_add(self.own_count(e))
            })
    }

    /// `app`'s signals against a passport plus the live sum over `entities`.
    pub fn app_aggregate(&self, app: &AppId, passport: &Address, entities: &[Address]) -> u64 {
        entities
            .iter()
            .fold(self.app_count(app, passport), |sum, e| {
                sum.saturating_add(self.app_count(app, e))
            })
    }
}

fn bump(current: Option<&u64>) -> Result<u64, SignalError> {
    current
        .copied()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(SignalError::Overflow)
}
