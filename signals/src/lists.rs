//! Allow- and deny-lists.
//!
//! Adding an address to one list removes it from the other. A passport counts
//! as listed when it is listed itself, or independently when the share of its
//! linked entities that are listed reaches the list's threshold.

use crate::error::SignalError;
use passport_checkpoints::Trace;
use passport_types::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Allow,
    Deny,
}

impl ListKind {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Allow => Self::Deny,
            Self::Deny => Self::Allow,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// `floor(count × 100 / total) >= threshold_percent`; false when `total` is 0.
pub fn meets_threshold(count: u64, total: u64, threshold_percent: u64) -> bool {
    if total == 0 {
        return false;
    }
    let percent = u128::from(count) * 100 / u128::from(total);
    percent >= u128::from(threshold_percent)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccessLists {
    allow: HashMap<Address, Trace<bool>>,
    deny: HashMap<Address, Trace<bool>>,
}

impl AccessLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `addr` on `kind`, taking it off the opposite list.
    pub fn add(&mut self, kind: ListKind, addr: &Address, now: BlockNumber) -> Result<(), SignalError> {
        self.ensure_order(addr, now)?;
        if self.is_listed(kind.opposite(), addr) {
            self.write(kind.opposite(), addr, false, now);
        }
        self.write(kind, addr, true, now);
        tracing::info!(list = %kind, addr = %addr, block = %now, "address listed");
        Ok(())
    }

    pub fn remove(&mut self, kind: ListKind, addr: &Address, now: BlockNumber) -> Result<(), SignalError> {
        self.ensure_order(addr, now)?;
        if !self.is_listed(kind, addr) {
            return Ok(());
        }
        self.write(kind, addr, false, now);
        tracing::info!(list = %kind, addr = %addr, block = %now, "address unlisted");
        Ok(())
    }

    pub fn is_listed(&self, kind: ListKind, addr: &Address) -> bool {
        self.table(kind)
            .get(addr)
            .and_then(|t| t.latest())
            .copied()
            .unwrap_or(false)
    }

    pub fn is_listed_at(&self, kind: ListKind, addr: &Address, block: BlockNumber) -> bool {
        self.table(kind)
            .get(addr)
            .and_then(|t| t.at(block))
            .copied()
            .unwrap_or(false)
    }

    /// Passport-level status given the passport's current entities.
    pub fn passport_listed(
        &self,
        kind: ListKind,
        passport: &Address,
        entities: &[Address],
        threshold_percent: u64,
    ) -> bool {
        if self.is_listed(kind, passport) {
            return true;
        }
        let listed = entities.iter().filter(|e| self.is_listed(kind, e)).count() as u64;
        meets_threshold(listed, entities.len() as u64, threshold_percent)
    }

    /// Passport-level status at `block`, given the entities linked at `block`.
    pub fn passport_listed_at(
        &self,
        kind: ListKind,
        passport: &Address,
        entities: &[Address],
        threshold_percent: u64,
        block: BlockNumber,
    ) -> bool {
        if self.is_listed_at(kind, passport, block) {
            return true;
        }
        let listed = entities
            .iter()
            .filter(|e| self.is_listed_at(kind, e, block))
            .count() as u64;
        meets_threshold(listed, entities.len() as u64, threshold_percent)
    }

    fn table(&self, kind: ListKind) -> &HashMap<Address, Trace<bool>> {
        match kind {
            ListKind::Allow => &self.allow,
            ListKind::Deny => &self.deny,
        }
    }

    fn ensure_order(&self, addr: &Address, now: BlockNumber) -> Result<(), SignalError> {
        for table in [&self.allow, &self.deny] {
            if let Some(last) = table.get(addr).and_then(|t| t.latest_block()) {
                if now < last {
                    return Err(passport_checkpoints::CheckpointError::OutOfOrder {
                        last,
                        attempted: now,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn write(&mut self, kind: ListKind, addr: &Address, value: bool, now: BlockNumber) {
        let table = match kind {
            ListKind::Allow => &mut self.allow,
            ListKind::Deny => &mut self.deny,
        };
        // Order was checked by the caller.
        let _ = table.entry(addr.clone()).or_default().push(now, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> Address {
        Address::new(format!("psp_{name}"))
    }

    fn b(n: u64) -> BlockNumber {
        BlockNumber::new(n)
    }

    #[test]
    fn threshold_uses_floor_percentage() {
        assert!(!meets_threshold(0, 0, 0));
        assert!(meets_threshold(1, 2, 50));
        assert!(!meets_threshold(1, 3, 34));
        assert!(meets_threshold(1, 3, 33));
        assert!(meets_threshold(3, 3, 100));
        assert!(!meets_threshold(2, 3, 100));
    }

    #[test]
    fn listing_clears_opposite_flag() {
        let mut lists = AccessLists::new();
        let a = acct("a");
        lists.add(ListKind::Allow, &a, b(1)).unwrap();
        assert!(lists.is_listed(ListKind::Allow, &a));

        lists.add(ListKind::Deny, &a, b(2)).unwrap();
        assert!(lists.is_listed(ListKind::Deny, &a));
        assert!(!lists.is_listed(ListKind::Allow, &a));
        assert!(lists.is_listed_at(ListKind::Allow, &a, b(1)));

        lists.remove(ListKind::Deny, &a, b(3)).unwrap();
        assert!(!lists.is_listed(ListKind::Deny, &a));
        assert!(lists.is_listed_at(ListKind::Deny, &a, b(2)));
    }

    #[test]
    fn entity_share_lists_passport() {
        let mut lists = AccessLists::new();
        let p = acct("p");
        let entities = vec![acct("e1"), acct("e2")];
        lists.add(ListKind::Deny, &entities[0], b(1)).unwrap();

        assert!(!lists.passport_listed(ListKind::Deny, &p, &entities, 100));
        assert!(lists.passport_listed(ListKind::Deny, &p, &entities, 50));
        assert!(!lists.passport_listed(ListKind::Deny, &p, &[], 0));
    }

    #[test]
    fn passport_can_satisfy_both_aggregates() {
        let mut lists = AccessLists::new();
        let p = acct("p");
        let entities = vec![acct("e1")];
        lists.add(ListKind::Allow, &p, b(1)).unwrap();
        lists.add(ListKind::Deny, &entities[0], b(1)).unwrap();

        assert!(lists.passport_listed(ListKind::Allow, &p, &entities, 100));
        assert!(lists.passport_listed(ListKind::Deny, &p, &entities, 100));
    }

    #[test]
    fn historical_passport_status() {
        let mut lists = AccessLists::new();
        let p = acct("p");
        lists.add(ListKind::Allow, &p, b(10)).unwrap();
        assert!(!lists.passport_listed_at(ListKind::Allow, &p, &[], 100, b(9)));
        assert!(lists.passport_listed_at(ListKind::Allow, &p, &[], 100, b(10)));
    }

    #[test]
    fn out_of_order_write_rejected() {
        let mut lists = AccessLists::new();
        let a = acct("a");
        lists.add(ListKind::Allow, &a, b(5)).unwrap();
        assert!(matches!(
            lists.add(ListKind::Deny, &a, b(4)),
            Err(SignalError::Checkpoint(_))
        ));
        assert!(lists.is_listed(ListKind::Allow, &a));
    }
}
