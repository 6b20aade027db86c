//! Nullable membership-token levels.

use passport_types::{Address, MembershipLevels};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct NullMembership {
    levels: RwLock<HashMap<Address, u8>>,
}

impl NullMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level held by `holder`; `0` removes the token.
    pub fn set_level(&self, holder: &Address, level: u8) {
        let mut levels = self.levels.write().unwrap_or_else(|e| e.into_inner());
        if level == 0 {
            levels.remove(holder);
        } else {
            levels.insert(holder.clone(), level);
        }
    }
}

impl MembershipLevels for NullMembership {
    fn level_of(&self, holder: &Address) -> u8 {
        let levels = self.levels.read().unwrap_or_else(|e| e.into_inner());
        levels.get(holder).copied().unwrap_or(0)
    }
}
