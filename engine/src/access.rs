//! Role-based capabilities.

use crate::error::PassportError;
use passport_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Grants and revokes every role, including its own.
    Admin,
    /// Sets checkpointed parameters and check toggles.
    SettingsManager,
    /// Registers single actions.
    ActionRegistrar,
    /// Registers aggregated actions and sets app security tiers.
    ActionScoreManager,
    /// Edits the allow- and deny-lists.
    ListManager,
    /// Clears an address's aggregate signal count.
    SignalResetter,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::SettingsManager,
        Role::ActionRegistrar,
        Role::ActionScoreManager,
        Role::ListManager,
        Role::SignalResetter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SettingsManager => "settings_manager",
            Self::ActionRegistrar => "action_registrar",
            Self::ActionScoreManager => "action_score_manager",
            Self::ListManager => "list_manager",
            Self::SignalResetter => "signal_resetter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccessControl {
    holders: HashMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    /// Every role held by `admin`.
    pub fn bootstrap(admin: &Address) -> Self {
        let mut access = Self::default();
        for role in Role::ALL {
            access.holders.entry(role).or_default().insert(admin.clone());
        }
        access
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.holders.get(&role).is_some_and(|s| s.contains(account))
    }

    pub fn require(&self, role: Role, caller: &Address) -> Result<(), PassportError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(PassportError::Unauthorized {
                caller: caller.clone(),
                capability: role.name().to_string(),
            })
        }
    }

    /// Returns whether the account did not already hold the role.
    pub fn grant(&mut self, caller: &Address, role: Role, account: &Address) -> Result<bool, PassportError> {
        self.require(Role::Admin, caller)?;
        Ok(self.holders.entry(role).or_default().insert(account.clone()))
    }

    /// Returns whether the account held the role.
    pub fn revoke(&mut self, caller: &Address, role: Role, account: &Address) -> Result<bool, PassportError> {
        self.require(Role::Admin, caller)?;
        Ok(self
            .holders
            .get_mut(&role)
            .is_some_and(|s| s.remove(account)))
    }

    pub fn holders(&self, role: Role) -> Vec<Address> {
        self.holders
            .get(&role)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }
}
