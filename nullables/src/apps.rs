//! Nullable application registry.

use passport_types::{Address, AppId, AppRegistry};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory application registry: app id → administrator.
#[derive(Debug, Default)]
pub struct NullAppRegistry {
    apps: RwLock<HashMap<AppId, Address>>,
}

impl NullAppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `app` (or replace its administrator).
    pub fn register(&self, app: AppId, admin: Address) {
        let mut apps = self.apps.write().unwrap_or_else(|e| e.into_inner());
        apps.insert(app, admin);
    }

    pub fn remove(&self, app: &AppId) {
        let mut apps = self.apps.write().unwrap_or_else(|e| e.into_inner());
        apps.remove(app);
    }
}

impl AppRegistry for NullAppRegistry {
    fn app_exists(&self, app: &AppId) -> bool {
        let apps = self.apps.read().unwrap_or_else(|e| e.into_inner());
        apps.contains_key(app)
    }

    fn app_admin(&self, app: &AppId) -> Option<Address> {
        let apps = self.apps.read().unwrap_or_else(|e| e.into_inner());
        apps.get(app).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let registry = NullAppRegistry::new();
        let app = AppId::new([1u8; 32]);
        assert!(!registry.app_exists(&app));

        registry.register(app, Address::new("psp_admin"));
        assert!(registry.app_exists(&app));
        assert_eq!(registry.app_admin(&app), Some(Address::new("psp_admin")));

        registry.remove(&app);
        assert_eq!(registry.app_admin(&app), None);
    }
}
