//! The passport ledger.
//!
//! [`Passport`] ties the parameter store, the identity graph, the score ledger
//! and the signal/list aggregator together behind capability checks, answers
//! `is_person` / `is_person_at`, records [`PassportEvent`]s for the host, and
//! snapshots its whole state with `bincode`.

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod passport;
pub mod personhood;

pub use access::{AccessControl, Role};
pub use config::PassportConfig;
pub use error::PassportError;
pub use events::PassportEvent;
pub use passport::{Collaborators, Passport};
pub use personhood::{decide, Personhood, PersonhoodReason};
