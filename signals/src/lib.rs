//! Reputation signals of the passport ledger.
//!
//! - [`SignalBook`]: bot-signal reports filed by per-application signalers,
//!   with per-app audit counters.
//! - [`AccessLists`]: allow/deny flags, checkpointed by block.
//!
//! Both store counts and flags per address. Passport-level values are derived
//! on read from the passport's own record and those of its linked entities, so
//! unlinking an entity removes exactly its contribution.

pub mod counters;
pub mod error;
pub mod lists;

pub use counters::SignalBook;
pub use error::SignalError;
pub use lists::{meets_threshold, AccessLists, ListKind};
