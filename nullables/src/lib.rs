//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every collaborator the ledger reads but does not own (block clock, round
//! scheduler, application registry, membership token) is abstracted behind a
//! trait in `passport-types`. This crate provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, through `&self`, while shared in an `Arc`
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and simulations.

pub mod apps;
pub mod clock;
pub mod membership;

pub use apps::NullAppRegistry;
pub use clock::{NullBlockClock, NullRoundClock};
pub use membership::NullMembership;
