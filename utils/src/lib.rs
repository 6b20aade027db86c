//! Shared utilities for the passport ledger.

pub mod logging;

pub use logging::{init_tracing, LogFormat};
