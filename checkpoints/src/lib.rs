//! Block-checkpointed state.
//!
//! A [`Trace`] is an append-only timeline of `(block, value)` checkpoints; reads
//! binary-search the last checkpoint at or before the requested block. The
//! [`ParamStore`] keeps one trace per [`passport_types::ParamKey`], which is how
//! a vote running against a snapshot block keeps the thresholds, toggles and
//! decay settings that were in force at that block.

pub mod error;
pub mod params;
pub mod trace;

pub use error::CheckpointError;
pub use params::ParamStore;
pub use trace::{Checkpoint, Trace};
