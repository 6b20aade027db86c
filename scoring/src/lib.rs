//! Participation score ledger.
//!
//! Every registered action earns the security multiplier of its application's
//! tier, credited to the acting address's round score and to its per-app round
//! score. The cumulative score folds the last `N` rounds with a per-round
//! percentage decay:
//!
//! `C(k) = score(k) + floor(C(k−1) × (100 − decay) / 100)`
//!
//! Entity → passport redirection and deny-list no-ops are applied by the caller,
//! which owns the identity graph and the lists.

pub mod decay;
pub mod error;
pub mod ledger;

pub use decay::{cumulative_score, window_start};
pub use error::ScoringError;
pub use ledger::ScoreLedger;
