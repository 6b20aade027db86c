use passport_checkpoints::CheckpointError;
use passport_identity::IdentityError;
use passport_scoring::ScoringError;
use passport_signals::SignalError;
use passport_types::{Address, AppId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PassportError {
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("parameter error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("{caller} lacks the {capability} capability")]
    Unauthorized { caller: Address, capability: String },

    #[error("application {0} is not registered")]
    UnknownApp(AppId),

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
