use passport_checkpoints::CheckpointError;
use passport_types::{Address, AppId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("{0} is not a signaler for this application")]
    NotSignaler(Address),

    #[error("{signaler} already signals for application {app}")]
    AlreadyAssigned { signaler: Address, app: AppId },

    #[error("signal counter overflow")]
    Overflow,

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
