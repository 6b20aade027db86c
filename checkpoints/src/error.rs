use passport_types::{BlockNumber, ParamKey};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("checkpoint at block {attempted} precedes latest checkpoint at block {last}")]
    OutOfOrder {
        last: BlockNumber,
        attempted: BlockNumber,
    },

    #[error("value {value} is out of range for parameter {key}")]
    InvalidValue { key: ParamKey, value: u64 },
}
