use passport_types::AppId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("round 0 is not a scoring round")]
    InvalidRound,

    #[error("arithmetic overflow in score computation")]
    Overflow,

    #[error("application {0} is not registered")]
    UnknownApp(AppId),
}
