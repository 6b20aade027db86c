use thiserror::Error;

/// Errors raised while constructing the shared types from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
