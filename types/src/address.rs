//! Account address type with `psp_` prefix.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger address, always prefixed with `psp_`.
///
/// Encodes the holder's Ed25519 public key (see `passport_crypto::derive_address`),
/// which is what lets an offline consent signature be checked against the address
/// alone.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all addresses.
    pub const PREFIX: &'static str = "psp_";

    /// Create an address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `psp_`. Use [`Address::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with psp_");
        Self(s)
    }

    /// Parse an address from untrusted input.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with(Self::PREFIX) || trimmed.len() == Self::PREFIX.len() {
            return Err(TypeError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cheap well-formedness check (prefix and non-empty body). Checksum
    /// validation lives in `passport_crypto::validate_address`.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_prefixed() {
        let a = Address::parse("psp_alice").unwrap();
        assert_eq!(a.as_str(), "psp_alice");
        assert!(a.is_valid());
    }

    #[test]
    fn parse_rejects_foreign_prefix() {
        assert!(matches!(
            Address::parse("brst_alice"),
            Err(TypeError::InvalidAddress(_))
        ));
        assert!(Address::parse("psp_").is_err());
    }

    #[test]
    #[should_panic(expected = "address must start with psp_")]
    fn new_panics_on_bad_prefix() {
        let _ = Address::new("0xdeadbeef");
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Address::new("psp_a") < Address::new("psp_b"));
    }
}
