//! Key material for offline consent.
//!
//! Addresses embed the public key, so these types only travel between the
//! signing tools and the consent check. Signatures cross the JSON and CLI
//! boundary as 128-character hex strings.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Ed25519 secret seed, wiped on drop. Deliberately not `Clone` or `Debug`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Ed25519 signature over a consent digest.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 bytes of hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s.trim().trim_start_matches("0x")).ok()?;
        Some(Self(bytes.try_into().ok()?))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..6]))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Signature::from_hex(&text)
            .ok_or_else(|| de::Error::custom("expected a 64-byte hex signature"))
    }
}
