//! Cryptographic primitives for the passport ledger.
//!
//! - **Ed25519** for consent signatures
//! - **Blake2b** for hashing and typed-data digests
//! - Address derivation with `psp_` prefix and base32 encoding, reversible to the
//!   public key so a consent can be verified against the signer's address alone
//! - Domain-separated consent digests for offline entity-link and delegation consent

pub mod address;
pub mod consent;
pub mod hash;
pub mod keys;

pub use address::{decode_address, derive_address, validate_address};
pub use consent::{sign_consent, verify_consent, Consent, ConsentDomain, ConsentKind};
pub use hash::{app_id_from_name, blake2b_256, blake2b_256_multi};
pub use keys::{
    generate_keypair, keypair_from_seed, public_from_private, sign_digest, verify_digest,
};
