//! Ed25519 keys and raw signatures over 32-byte digests.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use passport_types::{KeyPair, PrivateKey, PublicKey, Signature};
use rand::rngs::OsRng;

fn pair_of(signing_key: &SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// A fresh key pair from the OS random source.
pub fn generate_keypair() -> KeyPair {
    pair_of(&SigningKey::generate(&mut OsRng))
}

/// The key pair whose secret is `seed`. Used by tooling that needs
/// reproducible addresses.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    pair_of(&SigningKey::from_bytes(seed))
}

pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}

/// Sign a digest.
pub fn sign_digest(digest: &[u8; 32], private: &PrivateKey) -> Signature {
    Signature(SigningKey::from_bytes(&private.0).sign(digest).to_bytes())
}

/// Strict verification: malformed keys and non-canonical signatures fail.
pub fn verify_digest(digest: &[u8; 32], signature: &Signature, public: &PublicKey) -> bool {
    match VerifyingKey::from_bytes(&public.0) {
        Ok(key) => key
            .verify_strict(digest, &ed25519_dalek::Signature::from_bytes(&signature.0))
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_pairs_are_reproducible() {
        let a = keypair_from_seed(&[9u8; 32]);
        assert_eq!(a.public, keypair_from_seed(&[9u8; 32]).public);
        assert_eq!(a.public, public_from_private(&a.private));
        assert_ne!(a.public, generate_keypair().public);
    }

    #[test]
    fn digest_signature_binds_key_and_digest() {
        let signer = keypair_from_seed(&[1u8; 32]);
        let stranger = keypair_from_seed(&[2u8; 32]);
        let digest = [7u8; 32];
        let sig = sign_digest(&digest, &signer.private);

        assert!(verify_digest(&digest, &sig, &signer.public));
        assert!(!verify_digest(&[8u8; 32], &sig, &signer.public));
        assert!(!verify_digest(&digest, &sig, &stranger.public));
        assert!(!verify_digest(&digest, &sig, &PublicKey([0xFF; 32])));
    }
}
