//! Offline consent verification with per-signer replay nonces.

use crate::error::IdentityError;
use passport_crypto::{verify_consent, Consent, ConsentDomain, ConsentKind};
use passport_types::{Address, BlockNumber, Signature};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Verifies consents for one deployment domain and tracks signer nonces.
///
/// A consent binds the signer's current nonce; the nonce is bumped once the
/// consented operation commits, so the same signature cannot be replayed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsentBook {
    domain: ConsentDomain,
    nonces: HashMap<Address, u64>,
}

impl ConsentBook {
    pub fn new(domain: ConsentDomain) -> Self {
        Self {
            domain,
            nonces: HashMap::new(),
        }
    }

    pub fn domain(&self) -> &ConsentDomain {
        &self.domain
    }

    /// The nonce the signer's next consent must carry.
    pub fn nonce(&self, signer: &Address) -> u64 {
        self.nonces.get(signer).copied().unwrap_or(0)
    }

    /// The consent `signer` would have to sign for this operation.
    pub fn expected_consent(
        &self,
        kind: ConsentKind,
        signer: &Address,
        counterparty: &Address,
        deadline: BlockNumber,
    ) -> Consent {
        Consent {
            kind,
            signer: signer.clone(),
            counterparty: counterparty.clone(),
            nonce: self.nonce(signer),
            deadline,
        }
    }

    /// Check deadline and signature without consuming the nonce.
    pub fn check(
        &self,
        kind: ConsentKind,
        signer: &Address,
        counterparty: &Address,
        deadline: BlockNumber,
        signature: &Signature,
        now: BlockNumber,
    ) -> Result<(), IdentityError> {
        if deadline < now {
            return Err(IdentityError::SignatureExpired { deadline, now });
        }
        let consent = self.expected_consent(kind, signer, counterparty, deadline);
        if !verify_consent(&consent, &self.domain, signature) {
            tracing::warn!(signer = %signer, counterparty = %counterparty, ?kind, "consent signature rejected");
            return Err(IdentityError::InvalidSignature {
                signer: signer.clone(),
            });
        }
        Ok(())
    }

    /// Burn the signer's current nonce.
    pub fn consume(&mut self, signer: &Address) {
        let nonce = self.nonces.entry(signer.clone()).or_insert(0);
        *nonce = nonce.saturating_add(1);
    }
}

impl Default for ConsentBook {
    fn default() -> Self {
        Self::new(ConsentDomain::default())
    }
}
