//! Domain-separated typed consent digests.
//!
//! An entity that wants to be linked to a passport (or a delegator that wants to
//! hand its personhood to a delegatee) signs a consent offline; the counterparty
//! submits it. The signed digest binds:
//!
//! - the **domain**: deployment name, version, chain id and verifying contract,
//!   so a consent cannot be replayed against another deployment;
//! - the **kind**: link and delegation consents have distinct type hashes;
//! - the **parties**, the signer's **nonce** and a **deadline** block.
//!
//! Layout: `blake2b(0x19 0x01 || domain_separator || struct_hash)`.

use crate::hash::{blake2b_256, blake2b_256_multi};
use crate::keys::{sign_digest, verify_digest};
use passport_types::{Address, BlockNumber, PrivateKey, Signature};
use serde::{Deserialize, Serialize};

const DOMAIN_TYPE: &str =
    "PassportDomain(string name,string version,uint64 chainId,string verifyingContract)";
const LINK_TYPE: &str =
    "LinkEntity(address entity,address passport,uint64 nonce,uint64 deadline)";
const DELEGATION_TYPE: &str =
    "Delegation(address delegator,address delegatee,uint64 nonce,uint64 deadline)";

/// Deployment identity mixed into every consent digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: String,
}

impl ConsentDomain {
    pub fn separator(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            &blake2b_256(DOMAIN_TYPE.as_bytes()),
            &blake2b_256(self.name.as_bytes()),
            &blake2b_256(self.version.as_bytes()),
            &self.chain_id.to_be_bytes(),
            &blake2b_256(self.verifying_contract.as_bytes()),
        ])
    }
}

impl Default for ConsentDomain {
    fn default() -> Self {
        Self {
            name: "Passport".to_string(),
            version: "1".to_string(),
            chain_id: 1,
            verifying_contract: "passport".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
    /// Signed by the entity; counterparty is the passport.
    LinkEntity,
    /// Signed by the delegator; counterparty is the delegatee.
    Delegation,
}

impl ConsentKind {
    pub fn type_hash(&self) -> [u8; 32] {
        match self {
            Self::LinkEntity => blake2b_256(LINK_TYPE.as_bytes()),
            Self::Delegation => blake2b_256(DELEGATION_TYPE.as_bytes()),
        }
    }
}

/// The message a signer consents to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    pub kind: ConsentKind,
    pub signer: Address,
    pub counterparty: Address,
    pub nonce: u64,
    pub deadline: BlockNumber,
}

impl Consent {
    pub fn struct_hash(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            &self.kind.type_hash(),
            &blake2b_256(self.signer.as_str().as_bytes()),
            &blake2b_256(self.counterparty.as_str().as_bytes()),
            &self.nonce.to_be_bytes(),
            &self.deadline.as_u64().to_be_bytes(),
        ])
    }

    /// The digest that is actually signed.
    pub fn digest(&self, domain: &ConsentDomain) -> [u8; 32] {
        blake2b_256_multi(&[&[0x19, 0x01], &domain.separator(), &self.struct_hash()])
    }
}

/// Sign a consent with the signer's private key.
pub fn sign_consent(consent: &Consent, domain: &ConsentDomain, private: &PrivateKey) -> Signature {
    sign_digest(&consent.digest(domain), private)
}

/// Verify that `signature` is the signer's consent. The public key is
/// recovered from the signer's address.
pub fn verify_consent(consent: &Consent, domain: &ConsentDomain, signature: &Signature) -> bool {
    let Some(public) = crate::decode_address(&consent.signer) else {
        return false;
    };
    verify_digest(&consent.digest(domain), signature, &public)
}
