//! Events recorded by the ledger for the host to process.

use crate::access::Role;
use passport_signals::ListKind;
use passport_types::{Address, AppId, BlockNumber, ParamKey, RoundId, SecurityTier};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PassportEvent {
    // ── Entity links ──
    LinkRequested { entity: Address, passport: Address },
    LinkAccepted { entity: Address, passport: Address },
    LinkDenied { entity: Address, passport: Address },
    LinkCancelled { entity: Address, passport: Address },
    /// Link created from an entity-signed consent.
    LinkCreatedBySignature { entity: Address, passport: Address },
    LinkRemoved { entity: Address, passport: Address },

    // ── Delegation ──
    DelegationRequested { delegator: Address, delegatee: Address },
    DelegationAccepted { delegator: Address, delegatee: Address },
    DelegationDenied { delegator: Address, delegatee: Address },
    DelegationCancelled { delegator: Address, delegatee: Address },
    DelegationCreatedBySignature { delegator: Address, delegatee: Address },
    /// Explicit revoke, or the old delegation replaced by a new one.
    DelegationRevoked { delegator: Address, delegatee: Address },

    // ── Scores ──
    ActionRegistered {
        /// The address that acted.
        user: Address,
        /// The address credited, after entity → passport redirection.
        credited: Address,
        app: AppId,
        round: RoundId,
        points: u64,
    },
    AppSecuritySet { app: AppId, tier: SecurityTier },

    // ── Signals and lists ──
    SignalerAssigned { app: AppId, signaler: Address },
    SignalerRemoved { app: AppId, signaler: Address },
    UserSignaled {
        user: Address,
        app: AppId,
        signaler: Address,
        reason: String,
    },
    SignalsReset { user: Address, reason: String, cleared: u64 },
    AppSignalsReset {
        user: Address,
        app: AppId,
        reason: String,
        removed: u64,
    },
    Listed { list: ListKind, addr: Address },
    Unlisted { list: ListKind, addr: Address },

    // ── Administration ──
    ParamSet { key: ParamKey, value: u64, block: BlockNumber },
    RoleGranted { role: Role, account: Address },
    RoleRevoked { role: Role, account: Address },
}
