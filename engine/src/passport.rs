//! The passport ledger orchestrator.

use crate::access::{AccessControl, Role};
use crate::config::PassportConfig;
use crate::error::PassportError;
use crate::events::PassportEvent;
use crate::personhood::{decide, Personhood};
use passport_checkpoints::ParamStore;
use passport_crypto::ConsentDomain;
use passport_identity::{
    role_of, role_of_at, AddressRole, ConsentBook, DelegationRegistry, EntityLinks,
    PendingRequest,
};
use passport_scoring::ScoreLedger;
use passport_signals::{AccessLists, ListKind, SignalBook};
use passport_types::{
    Address, AppId, AppRegistry, BlockClock, BlockNumber, Check, MembershipLevels, ParamKey,
    RoundClock, RoundId, SecurityTier, Signature,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The external systems the ledger reads but does not own.
#[derive(Clone)]
pub struct Collaborators {
    pub blocks: Arc<dyn BlockClock>,
    pub rounds: Arc<dyn RoundClock>,
    pub apps: Arc<dyn AppRegistry>,
    pub membership: Arc<dyn MembershipLevels>,
}

/// Personhood ledger: parameters, identity graph, scores, signals and lists.
///
/// Every mutating call takes the calling address first and is stamped with the
/// block clock's current block. A call either commits entirely or returns an
/// error and changes nothing.
pub struct Passport {
    params: ParamStore,
    links: EntityLinks,
    delegations: DelegationRegistry,
    consents: ConsentBook,
    scores: ScoreLedger,
    signals: SignalBook,
    lists: AccessLists,
    access: AccessControl,
    collaborators: Collaborators,
    /// Pending events for the host to process.
    pending_events: Vec<PassportEvent>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    params: &'a ParamStore,
    links: &'a EntityLinks,
    delegations: &'a DelegationRegistry,
    consents: &'a ConsentBook,
    scores: &'a ScoreLedger,
    signals: &'a SignalBook,
    lists: &'a AccessLists,
    access: &'a AccessControl,
}

/// Owned mirror of [`SnapshotRef`]; the field order must match.
#[derive(Deserialize)]
struct Snapshot {
    params: ParamStore,
    links: EntityLinks,
    delegations: DelegationRegistry,
    consents: ConsentBook,
    scores: ScoreLedger,
    signals: SignalBook,
    lists: AccessLists,
    access: AccessControl,
}

impl Passport {
    /// A fresh ledger: parameters seeded at the genesis block, every role held
    /// by `admin`.
    pub fn new(
        config: &PassportConfig,
        admin: &Address,
        collaborators: Collaborators,
    ) -> Result<Self, PassportError> {
        let genesis = BlockNumber::new(config.genesis_block);
        let params = ParamStore::with_defaults(&config.params, genesis)?;
        tracing::info!(admin = %admin, genesis = %genesis, domain = %config.domain.name, "passport ledger initialised");
        Ok(Self {
            params,
            links: EntityLinks::new(),
            delegations: DelegationRegistry::new(),
            consents: ConsentBook::new(config.domain.clone()),
            scores: ScoreLedger::new(),
            signals: SignalBook::new(),
            lists: AccessLists::new(),
            access: AccessControl::bootstrap(admin),
            collaborators,
            pending_events: Vec::new(),
        })
    }

    fn now(&self) -> BlockNumber {
        self.collaborators.blocks.current_block()
    }

    fn emit(&mut self, event: PassportEvent) {
        self.pending_events.push(event);
    }

    /// Take all pending events.
    pub fn drain_events(&mut self) -> Vec<PassportEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Access control ────────────────────────────────────────────────────

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<(), PassportError> {
        if self.access.grant(caller, role, account)? {
            tracing::info!(role = %role, account = %account, "role granted");
            self.emit(PassportEvent::RoleGranted {
                role,
                account: account.clone(),
            });
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<(), PassportError> {
        if self.access.revoke(caller, role, account)? {
            tracing::info!(role = %role, account = %account, "role revoked");
            self.emit(PassportEvent::RoleRevoked {
                role,
                account: account.clone(),
            });
        }
        Ok(())
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.access.has_role(role, account)
    }

    fn require_app_admin(&self, caller: &Address, app: &AppId) -> Result<(), PassportError> {
        let admin = self
            .collaborators
            .apps
            .app_admin(app)
            .ok_or(PassportError::UnknownApp(*app))?;
        if &admin != caller {
            return Err(PassportError::Unauthorized {
                caller: caller.clone(),
                capability: format!("app_admin({app})"),
            });
        }
        Ok(())
    }

    // ── Parameters ────────────────────────────────────────────────────────

    pub fn set_param(&mut self, caller: &Address, key: ParamKey, value: u64) -> Result<(), PassportError> {
        self.access.require(Role::SettingsManager, caller)?;
        let block = self.now();
        self.params.set(key, value, block)?;
        tracing::info!(param = %key, value, block = %block, "parameter set");
        self.emit(PassportEvent::ParamSet { key, value, block });
        Ok(())
    }

    pub fn set_check_enabled(&mut self, caller: &Address, check: Check, enabled: bool) -> Result<(), PassportError> {
        self.set_param(caller, ParamKey::CheckEnabled(check), u64::from(enabled))
    }

    pub fn param(&self, key: ParamKey) -> u64 {
        self.params.current(key)
    }

    pub fn param_at(&self, key: ParamKey, block: BlockNumber) -> u64 {
        self.params.at(key, block)
    }

    pub fn is_check_enabled(&self, check: Check) -> bool {
        self.params.is_enabled(check)
    }

    pub fn is_check_enabled_at(&self, check: Check, block: BlockNumber) -> bool {
        self.params.is_enabled_at(check, block)
    }

    // ── Entity links ──────────────────────────────────────────────────────

    /// `caller` (the entity) asks `passport` to link it.
    pub fn request_link(&mut self, caller: &Address, passport: &Address) -> Result<(), PassportError> {
        let now = self.now();
        if let Some(replaced) = self.links.request_link(caller, passport, now)? {
            self.emit(PassportEvent::LinkCancelled {
                entity: caller.clone(),
                passport: replaced.to,
            });
        }
        self.emit(PassportEvent::LinkRequested {
            entity: caller.clone(),
            passport: passport.clone(),
        });
        Ok(())
    }

    /// `caller` (the passport) accepts `entity`'s pending request.
    pub fn accept_link(&mut self, caller: &Address, entity: &Address) -> Result<(), PassportError> {
        let now = self.now();
        let max = self.params.current(ParamKey::MaxEntitiesPerPassport);
        self.links.accept_link(caller, entity, max, now)?;
        self.emit(PassportEvent::LinkAccepted {
            entity: entity.clone(),
            passport: caller.clone(),
        });
        Ok(())
    }

    pub fn deny_link(&mut self, caller: &Address, entity: &Address) -> Result<(), PassportError> {
        self.links.deny_incoming(caller, entity)?;
        self.emit(PassportEvent::LinkDenied {
            entity: entity.clone(),
            passport: caller.clone(),
        });
        Ok(())
    }

    pub fn cancel_link_request(&mut self, caller: &Address) -> Result<(), PassportError> {
        let request = self.links.cancel_outgoing(caller)?;
        self.emit(PassportEvent::LinkCancelled {
            entity: caller.clone(),
            passport: request.to,
        });
        Ok(())
    }

    /// `caller` (the passport) links `entity` from its signed consent.
    pub fn direct_link(
        &mut self,
        caller: &Address,
        entity: &Address,
        deadline: BlockNumber,
        signature: &Signature,
    ) -> Result<(), PassportError> {
        let now = self.now();
        let max = self.params.current(ParamKey::MaxEntitiesPerPassport);
        let had_request = self.links.pending_outgoing(entity).cloned();
        self.links
            .direct_link(caller, entity, deadline, signature, max, &mut self.consents, now)?;
        if let Some(request) = had_request {
            self.emit(PassportEvent::LinkCancelled {
                entity: entity.clone(),
                passport: request.to,
            });
        }
        self.emit(PassportEvent::LinkCreatedBySignature {
            entity: entity.clone(),
            passport: caller.clone(),
        });
        Ok(())
    }

    /// Either party removes the Active link of `entity`.
    pub fn unlink(&mut self, caller: &Address, entity: &Address) -> Result<(), PassportError> {
        let now = self.now();
        let passport = self.links.unlink(caller, entity, now)?;
        self.emit(PassportEvent::LinkRemoved {
            entity: entity.clone(),
            passport,
        });
        Ok(())
    }

    pub fn passport_of(&self, entity: &Address) -> Option<&Address> {
        self.links.passport_of(entity)
    }

    pub fn passport_of_at(&self, entity: &Address, block: BlockNumber) -> Option<&Address> {
        self.links.passport_of_at(entity, block)
    }

    pub fn entities_of(&self, passport: &Address) -> Vec<Address> {
        self.links.entities_of(passport)
    }

    pub fn entities_of_at(&self, passport: &Address, block: BlockNumber) -> Vec<Address> {
        self.links.entities_of_at(passport, block)
    }

    pub fn is_entity(&self, addr: &Address) -> bool {
        self.links.is_entity(addr)
    }

    pub fn is_entity_at(&self, addr: &Address, block: BlockNumber) -> bool {
        self.links.is_entity_at(addr, block)
    }

    pub fn pending_link_outgoing(&self, entity: &Address) -> Option<&PendingRequest> {
        self.links.pending_outgoing(entity)
    }

    pub fn pending_link_incoming(&self, passport: &Address) -> Vec<&Address> {
        self.links.pending_incoming(passport)
    }

    // ── Delegation ────────────────────────────────────────────────────────

    /// `caller` (the delegator) asks `delegatee` to take its personhood.
    pub fn request_delegation(&mut self, caller: &Address, delegatee: &Address) -> Result<(), PassportError> {
        let now = self.now();
        let replaced = self.delegations.pending_outgoing(caller).cloned();
        let revoked = self
            .delegations
            .request_delegation(caller, delegatee, &self.links, now)?;
        self.emit_revoked(caller, revoked);
        if let Some(request) = replaced {
            self.emit(PassportEvent::DelegationCancelled {
                delegator: caller.clone(),
                delegatee: request.to,
            });
        }
        self.emit(PassportEvent::DelegationRequested {
            delegator: caller.clone(),
            delegatee: delegatee.clone(),
        });
        Ok(())
    }

    /// `caller` (the delegatee) accepts `delegator`'s pending request.
    pub fn accept_delegation(&mut self, caller: &Address, delegator: &Address) -> Result<(), PassportError> {
        let now = self.now();
        let revoked = self
            .delegations
            .accept_delegation(caller, delegator, &self.links, now)?;
        self.emit_revoked(delegator, revoked);
        self.emit(PassportEvent::DelegationAccepted {
            delegator: delegator.clone(),
            delegatee: caller.clone(),
        });
        Ok(())
    }

    pub fn deny_delegation(&mut self, caller: &Address, delegator: &Address) -> Result<(), PassportError> {
        self.delegations.deny_incoming(caller, delegator)?;
        self.emit(PassportEvent::DelegationDenied {
            delegator: delegator.clone(),
            delegatee: caller.clone(),
        });
        Ok(())
    }

    pub fn cancel_delegation_request(&mut self, caller: &Address) -> Result<(), PassportError> {
        let request = self.delegations.cancel_outgoing(caller)?;
        self.emit(PassportEvent::DelegationCancelled {
            delegator: caller.clone(),
            delegatee: request.to,
        });
        Ok(())
    }

    /// `caller` (the delegatee) activates a delegation from the delegator's
    /// signed consent.
    pub fn delegate_with_signature(
        &mut self,
        caller: &Address,
        delegator: &Address,
        deadline: BlockNumber,
        signature: &Signature,
    ) -> Result<(), PassportError> {
        let now = self.now();
        let had_request = self.delegations.pending_outgoing(delegator).cloned();
        let revoked = self.delegations.delegate_with_signature(
            caller,
            delegator,
            deadline,
            signature,
            &self.links,
            &mut self.consents,
            now,
        )?;
        self.emit_revoked(delegator, revoked);
        if let Some(request) = had_request {
            self.emit(PassportEvent::DelegationCancelled {
                delegator: delegator.clone(),
                delegatee: request.to,
            });
        }
        self.emit(PassportEvent::DelegationCreatedBySignature {
            delegator: delegator.clone(),
            delegatee: caller.clone(),
        });
        Ok(())
    }

    /// Either party removes the delegation `caller` takes part in.
    pub fn revoke_delegation(&mut self, caller: &Address) -> Result<(), PassportError> {
        let now = self.now();
        let (delegator, delegatee) = self.delegations.revoke(caller, now)?;
        self.emit(PassportEvent::DelegationRevoked {
            delegator,
            delegatee,
        });
        Ok(())
    }

    fn emit_revoked(&mut self, delegator: &Address, revoked: Option<Address>) {
        if let Some(delegatee) = revoked {
            self.emit(PassportEvent::DelegationRevoked {
                delegator: delegator.clone(),
                delegatee,
            });
        }
    }

    pub fn delegatee_of(&self, delegator: &Address) -> Option<&Address> {
        self.delegations.delegatee_of(delegator)
    }

    pub fn delegatee_of_at(&self, delegator: &Address, block: BlockNumber) -> Option<&Address> {
        self.delegations.delegatee_of_at(delegator, block)
    }

    pub fn delegator_of(&self, delegatee: &Address) -> Option<&Address> {
        self.delegations.delegator_of(delegatee)
    }

    pub fn delegator_of_at(&self, delegatee: &Address, block: BlockNumber) -> Option<&Address> {
        self.delegations.delegator_of_at(delegatee, block)
    }

    pub fn is_delegator(&self, addr: &Address) -> bool {
        self.delegations.is_delegator(addr)
    }

    pub fn is_delegator_at(&self, addr: &Address, block: BlockNumber) -> bool {
        self.delegations.is_delegator_at(addr, block)
    }

    pub fn is_delegatee(&self, addr: &Address) -> bool {
        self.delegations.is_delegatee(addr)
    }

    pub fn is_delegatee_at(&self, addr: &Address, block: BlockNumber) -> bool {
        self.delegations.is_delegatee_at(addr, block)
    }

    pub fn pending_delegation_outgoing(&self, delegator: &Address) -> Option<&PendingRequest> {
        self.delegations.pending_outgoing(delegator)
    }

    pub fn pending_delegation_incoming(&self, delegatee: &Address) -> Vec<&Address> {
        self.delegations.pending_incoming(delegatee)
    }

    pub fn role_of(&self, addr: &Address) -> AddressRole {
        role_of(&self.links, &self.delegations, addr)
    }

    pub fn role_of_at(&self, addr: &Address, block: BlockNumber) -> AddressRole {
        role_of_at(&self.links, &self.delegations, addr, block)
    }

    /// The nonce the signer's next consent must carry.
    pub fn consent_nonce(&self, signer: &Address) -> u64 {
        self.consents.nonce(signer)
    }

    pub fn consent_domain(&self) -> &ConsentDomain {
        self.consents.domain()
    }

    // ── Scores ────────────────────────────────────────────────────────────

    pub fn set_app_security(&mut self, caller: &Address, app: AppId, tier: SecurityTier) -> Result<(), PassportError> {
        self.access.require(Role::ActionScoreManager, caller)?;
        self.scores
            .set_app_security(self.collaborators.apps.as_ref(), app, tier)?;
        self.emit(PassportEvent::AppSecuritySet { app, tier });
        Ok(())
    }

    pub fn app_security(&self, app: &AppId) -> Option<SecurityTier> {
        self.scores.app_security(app)
    }

    /// Credit one action by `user` in `app` to the current round.
    pub fn register_action(&mut self, caller: &Address, user: &Address, app: AppId) -> Result<u64, PassportError> {
        let round = self.collaborators.rounds.current_round();
        self.register_action_for_round(caller, user, app, round)
    }

    /// Credit one action by `user` in `app` to `round`. Returns the points
    /// added; deny-listed users and untiered apps add nothing.
    pub fn register_action_for_round(
        &mut self,
        caller: &Address,
        user: &Address,
        app: AppId,
        round: RoundId,
    ) -> Result<u64, PassportError> {
        self.access.require(Role::ActionRegistrar, caller)?;
        let credited = self.links.resolve(user);
        if self.lists.is_listed(ListKind::Deny, user) || self.lists.is_listed(ListKind::Deny, &credited) {
            tracing::debug!(user = %user, app = %app, "deny-listed user scores nothing");
            return Ok(0);
        }
        let points = self
            .scores
            .register_action(&credited, app, round, &self.params)?;
        if points > 0 {
            self.emit(PassportEvent::ActionRegistered {
                user: user.clone(),
                credited,
                app,
                round,
                points,
            });
        }
        Ok(points)
    }

    /// Credit an externally computed total for `user` in `app` and `round`.
    pub fn register_aggregated_actions(
        &mut self,
        caller: &Address,
        user: &Address,
        app: AppId,
        round: RoundId,
        amount: u64,
    ) -> Result<(), PassportError> {
        self.access.require(Role::ActionScoreManager, caller)?;
        let credited = self.links.resolve(user);
        self.scores.add_points(&credited, app, round, amount)?;
        self.emit(PassportEvent::ActionRegistered {
            user: user.clone(),
            credited,
            app,
            round,
            points: amount,
        });
        Ok(())
    }

    pub fn round_score(&self, addr: &Address, round: RoundId) -> u64 {
        self.scores.round_score(addr, round)
    }

    pub fn app_round_score(&self, addr: &Address, round: RoundId, app: &AppId) -> u64 {
        self.scores.app_round_score(addr, round, app)
    }

    pub fn total_score(&self, addr: &Address) -> u64 {
        self.scores.total_score(addr)
    }

    pub fn app_total_score(&self, addr: &Address, app: &AppId) -> u64 {
        self.scores.app_total_score(addr, app)
    }

    /// Decayed score over the window ending at `last_round`, with the current
    /// window and decay rate.
    pub fn cumulative_score(&self, addr: &Address, last_round: RoundId) -> u64 {
        self.scores.cumulative_score(
            addr,
            last_round,
            self.params.current(ParamKey::RoundsForCumulativeScore),
            self.params.current(ParamKey::DecayRate),
        )
    }

    /// Like [`Passport::cumulative_score`] with the window and decay rate in
    /// force at `block`.
    pub fn cumulative_score_at(&self, addr: &Address, last_round: RoundId, block: BlockNumber) -> u64 {
        self.scores.cumulative_score(
            addr,
            last_round,
            self.params.at(ParamKey::RoundsForCumulativeScore, block),
            self.params.at(ParamKey::DecayRate, block),
        )
    }

    // ── Signals ───────────────────────────────────────────────────────────

    /// `caller` (the app administrator) lets `signaler` signal for `app`.
    pub fn assign_signaler(&mut self, caller: &Address, app: AppId, signaler: &Address) -> Result<(), PassportError> {
        self.require_app_admin(caller, &app)?;
        self.signals.assign_signaler(signaler, app)?;
        self.emit(PassportEvent::SignalerAssigned {
            app,
            signaler: signaler.clone(),
        });
        Ok(())
    }

    pub fn remove_signaler(&mut self, caller: &Address, app: AppId, signaler: &Address) -> Result<(), PassportError> {
        self.require_app_admin(caller, &app)?;
        self.signals.remove_signaler(signaler, app)?;
        self.emit(PassportEvent::SignalerRemoved {
            app,
            signaler: signaler.clone(),
        });
        Ok(())
    }

    /// File one bot signal against `user`. An empty reason is allowed.
    pub fn signal(&mut self, caller: &Address, user: &Address, reason: &str) -> Result<(), PassportError> {
        let app = self.signals.signal(caller, user, reason)?;
        self.emit(PassportEvent::UserSignaled {
            user: user.clone(),
            app,
            signaler: caller.clone(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// The addresses whose direct counters make up `user`'s aggregate:
    /// `user` alone for an Active entity, otherwise `user` and its Active
    /// entities.
    fn signal_group(&self, user: &Address) -> Vec<Address> {
        if self.links.is_entity(user) {
            Vec::new()
        } else {
            self.links.entities_of(user)
        }
    }

    /// Zero the aggregate signal count of `user`. Resetting an entity clears
    /// only its own signals; resetting a passport clears its own and its
    /// Active entities'. Per-app counters are the audit trail and stay
    /// untouched, unlike [`Passport::reset_signals_for_app`].
    pub fn reset_signals(&mut self, caller: &Address, user: &Address, reason: &str) -> Result<(), PassportError> {
        self.access.require(Role::SignalResetter, caller)?;
        let entities = self.signal_group(user);
        let cleared = self.signals.reset_all(user, &entities);
        tracing::info!(user = %user, entities = entities.len(), cleared, reason, "signals reset");
        self.emit(PassportEvent::SignalsReset {
            user: user.clone(),
            reason: reason.to_string(),
            cleared,
        });
        Ok(())
    }

    /// `caller` (the app administrator) removes exactly `app`'s contribution
    /// to `user`'s aggregate, from the aggregate, per-app and app-total
    /// counters alike. The scope matches [`Passport::reset_signals`].
    pub fn reset_signals_for_app(
        &mut self,
        caller: &Address,
        app: AppId,
        user: &Address,
        reason: &str,
    ) -> Result<(), PassportError> {
        self.require_app_admin(caller, &app)?;
        let mut removed = self.signals.reset_for_app(app, user);
        for entity in self.signal_group(user) {
            removed = removed.saturating_add(self.signals.reset_for_app(app, &entity));
        }
        tracing::info!(user = %user, app = %app, removed, reason, "app signals reset");
        self.emit(PassportEvent::AppSignalsReset {
            user: user.clone(),
            app,
            reason: reason.to_string(),
            removed,
        });
        Ok(())
    }

    /// Aggregate count of `addr`: its own signals plus those of its Active
    /// entities. An entity has none, so its aggregate is its own count.
    pub fn signal_count(&self, addr: &Address) -> u64 {
        self.signals.aggregate(addr, &self.links.entities_of(addr))
    }

    /// Signals filed directly against `addr`.
    pub fn own_signal_count(&self, addr: &Address) -> u64 {
        self.signals.own_count(addr)
    }

    /// `app`'s signals against `addr`, summed over its Active entities the
    /// same way as [`Passport::signal_count`].
    pub fn app_signal_count(&self, app: &AppId, addr: &Address) -> u64 {
        self.signals
            .app_aggregate(app, addr, &self.links.entities_of(addr))
    }

    pub fn app_total_signal_count(&self, app: &AppId) -> u64 {
        self.signals.app_total(app)
    }

    pub fn signaler_app(&self, signaler: &Address) -> Option<AppId> {
        self.signals.signaler_app(signaler)
    }

    // ── Allow / deny lists ────────────────────────────────────────────────

    pub fn add_to_allow_list(&mut self, caller: &Address, addr: &Address) -> Result<(), PassportError> {
        self.add_to_list(caller, ListKind::Allow, addr)
    }

    pub fn remove_from_allow_list(&mut self, caller: &Address, addr: &Address) -> Result<(), PassportError> {
        self.remove_from_list(caller, ListKind::Allow, addr)
    }

    pub fn add_to_deny_list(&mut self, caller: &Address, addr: &Address) -> Result<(), PassportError> {
        self.add_to_list(caller, ListKind::Deny, addr)
    }

    pub fn remove_from_deny_list(&mut self, caller: &Address, addr: &Address) -> Result<(), PassportError> {
        self.remove_from_list(caller, ListKind::Deny, addr)
    }

    fn add_to_list(&mut self, caller: &Address, list: ListKind, addr: &Address) -> Result<(), PassportError> {
        self.access.require(Role::ListManager, caller)?;
        let now = self.now();
        let was_opposite = self.lists.is_listed(list.opposite(), addr);
        self.lists.add(list, addr, now)?;
        if was_opposite {
            self.emit(PassportEvent::Unlisted {
                list: list.opposite(),
                addr: addr.clone(),
            });
        }
        self.emit(PassportEvent::Listed {
            list,
            addr: addr.clone(),
        });
        Ok(())
    }

    fn remove_from_list(&mut self, caller: &Address, list: ListKind, addr: &Address) -> Result<(), PassportError> {
        self.access.require(Role::ListManager, caller)?;
        let now = self.now();
        let was_listed = self.lists.is_listed(list, addr);
        self.lists.remove(list, addr, now)?;
        if was_listed {
            self.emit(PassportEvent::Unlisted {
                list,
                addr: addr.clone(),
            });
        }
        Ok(())
    }

    pub fn is_allow_listed(&self, addr: &Address) -> bool {
        self.lists.is_listed(ListKind::Allow, addr)
    }

    pub fn is_deny_listed(&self, addr: &Address) -> bool {
        self.lists.is_listed(ListKind::Deny, addr)
    }

    pub fn passport_allow_listed(&self, addr: &Address) -> bool {
        self.passport_listed(ListKind::Allow, addr)
    }

    pub fn passport_deny_listed(&self, addr: &Address) -> bool {
        self.passport_listed(ListKind::Deny, addr)
    }

    pub fn passport_allow_listed_at(&self, addr: &Address, block: BlockNumber) -> bool {
        let passport = self.links.resolve_at(addr, block);
        self.passport_listed_at(ListKind::Allow, &passport, block)
    }

    pub fn passport_deny_listed_at(&self, addr: &Address, block: BlockNumber) -> bool {
        let passport = self.links.resolve_at(addr, block);
        self.passport_listed_at(ListKind::Deny, &passport, block)
    }

    fn passport_listed(&self, list: ListKind, addr: &Address) -> bool {
        let passport = self.links.resolve(addr);
        self.lists.passport_listed(
            list,
            &passport,
            &self.links.entities_of(&passport),
            self.params.current(threshold_key(list)),
        )
    }

    fn passport_listed_at(&self, list: ListKind, passport: &Address, block: BlockNumber) -> bool {
        self.lists.passport_listed_at(
            list,
            passport,
            &self.links.entities_of_at(passport, block),
            self.params.at(threshold_key(list), block),
            block,
        )
    }

    // ── Personhood ────────────────────────────────────────────────────────

    pub fn is_person(&self, addr: &Address) -> Personhood {
        self.is_person_at(addr, self.now())
    }

    /// Personhood of `addr` as of `block`.
    ///
    /// The address is first resolved to its passport. An Active delegatee is
    /// judged by its delegator's standing; a delegator that is not itself a
    /// delegatee has handed its personhood away. Both are single lookups.
    pub fn is_person_at(&self, addr: &Address, block: BlockNumber) -> Personhood {
        let resolved = self.links.resolve_at(addr, block);
        let (subject, delegated) = match self.delegations.delegator_of_at(&resolved, block) {
            Some(delegator) => (self.links.resolve_at(delegator, block), false),
            None => {
                let delegated = self.delegations.is_delegator_at(&resolved, block);
                (resolved, delegated)
            }
        };

        let decision = decide(
            delegated,
            |check| self.params.is_enabled_at(check, block),
            |check| self.check_fires(check, &subject, block),
        );
        tracing::debug!(addr = %addr, subject = %subject, block = %block, is_person = decision.is_person, reason = ?decision.reason, "personhood evaluated");
        decision
    }

    fn check_fires(&self, check: Check, subject: &Address, block: BlockNumber) -> bool {
        match check {
            Check::DenyList => self.passport_listed_at(ListKind::Deny, subject, block),
            Check::AllowList => self.passport_listed_at(ListKind::Allow, subject, block),
            Check::Signals => {
                let count = self
                    .signals
                    .aggregate(subject, &self.links.entities_of_at(subject, block));
                count >= self.params.at(ParamKey::SignalsThreshold, block)
            }
            Check::ParticipationScore => {
                let round = self.collaborators.rounds.round_at(block);
                self.cumulative_score_at(subject, round, block)
                    >= self.params.at(ParamKey::ParticipationScoreThreshold, block)
            }
            Check::MembershipLevel => {
                let level = self.collaborators.membership.level_of(subject);
                u64::from(level) >= self.params.at(ParamKey::MinimumMembershipLevel, block)
            }
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Serialize the whole ledger. Collaborators and pending events are not
    /// part of the snapshot.
    pub fn save_state(&self) -> Result<Vec<u8>, PassportError> {
        let snapshot = SnapshotRef {
            params: &self.params,
            links: &self.links,
            delegations: &self.delegations,
            consents: &self.consents,
            scores: &self.scores,
            signals: &self.signals,
            lists: &self.lists,
            access: &self.access,
        };
        bincode::serialize(&snapshot).map_err(|e| PassportError::Snapshot(e.to_string()))
    }

    /// Restore a ledger saved with [`Passport::save_state`].
    pub fn load_state(data: &[u8], collaborators: Collaborators) -> Result<Self, PassportError> {
        let snapshot: Snapshot =
            bincode::deserialize(data).map_err(|e| PassportError::Snapshot(e.to_string()))?;
        tracing::info!(bytes = data.len(), "passport ledger restored from snapshot");
        Ok(Self {
            params: snapshot.params,
            links: snapshot.links,
            delegations: snapshot.delegations,
            consents: snapshot.consents,
            scores: snapshot.scores,
            signals: snapshot.signals,
            lists: snapshot.lists,
            access: snapshot.access,
            collaborators,
            pending_events: Vec::new(),
        })
    }
}

fn threshold_key(list: ListKind) -> ParamKey {
    match list {
        ListKind::Allow => ParamKey::AllowListThresholdPercent,
        ListKind::Deny => ParamKey::DenyListThresholdPercent,
    }
}
