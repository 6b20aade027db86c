//! Entity → passport link registry.
//!
//! Many entities may link to one passport (up to the checkpointed cap), and
//! links are one hop deep: a passport is never itself an entity. Every link and
//! unlink is checkpointed per entity, so `passport_of_at` stays exact after the
//! link is later removed.

use crate::consent::ConsentBook;
use crate::error::IdentityError;
use crate::pending::{PendingRequest, PendingRequests};
use passport_checkpoints::Trace;
use passport_crypto::ConsentKind;
use passport_types::{Address, BlockNumber, Signature};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityLinks {
    requests: PendingRequests,
    /// entity → linked passport over time.
    passport_of: HashMap<Address, Trace<Option<Address>>>,
    /// passport → currently active entities.
    entities: HashMap<Address, BTreeSet<Address>>,
    /// passport → every entity ever linked (for historical entity sets).
    ever_linked: HashMap<Address, BTreeSet<Address>>,
}

impl EntityLinks {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Handshake ─────────────────────────────────────────────────────────

    /// Entity asks `passport` to accept it. Replaces any earlier outgoing
    /// request of the entity, which is returned.
    pub fn request_link(
        &mut self,
        entity: &Address,
        passport: &Address,
        now: BlockNumber,
    ) -> Result<Option<PendingRequest>, IdentityError> {
        self.ensure_linkable(entity, passport)?;
        let replaced = self.requests.insert(entity, passport, now);
        tracing::info!(entity = %entity, passport = %passport, block = %now, "link requested");
        Ok(replaced)
    }

    /// Passport accepts the pending request of `entity`.
    pub fn accept_link(
        &mut self,
        passport: &Address,
        entity: &Address,
        max_entities: u64,
        now: BlockNumber,
    ) -> Result<(), IdentityError> {
        if !self.requests.is_pending(entity, passport) {
            return Err(IdentityError::NotLinked(entity.clone()));
        }
        self.ensure_linkable(entity, passport)?;
        self.ensure_capacity(passport, max_entities)?;
        self.ensure_checkpoint_order(entity, now)?;

        self.requests.remove(entity);
        self.activate(entity, passport, now);
        tracing::info!(entity = %entity, passport = %passport, block = %now, "link accepted");
        Ok(())
    }

    /// Passport refuses the pending request of `entity`.
    pub fn deny_incoming(
        &mut self,
        passport: &Address,
        entity: &Address,
    ) -> Result<PendingRequest, IdentityError> {
        if !self.requests.is_pending(entity, passport) {
            return Err(IdentityError::NotLinked(entity.clone()));
        }
        let request = self
            .requests
            .remove(entity)
            .ok_or_else(|| IdentityError::NotLinked(entity.clone()))?;
        tracing::info!(entity = %entity, passport = %passport, "link request denied");
        Ok(request)
    }

    /// Entity withdraws its outgoing request.
    pub fn cancel_outgoing(&mut self, entity: &Address) -> Result<PendingRequest, IdentityError> {
        let request = self
            .requests
            .remove(entity)
            .ok_or_else(|| IdentityError::NotLinked(entity.clone()))?;
        tracing::info!(entity = %entity, passport = %request.to, "link request cancelled");
        Ok(request)
    }

    // ── Signed path ───────────────────────────────────────────────────────

    /// Passport submits the entity's signed consent and the link becomes
    /// active at once, bypassing the handshake.
    #[allow(clippy::too_many_arguments)]
    pub fn direct_link(
        &mut self,
        passport: &Address,
        entity: &Address,
        deadline: BlockNumber,
        signature: &Signature,
        max_entities: u64,
        consents: &mut ConsentBook,
        now: BlockNumber,
    ) -> Result<(), IdentityError> {
        consents.check(
            ConsentKind::LinkEntity,
            entity,
            passport,
            deadline,
            signature,
            now,
        )?;
        self.ensure_linkable(entity, passport)?;
        self.ensure_capacity(passport, max_entities)?;
        self.ensure_checkpoint_order(entity, now)?;

        consents.consume(entity);
        self.requests.remove(entity);
        self.activate(entity, passport, now);
        tracing::info!(entity = %entity, passport = %passport, block = %now, "link created from signed consent");
        Ok(())
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Remove the active link of `entity`. Either party may call. Returns the
    /// passport the entity was detached from.
    pub fn unlink(
        &mut self,
        caller: &Address,
        entity: &Address,
        now: BlockNumber,
    ) -> Result<Address, IdentityError> {
        let passport = self
            .passport_of(entity)
            .cloned()
            .ok_or_else(|| IdentityError::NotLinked(entity.clone()))?;
        if caller != entity && caller != &passport {
            return Err(IdentityError::Unauthorized {
                caller: caller.clone(),
            });
        }
        self.ensure_checkpoint_order(entity, now)?;

        self.passport_of
            .entry(entity.clone())
            .or_default()
            .push(now, None)?;
        if let Some(set) = self.entities.get_mut(&passport) {
            set.remove(entity);
            if set.is_empty() {
                self.entities.remove(&passport);
            }
        }
        tracing::info!(entity = %entity, passport = %passport, block = %now, "link removed");
        Ok(passport)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn passport_of(&self, entity: &Address) -> Option<&Address> {
        self.passport_of
            .get(entity)
            .and_then(|t| t.latest())
            .and_then(|p| p.as_ref())
    }

    pub fn passport_of_at(&self, entity: &Address, block: BlockNumber) -> Option<&Address> {
        self.passport_of
            .get(entity)
            .and_then(|t| t.at(block))
            .and_then(|p| p.as_ref())
    }

    pub fn is_entity(&self, addr: &Address) -> bool {
        self.passport_of(addr).is_some()
    }

    pub fn is_entity_at(&self, addr: &Address, block: BlockNumber) -> bool {
        self.passport_of_at(addr, block).is_some()
    }

    /// An address with at least one active entity.
    pub fn has_entities(&self, addr: &Address) -> bool {
        self.entities.get(addr).is_some_and(|s| !s.is_empty())
    }

    /// The passport that speaks for `addr`: its linked passport, or itself.
    pub fn resolve(&self, addr: &Address) -> Address {
        self.passport_of(addr).unwrap_or(addr).clone()
    }

    pub fn resolve_at(&self, addr: &Address, block: BlockNumber) -> Address {
        self.passport_of_at(addr, block).unwrap_or(addr).clone()
    }

    /// Active entities of `passport`, in address order.
    pub fn entities_of(&self, passport: &Address) -> Vec<Address> {
        self.entities
            .get(passport)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Entities linked to `passport` at `block`.
    pub fn entities_of_at(&self, passport: &Address, block: BlockNumber) -> Vec<Address> {
        self.ever_linked
            .get(passport)
            .map(|all| {
                all.iter()
                    .filter(|e| self.passport_of_at(e, block) == Some(passport))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn entity_count(&self, passport: &Address) -> u64 {
        self.entities.get(passport).map_or(0, |s| s.len() as u64)
    }

    pub fn pending_outgoing(&self, entity: &Address) -> Option<&PendingRequest> {
        self.requests.outgoing(entity)
    }

    pub fn pending_incoming(&self, passport: &Address) -> Vec<&Address> {
        self.requests.incoming(passport)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn ensure_linkable(&self, entity: &Address, passport: &Address) -> Result<(), IdentityError> {
        if entity == passport {
            return Err(IdentityError::SelfLink(entity.clone()));
        }
        if let Some(current) = self.passport_of(entity) {
            return Err(IdentityError::AlreadyLinked {
                entity: entity.clone(),
                passport: current.clone(),
            });
        }
        if self.is_entity(passport) {
            return Err(IdentityError::NestedLink(passport.clone()));
        }
        if self.has_entities(entity) {
            return Err(IdentityError::NestedLink(entity.clone()));
        }
        Ok(())
    }

    fn ensure_capacity(&self, passport: &Address, max_entities: u64) -> Result<(), IdentityError> {
        if self.entity_count(passport) >= max_entities {
            return Err(IdentityError::CapacityExceeded {
                target: passport.clone(),
                cap: max_entities,
            });
        }
        Ok(())
    }

    /// Reject writes older than the entity's latest checkpoint up front so
    /// the later `push` cannot fail halfway through a mutation.
    fn ensure_checkpoint_order(
        &self,
        entity: &Address,
        now: BlockNumber,
    ) -> Result<(), IdentityError> {
        match self.passport_of.get(entity).and_then(|t| t.latest_block()) {
            Some(last) if now < last => Err(passport_checkpoints::CheckpointError::OutOfOrder {
                last,
                attempted: now,
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn activate(&mut self, entity: &Address, passport: &Address, now: BlockNumber) {
        // Order was verified by `ensure_checkpoint_order`.
        let _ = self
            .passport_of
            .entry(entity.clone())
            .or_default()
            .push(now, Some(passport.clone()));
        self.entities
            .entry(passport.clone())
            .or_default()
            .insert(entity.clone());
        self.ever_linked
            .entry(passport.clone())
            .or_default()
            .insert(entity.clone());
    }
}
