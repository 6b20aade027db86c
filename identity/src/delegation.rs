//! One-to-one personhood delegation.
//!
//! A delegator hands its personhood to exactly one delegatee, and a delegatee
//! holds at most one delegator. Chains (A→B while B→C) are allowed; nothing
//! here walks them, so cycles are harmless. Entities can neither delegate nor
//! receive delegation.

use crate::consent::ConsentBook;
use crate::error::IdentityError;
use crate::pending::{PendingRequest, PendingRequests};
use crate::role::RoleView;
use passport_checkpoints::{CheckpointError, Trace};
use passport_crypto::ConsentKind;
use passport_types::{Address, BlockNumber, Signature};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationRegistry {
    requests: PendingRequests,
    /// delegator → delegatee over time.
    delegatee_of: HashMap<Address, Trace<Option<Address>>>,
    /// delegatee → delegator over time.
    delegator_of: HashMap<Address, Trace<Option<Address>>>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delegator asks `delegatee` to take its personhood. An Active delegation
    /// of the delegator is removed first; its former delegatee is returned.
    pub fn request_delegation<R: RoleView>(
        &mut self,
        delegator: &Address,
        delegatee: &Address,
        roles: &R,
        now: BlockNumber,
    ) -> Result<Option<Address>, IdentityError> {
        self.ensure_delegable(delegator, delegatee, roles)?;
        self.ensure_order_for_removal(delegator, now)?;

        let revoked = self.remove_active(delegator, now);
        self.requests.insert(delegator, delegatee, now);
        tracing::info!(delegator = %delegator, delegatee = %delegatee, block = %now, "delegation requested");
        Ok(revoked)
    }

    /// Delegatee accepts the pending request of `delegator`.
    pub fn accept_delegation<R: RoleView>(
        &mut self,
        delegatee: &Address,
        delegator: &Address,
        roles: &R,
        now: BlockNumber,
    ) -> Result<Option<Address>, IdentityError> {
        if !self.requests.is_pending(delegator, delegatee) {
            return Err(IdentityError::NotDelegated(delegator.clone()));
        }
        self.ensure_delegable(delegator, delegatee, roles)?;
        self.ensure_capacity(delegator, delegatee)?;
        self.ensure_order_for_activation(delegator, delegatee, now)?;

        self.requests.remove(delegator);
        let revoked = self.remove_active(delegator, now);
        self.activate(delegator, delegatee, now);
        tracing::info!(delegator = %delegator, delegatee = %delegatee, block = %now, "delegation accepted");
        Ok(revoked)
    }

    pub fn deny_incoming(
        &mut self,
        delegatee: &Address,
        delegator: &Address,
    ) -> Result<PendingRequest, IdentityError> {
        if !self.requests.is_pending(delegator, delegatee) {
            return Err(IdentityError::NotDelegated(delegator.clone()));
        }
        let request = self
            .requests
            .remove(delegator)
            .ok_or_else(|| IdentityError::NotDelegated(delegator.clone()))?;
        tracing::info!(delegator = %delegator, delegatee = %delegatee, "delegation request denied");
        Ok(request)
    }

    pub fn cancel_outgoing(&mut self, delegator: &Address) -> Result<PendingRequest, IdentityError> {
        let request = self
            .requests
            .remove(delegator)
            .ok_or_else(|| IdentityError::NotDelegated(delegator.clone()))?;
        tracing::info!(delegator = %delegator, delegatee = %request.to, "delegation request cancelled");
        Ok(request)
    }

    /// Delegatee submits the delegator's signed consent; the delegation is
    /// Active at once. Returns the delegator's former delegatee, if any.
    #[allow(clippy::too_many_arguments)]
    pub fn delegate_with_signature<R: RoleView>(
        &mut self,
        delegatee: &Address,
        delegator: &Address,
        deadline: BlockNumber,
        signature: &Signature,
        roles: &R,
        consents: &mut ConsentBook,
        now: BlockNumber,
    ) -> Result<Option<Address>, IdentityError> {
        consents.check(
            ConsentKind::Delegation,
            delegator,
            delegatee,
            deadline,
            signature,
            now,
        )?;
        self.ensure_delegable(delegator, delegatee, roles)?;
        self.ensure_capacity(delegator, delegatee)?;
        self.ensure_order_for_activation(delegator, delegatee, now)?;

        consents.consume(delegator);
        self.requests.remove(delegator);
        let revoked = self.remove_active(delegator, now);
        self.activate(delegator, delegatee, now);
        tracing::info!(delegator = %delegator, delegatee = %delegatee, block = %now, "delegation created from signed consent");
        Ok(revoked)
    }

    /// Remove the delegation `caller` takes part in and return
    /// `(delegator, delegatee)`. A caller that is both a delegator and a
    /// delegatee revokes its own outgoing delegation.
    pub fn revoke(
        &mut self,
        caller: &Address,
        now: BlockNumber,
    ) -> Result<(Address, Address), IdentityError> {
        let (delegator, delegatee) = if let Some(to) = self.delegatee_of(caller) {
            (caller.clone(), to.clone())
        } else if let Some(from) = self.delegator_of(caller) {
            (from.clone(), caller.clone())
        } else {
            return Err(IdentityError::NotDelegated(caller.clone()));
        };
        self.ensure_order_for_removal(&delegator, now)?;

        self.remove_active(&delegator, now);
        tracing::info!(delegator = %delegator, delegatee = %delegatee, block = %now, "delegation revoked");
        Ok((delegator, delegatee))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn delegatee_of(&self, delegator: &Address) -> Option<&Address> {
        latest(&self.delegatee_of, delegator)
    }

    pub fn delegatee_of_at(&self, delegator: &Address, block: BlockNumber) -> Option<&Address> {
        at(&self.delegatee_of, delegator, block)
    }

    pub fn delegator_of(&self, delegatee: &Address) -> Option<&Address> {
        latest(&self.delegator_of, delegatee)
    }

    pub fn delegator_of_at(&self, delegatee: &Address, block: BlockNumber) -> Option<&Address> {
        at(&self.delegator_of, delegatee, block)
    }

    pub fn is_delegator(&self, addr: &Address) -> bool {
        self.delegatee_of(addr).is_some()
    }

    pub fn is_delegator_at(&self, addr: &Address, block: BlockNumber) -> bool {
        self.delegatee_of_at(addr, block).is_some()
    }

    pub fn is_delegatee(&self, addr: &Address) -> bool {
        self.delegator_of(addr).is_some()
    }

    pub fn is_delegatee_at(&self, addr: &Address, block: BlockNumber) -> bool {
        self.delegator_of_at(addr, block).is_some()
    }

    pub fn pending_outgoing(&self, delegator: &Address) -> Option<&PendingRequest> {
        self.requests.outgoing(delegator)
    }

    pub fn pending_incoming(&self, delegatee: &Address) -> Vec<&Address> {
        self.requests.incoming(delegatee)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn ensure_delegable<R: RoleView>(
        &self,
        delegator: &Address,
        delegatee: &Address,
        roles: &R,
    ) -> Result<(), IdentityError> {
        if delegator == delegatee {
            return Err(IdentityError::SelfDelegation(delegator.clone()));
        }
        if roles.is_entity(delegator) {
            return Err(IdentityError::FromEntity(delegator.clone()));
        }
        if roles.is_entity(delegatee) {
            return Err(IdentityError::ToEntity(delegatee.clone()));
        }
        Ok(())
    }

    fn ensure_capacity(&self, delegator: &Address, delegatee: &Address) -> Result<(), IdentityError> {
        match self.delegator_of(delegatee) {
            Some(current) if current != delegator => Err(IdentityError::CapacityExceeded {
                target: delegatee.clone(),
                cap: 1,
            }),
            _ => Ok(()),
        }
    }

    /// Every trace a removal of the delegator's Active delegation touches.
    fn ensure_order_for_removal(
        &self,
        delegator: &Address,
        now: BlockNumber,
    ) -> Result<(), CheckpointError> {
        ensure_order(&self.delegatee_of, delegator, now)?;
        if let Some(old) = self.delegatee_of(delegator) {
            ensure_order(&self.delegator_of, old, now)?;
        }
        Ok(())
    }

    fn ensure_order_for_activation(
        &self,
        delegator: &Address,
        delegatee: &Address,
        now: BlockNumber,
    ) -> Result<(), CheckpointError> {
        self.ensure_order_for_removal(delegator, now)?;
        ensure_order(&self.delegator_of, delegatee, now)
    }

    /// Clear the Active delegation of `delegator`, returning its delegatee.
    /// Callers have checked checkpoint order.
    fn remove_active(&mut self, delegator: &Address, now: BlockNumber) -> Option<Address> {
        let delegatee = self.delegatee_of(delegator)?.clone();
        let _ = self
            .delegatee_of
            .entry(delegator.clone())
            .or_default()
            .push(now, None);
        let _ = self
            .delegator_of
            .entry(delegatee.clone())
            .or_default()
            .push(now, None);
        Some(delegatee)
    }

    fn activate(&mut self, delegator: &Address, delegatee: &Address, now: BlockNumber) {
        let _ = self
            .delegatee_of
            .entry(delegator.clone())
            .or_default()
            .push(now, Some(delegatee.clone()));
        let _ = self
            .delegator_of
            .entry(delegatee.clone())
            .or_default()
            .push(now, Some(delegator.clone()));
    }
}

fn latest<'a>(
    traces: &'a HashMap<Address, Trace<Option<Address>>>,
    key: &Address,
) -> Option<&'a Address> {
    traces.get(key).and_then(|t| t.latest()).and_then(|v| v.as_ref())
}

fn at<'a>(
    traces: &'a HashMap<Address, Trace<Option<Address>>>,
    key: &Address,
    block: BlockNumber,
) -> Option<&'a Address> {
    traces.get(key).and_then(|t| t.at(block)).and_then(|v| v.as_ref())
}

fn ensure_order(
    traces: &HashMap<Address, Trace<Option<Address>>>,
    key: &Address,
    now: BlockNumber,
) -> Result<(), CheckpointError> {
    match traces.get(key).and_then(|t| t.latest_block()) {
        Some(last) if now < last => Err(CheckpointError::OutOfOrder {
            last,
            attempted: now,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::EntityLinks;
    use passport_crypto::{derive_address, keypair_from_seed, sign_consent};

    fn acct(name: &str) -> Address {
        Address::new(format!("psp_{name}"))
    }

    fn b(n: u64) -> BlockNumber {
        BlockNumber::new(n)
    }

    fn delegated(
        reg: &mut DelegationRegistry,
        links: &EntityLinks,
        from: &Address,
        to: &Address,
        at: u64,
    ) {
        reg.request_delegation(from, to, links, b(at)).unwrap();
        reg.accept_delegation(to, from, links, b(at)).unwrap();
    }

    #[test]
    fn handshake_creates_delegation() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, b_) = (acct("alice"), acct("bob"));

        reg.request_delegation(&a, &b_, &links, b(1)).unwrap();
        assert!(!reg.is_delegator(&a));
        assert_eq!(reg.pending_incoming(&b_), vec![&a]);

        reg.accept_delegation(&b_, &a, &links, b(2)).unwrap();
        assert_eq!(reg.delegatee_of(&a), Some(&b_));
        assert_eq!(reg.delegator_of(&b_), Some(&a));
        assert!(reg.is_delegator(&a));
        assert!(reg.is_delegatee(&b_));
        assert!(reg.pending_outgoing(&a).is_none());
    }

    #[test]
    fn self_delegation_rejected() {
        let mut reg = DelegationRegistry::new();
        let a = acct("alice");
        assert_eq!(
            reg.request_delegation(&a, &a, &EntityLinks::new(), b(1)),
            Err(IdentityError::SelfDelegation(a.clone()))
        );
    }

    #[test]
    fn entities_cannot_delegate_or_receive() {
        let mut reg = DelegationRegistry::new();
        let mut links = EntityLinks::new();
        let (e, p, x) = (acct("e"), acct("p"), acct("x"));
        links.request_link(&e, &p, b(1)).unwrap();
        links.accept_link(&p, &e, 5, b(1)).unwrap();

        assert_eq!(
            reg.request_delegation(&e, &x, &links, b(2)),
            Err(IdentityError::FromEntity(e.clone()))
        );
        assert_eq!(
            reg.request_delegation(&x, &e, &links, b(2)),
            Err(IdentityError::ToEntity(e.clone()))
        );
    }

    #[test]
    fn role_change_between_request_and_accept_is_caught() {
        let mut reg = DelegationRegistry::new();
        let mut links = EntityLinks::new();
        let (a, d, p) = (acct("a"), acct("d"), acct("p"));
        reg.request_delegation(&a, &d, &links, b(1)).unwrap();

        links.request_link(&d, &p, b(2)).unwrap();
        links.accept_link(&p, &d, 5, b(2)).unwrap();
        assert_eq!(
            reg.accept_delegation(&d, &a, &links, b(3)),
            Err(IdentityError::ToEntity(d.clone()))
        );
    }

    #[test]
    fn delegatee_holds_one_delegator() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, c, d) = (acct("a"), acct("c"), acct("d"));
        delegated(&mut reg, &links, &a, &d, 1);

        reg.request_delegation(&c, &d, &links, b(2)).unwrap();
        assert_eq!(
            reg.accept_delegation(&d, &c, &links, b(2)),
            Err(IdentityError::CapacityExceeded {
                target: d.clone(),
                cap: 1
            })
        );
        reg.revoke(&a, b(3)).unwrap();
        reg.accept_delegation(&d, &c, &links, b(4)).unwrap();
        assert_eq!(reg.delegator_of(&d), Some(&c));
    }

    #[test]
    fn redelegating_removes_old_active_delegation() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, d1, d2) = (acct("a"), acct("d1"), acct("d2"));
        delegated(&mut reg, &links, &a, &d1, 1);

        let revoked = reg.request_delegation(&a, &d2, &links, b(5)).unwrap();
        assert_eq!(revoked, Some(d1.clone()));
        assert!(!reg.is_delegator(&a));
        assert!(!reg.is_delegatee(&d1));
        assert!(reg.is_delegatee_at(&d1, b(4)));

        reg.accept_delegation(&d2, &a, &links, b(6)).unwrap();
        assert_eq!(reg.delegatee_of(&a), Some(&d2));
    }

    #[test]
    fn chains_and_cycles_are_permitted() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, bb, c) = (acct("a"), acct("b"), acct("c"));
        delegated(&mut reg, &links, &a, &bb, 1);
        delegated(&mut reg, &links, &bb, &c, 2);
        delegated(&mut reg, &links, &c, &a, 3);

        for addr in [&a, &bb, &c] {
            assert!(reg.is_delegator(addr));
            assert!(reg.is_delegatee(addr));
        }
    }

    #[test]
    fn revoke_by_either_party() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, d, x) = (acct("a"), acct("d"), acct("x"));
        delegated(&mut reg, &links, &a, &d, 1);

        assert_eq!(reg.revoke(&x, b(2)), Err(IdentityError::NotDelegated(x.clone())));
        assert_eq!(reg.revoke(&d, b(2)).unwrap(), (a.clone(), d.clone()));
        assert_eq!(reg.revoke(&a, b(3)), Err(IdentityError::NotDelegated(a.clone())));

        delegated(&mut reg, &links, &a, &d, 4);
        assert_eq!(reg.revoke(&a, b(5)).unwrap(), (a.clone(), d.clone()));
        assert!(reg.is_delegator_at(&a, b(4)));
        assert!(!reg.is_delegator_at(&a, b(5)));
    }

    #[test]
    fn revoke_prefers_outgoing_when_both() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, bb, c) = (acct("a"), acct("b"), acct("c"));
        delegated(&mut reg, &links, &a, &bb, 1);
        delegated(&mut reg, &links, &bb, &c, 1);

        assert_eq!(reg.revoke(&bb, b(2)).unwrap(), (bb.clone(), c.clone()));
        assert!(reg.is_delegatee(&bb));
    }

    #[test]
    fn deny_and_cancel_pending() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let (a, d, x) = (acct("a"), acct("d"), acct("x"));
        reg.request_delegation(&a, &d, &links, b(1)).unwrap();

        assert!(reg.deny_incoming(&x, &a).is_err());
        reg.deny_incoming(&d, &a).unwrap();
        assert!(reg.accept_delegation(&d, &a, &links, b(2)).is_err());

        reg.request_delegation(&a, &d, &links, b(3)).unwrap();
        reg.cancel_outgoing(&a).unwrap();
        assert!(reg.pending_incoming(&d).is_empty());
    }

    #[test]
    fn signed_delegation() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let mut consents = ConsentBook::default();
        let kp = keypair_from_seed(&[31u8; 32]);
        let delegator = derive_address(&kp.public);
        let delegatee = acct("d");

        let consent =
            consents.expected_consent(ConsentKind::Delegation, &delegator, &delegatee, b(20));
        let sig = sign_consent(&consent, consents.domain(), &kp.private);

        assert!(matches!(
            reg.delegate_with_signature(&delegatee, &delegator, b(20), &sig, &links, &mut consents, b(21)),
            Err(IdentityError::SignatureExpired { .. })
        ));
        reg.delegate_with_signature(&delegatee, &delegator, b(20), &sig, &links, &mut consents, b(10))
            .unwrap();
        assert_eq!(reg.delegatee_of(&delegator), Some(&delegatee));
        assert_eq!(consents.nonce(&delegator), 1);
    }

    #[test]
    fn link_consent_does_not_authorize_delegation() {
        let mut reg = DelegationRegistry::new();
        let links = EntityLinks::new();
        let mut consents = ConsentBook::default();
        let kp = keypair_from_seed(&[32u8; 32]);
        let delegator = derive_address(&kp.public);
        let delegatee = acct("d");

        let consent =
            consents.expected_consent(ConsentKind::LinkEntity, &delegator, &delegatee, b(20));
        let sig = sign_consent(&consent, consents.domain(), &kp.private);
        assert!(matches!(
            reg.delegate_with_signature(&delegatee, &delegator, b(20), &sig, &links, &mut consents, b(1)),
            Err(IdentityError::InvalidSignature { .. })
        ));
    }
}
