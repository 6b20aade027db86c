//! Address roles, computed once per query from the two registries.

use crate::delegation::DelegationRegistry;
use crate::links::EntityLinks;
use passport_types::{Address, BlockNumber};
use serde::{Deserialize, Serialize};

/// Read-only view of the entity relation, used by the delegation registry to
/// enforce that entities neither delegate nor receive delegation.
pub trait RoleView {
    fn is_entity(&self, addr: &Address) -> bool;
    fn is_entity_at(&self, addr: &Address, block: BlockNumber) -> bool;
}

impl RoleView for EntityLinks {
    fn is_entity(&self, addr: &Address) -> bool {
        EntityLinks::is_entity(self, addr)
    }

    fn is_entity_at(&self, addr: &Address, block: BlockNumber) -> bool {
        EntityLinks::is_entity_at(self, addr, block)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressRole {
    /// Represents itself. The default.
    Passport,
    Entity { passport: Address },
    Delegator { delegatee: Address },
}

/// Entity wins over Delegator. The two only coexist when an address that had
/// already delegated is later linked, which entity linking does not prevent.
pub fn role_of(links: &EntityLinks, delegations: &DelegationRegistry, addr: &Address) -> AddressRole {
    if let Some(passport) = links.passport_of(addr) {
        return AddressRole::Entity {
            passport: passport.clone(),
        };
    }
    match delegations.delegatee_of(addr) {
        Some(delegatee) => AddressRole::Delegator {
            delegatee: delegatee.clone(),
        },
        None => AddressRole::Passport,
    }
}

pub fn role_of_at(
    links: &EntityLinks,
    delegations: &DelegationRegistry,
    addr: &Address,
    block: BlockNumber,
) -> AddressRole {
    if let Some(passport) = links.passport_of_at(addr, block) {
        return AddressRole::Entity {
            passport: passport.clone(),
        };
    }
    match delegations.delegatee_of_at(addr, block) {
        Some(delegatee) => AddressRole::Delegator {
            delegatee: delegatee.clone(),
        },
        None => AddressRole::Passport,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> Address {
        Address::new(format!("psp_{name}"))
    }

    #[test]
    fn roles_follow_registries_over_time() {
        let mut links = EntityLinks::new();
        let mut delegations = DelegationRegistry::new();
        let (a, p, d) = (acct("a"), acct("p"), acct("d"));

        assert_eq!(role_of(&links, &delegations, &a), AddressRole::Passport);

        delegations
            .request_delegation(&a, &d, &links, BlockNumber::new(1))
            .unwrap();
        delegations
            .accept_delegation(&d, &a, &links, BlockNumber::new(1))
            .unwrap();
        assert_eq!(
            role_of(&links, &delegations, &a),
            AddressRole::Delegator { delegatee: d.clone() }
        );

        links.request_link(&a, &p, BlockNumber::new(5)).unwrap();
        links.accept_link(&p, &a, 5, BlockNumber::new(5)).unwrap();
        assert_eq!(
            role_of(&links, &delegations, &a),
            AddressRole::Entity { passport: p.clone() }
        );
        assert_eq!(
            role_of_at(&links, &delegations, &a, BlockNumber::new(3)),
            AddressRole::Delegator { delegatee: d }
        );
        assert_eq!(
            role_of_at(&links, &delegations, &a, BlockNumber::new(0)),
            AddressRole::Passport
        );
    }
}
