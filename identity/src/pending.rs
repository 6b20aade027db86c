//! Book of pending handshake requests.
//!
//! Each address has at most one outgoing request; a new request replaces the
//! previous one. Any number of requests may target the same address.

use passport_types::{Address, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub from: Address,
    pub to: Address,
    pub requested_at: BlockNumber,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PendingRequests {
    outgoing: HashMap<Address, PendingRequest>,
    incoming: HashMap<Address, BTreeSet<Address>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a request, returning the one it replaced.
    pub fn insert(
        &mut self,
        from: &Address,
        to: &Address,
        at: BlockNumber,
    ) -> Option<PendingRequest> {
        let replaced = self.remove(from);
        self.outgoing.insert(
            from.clone(),
            PendingRequest {
                from: from.clone(),
                to: to.clone(),
                requested_at: at,
            },
        );
        self.incoming
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        replaced
    }

    /// Remove the outgoing request of `from`, whatever its target.
    pub fn remove(&mut self, from: &Address) -> Option<PendingRequest> {
        let request = self.outgoing.remove(from)?;
        if let Some(set) = self.incoming.get_mut(&request.to) {
            set.remove(from);
            if set.is_empty() {
                self.incoming.remove(&request.to);
            }
        }
        Some(request)
    }

    pub fn is_pending(&self, from: &Address, to: &Address) -> bool {
        self.outgoing.get(from).is_some_and(|r| &r.to == to)
    }

    pub fn outgoing(&self, from: &Address) -> Option<&PendingRequest> {
        self.outgoing.get(from)
    }

    /// Requesters waiting on `to`, in address order.
    pub fn incoming(&self, to: &Address) -> Vec<&Address> {
        self.incoming
            .get(to)
            .map(|s| s.iter().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }
}
