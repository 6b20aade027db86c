//! Identity graph of the passport ledger.
//!
//! Two relations decide who an address "really" is:
//!
//! - **Entity links** (many entities → one passport): an entity's score, signals
//!   and list status roll up into its passport.
//! - **Delegation** (one delegator → one delegatee): the delegator hands its
//!   personhood to the delegatee.
//!
//! Both are created by a request/accept handshake or atomically from a signed
//! offline consent, removed explicitly, and checkpointed by block so historical
//! queries stay exact after later changes.

pub mod consent;
pub mod delegation;
pub mod error;
pub mod links;
pub mod pending;
pub mod role;

pub use consent::ConsentBook;
pub use delegation::DelegationRegistry;
pub use error::IdentityError;
pub use links::EntityLinks;
pub use pending::{PendingRequest, PendingRequests};
pub use role::{role_of, role_of_at, AddressRole, RoleView};
