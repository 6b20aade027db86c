//! Fundamental types for the passport personhood ledger.
//!
//! This crate defines the vocabulary shared by every other crate in the workspace:
//! addresses, block numbers, application ids, signing keys, the checkpointed
//! parameter keys with their defaults, and the narrow traits through which the
//! ledger consumes its external collaborators.

pub mod address;
pub mod app;
pub mod block;
pub mod error;
pub mod external;
pub mod keys;
pub mod params;

pub use address::Address;
pub use app::AppId;
pub use block::{BlockNumber, RoundId};
pub use error::TypeError;
pub use external::{AppRegistry, BlockClock, MembershipLevels, RoundClock};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use params::{Check, ParamKey, PassportParams, SecurityTier};
