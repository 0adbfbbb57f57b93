//! Delegation hierarchies: scoped attest/delegate rights below a root.

pub mod node;
pub mod permissions;

pub use node::{DelegationKind, DelegationNode};
pub use permissions::Permissions;
