//! Ledger access.
//!
//! The protocol core never talks to a chain directly. Everything that
//! reads or writes on-ledger state goes through [`Ledger`], passed in by
//! reference. "Not found" is `Ok(None)` or an empty list; errors are
//! reserved for rule violations and transport failures.

pub mod connection;
pub mod memory;

pub use connection::ConnectionCache;
pub use memory::InMemoryLedger;

use crate::attestation::Attestation;
use crate::crypto::H256;
use crate::delegation::DelegationNode;
use crate::error::Result;
use crate::identity::{Address, Identity};

/// Operations the protocol needs from a ledger.
///
/// Implementations must be safe to share across threads; independent
/// records may be written concurrently.
pub trait Ledger: Send + Sync {
    /// Owner of a registered CType.
    fn query_ctype(&self, ctype_hash: &H256) -> Result<Option<Address>>;

    fn submit_ctype(&self, ctype_hash: &H256, signer: &Identity) -> Result<()>;

    fn query_attestation(&self, claim_hash: &H256) -> Result<Option<Attestation>>;

    fn submit_attestation(&self, attestation: &Attestation, signer: &Identity) -> Result<()>;

    /// `max_depth` bounds how far above the attestation's delegation node
    /// the signer's ownership is searched.
    fn revoke_attestation(&self, claim_hash: &H256, signer: &Identity, max_depth: u32)
        -> Result<()>;

    fn query_delegation_root(&self, id: &H256) -> Result<Option<DelegationNode>>;

    fn query_delegation_node(&self, id: &H256) -> Result<Option<DelegationNode>>;

    /// Ids of the direct children of a root or node.
    fn query_child_ids(&self, id: &H256) -> Result<Vec<H256>>;

    fn submit_delegation_root(&self, root: &DelegationNode, signer: &Identity) -> Result<()>;

    /// `invitee_signature` is the delegate's signature over the node's
    /// generated hash.
    fn submit_delegation_node(
        &self,
        node: &DelegationNode,
        signer: &Identity,
        invitee_signature: &str,
    ) -> Result<()>;

    fn revoke_delegation_root(&self, id: &H256, signer: &Identity) -> Result<()>;

    fn revoke_delegation_node(&self, id: &H256, signer: &Identity, max_depth: u32) -> Result<()>;
}
