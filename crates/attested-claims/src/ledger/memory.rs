//! In-memory ledger.
//!
//! Enforces the same rules a chain would: CTypes register once,
//! attestations are unique per claim hash, delegated attestations and
//! revocations are checked against the delegation hierarchy, and revoking
//! a delegation node revokes its whole subtree without removing it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::attestation::Attestation;
use crate::crypto::{signing, H256};
use crate::delegation::{DelegationKind, DelegationNode, Permissions};
use crate::error::{ClaimsError, Result};
use crate::identity::{Address, Identity};

use super::Ledger;

#[derive(Default)]
struct LedgerState {
    ctypes: HashMap<H256, Address>,
    attestations: HashMap<H256, Attestation>,
    roots: HashMap<H256, DelegationNode>,
    nodes: HashMap<H256, DelegationNode>,
    children: HashMap<H256, Vec<H256>>,
}

impl LedgerState {
    fn lookup(&self, id: &H256) -> Option<&DelegationNode> {
        self.nodes.get(id).or_else(|| self.roots.get(id))
    }

    /// Whether `address` owns `start` or an ancestor at most `max_depth`
    /// steps above it.
    fn owns_within(&self, start: &H256, address: &Address, max_depth: u32) -> bool {
        let mut current = self.lookup(start);
        for _ in 0..=max_depth {
            let Some(node) = current else {
                return false;
            };
            if node.account == *address {
                return true;
            }
            current = match node.parent_id() {
                Some(parent) => self.lookup(&parent),
                None => return false,
            };
        }
        false
    }

    fn revoke_subtree(&mut self, id: &H256) {
        let mut pending = vec![*id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.revoked = true;
            } else if let Some(root) = self.roots.get_mut(&id) {
                root.revoked = true;
            }
            if let Some(children) = self.children.get(&id) {
                pending.extend(children.iter().copied());
            }
        }
    }

    fn check_delegated_attestation(
        &self,
        attestation: &Attestation,
        delegation_id: &H256,
    ) -> Result<()> {
        let node = self
            .lookup(delegation_id)
            .ok_or_else(|| ClaimsError::DelegationNotFound(delegation_id.to_hex()))?;
        if node.account != attestation.owner {
            return Err(ClaimsError::NotPermitted(format!(
                "{} does not own delegation {delegation_id}",
                attestation.owner
            )));
        }
        if !node.permissions().contains(Permissions::ATTEST) {
            return Err(ClaimsError::NotPermitted(format!(
                "delegation {delegation_id} lacks the attest permission"
            )));
        }
        if node.revoked {
            return Err(ClaimsError::DelegationRevoked(delegation_id.to_hex()));
        }
        let root = self
            .roots
            .get(&node.root_id())
            .ok_or_else(|| ClaimsError::DelegationNotFound(node.root_id().to_hex()))?;
        match &root.kind {
            DelegationKind::Root { ctype_hash } if *ctype_hash == attestation.ctype_hash => Ok(()),
            _ => Err(ClaimsError::NotPermitted(format!(
                "delegation {delegation_id} is not for ctype {}",
                attestation.ctype_hash
            ))),
        }
    }
}

/// A thread-safe ledger held in process memory.
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

fn lock_state(mutex: &Mutex<LedgerState>) -> Result<MutexGuard<'_, LedgerState>> {
    mutex
        .lock()
        .map_err(|e| ClaimsError::Ledger(format!("lock poisoned: {e}")))
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Number of attestations recorded, revoked or not.
    pub fn attestation_count(&self) -> usize {
        lock_state(&self.state)
            .map(|s| s.attestations.len())
            .unwrap_or(0)
    }

    /// Number of delegation roots and nodes recorded.
    pub fn delegation_count(&self) -> usize {
        lock_state(&self.state)
            .map(|s| s.roots.len() + s.nodes.len())
            .unwrap_or(0)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for InMemoryLedger {
    fn query_ctype(&self, ctype_hash: &H256) -> Result<Option<Address>> {
        Ok(lock_state(&self.state)?.ctypes.get(ctype_hash).cloned())
    }

    fn submit_ctype(&self, ctype_hash: &H256, signer: &Identity) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        if state.ctypes.contains_key(ctype_hash) {
            return Err(ClaimsError::CTypeAlreadyExists(ctype_hash.to_hex()));
        }
        state.ctypes.insert(*ctype_hash, signer.address());
        Ok(())
    }

    fn query_attestation(&self, claim_hash: &H256) -> Result<Option<Attestation>> {
        Ok(lock_state(&self.state)?.attestations.get(claim_hash).cloned())
    }

    fn submit_attestation(&self, attestation: &Attestation, signer: &Identity) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        if attestation.owner != signer.address() {
            return Err(ClaimsError::NotPermitted(format!(
                "{} cannot submit an attestation owned by {}",
                signer.address(),
                attestation.owner
            )));
        }
        if !state.ctypes.contains_key(&attestation.ctype_hash) {
            return Err(ClaimsError::SchemaNotFound(attestation.ctype_hash.to_hex()));
        }
        if state.attestations.contains_key(&attestation.claim_hash) {
            return Err(ClaimsError::DuplicateAttestation(
                attestation.claim_hash.to_hex(),
            ));
        }
        if let Some(delegation_id) = &attestation.delegation_id {
            state.check_delegated_attestation(attestation, delegation_id)?;
        }
        let mut record = attestation.clone();
        record.revoked = false;
        state.attestations.insert(record.claim_hash, record);
        log::debug!("ledger: attestation {} recorded", attestation.claim_hash);
        Ok(())
    }

    fn revoke_attestation(
        &self,
        claim_hash: &H256,
        signer: &Identity,
        max_depth: u32,
    ) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        let record = state
            .attestations
            .get(claim_hash)
            .ok_or_else(|| ClaimsError::AttestationNotFound(claim_hash.to_hex()))?;
        if record.revoked {
            return Err(ClaimsError::AlreadyRevoked(claim_hash.to_hex()));
        }
        let address = signer.address();
        let permitted = record.owner == address
            || record
                .delegation_id
                .is_some_and(|id| state.owns_within(&id, &address, max_depth));
        if !permitted {
            return Err(ClaimsError::NotPermitted(format!(
                "{address} may not revoke attestation {claim_hash}"
            )));
        }
        if let Some(record) = state.attestations.get_mut(claim_hash) {
            record.revoked = true;
        }
        log::debug!("ledger: attestation {claim_hash} revoked");
        Ok(())
    }

    fn query_delegation_root(&self, id: &H256) -> Result<Option<DelegationNode>> {
        Ok(lock_state(&self.state)?.roots.get(id).cloned())
    }

    fn query_delegation_node(&self, id: &H256) -> Result<Option<DelegationNode>> {
        Ok(lock_state(&self.state)?.nodes.get(id).cloned())
    }

    fn query_child_ids(&self, id: &H256) -> Result<Vec<H256>> {
        Ok(lock_state(&self.state)?
            .children
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    fn submit_delegation_root(&self, root: &DelegationNode, signer: &Identity) -> Result<()> {
        let DelegationKind::Root { ctype_hash } = &root.kind else {
            return Err(ClaimsError::Ledger(format!(
                "{} is not a delegation root",
                root.id
            )));
        };
        let mut state = lock_state(&self.state)?;
        if state.lookup(&root.id).is_some() {
            return Err(ClaimsError::DuplicateDelegation(root.id.to_hex()));
        }
        if !state.ctypes.contains_key(ctype_hash) {
            return Err(ClaimsError::SchemaNotFound(ctype_hash.to_hex()));
        }
        if root.account != signer.address() {
            return Err(ClaimsError::NotPermitted(format!(
                "{} cannot create a root owned by {}",
                signer.address(),
                root.account
            )));
        }
        let mut record = root.clone();
        record.revoked = false;
        state.roots.insert(record.id, record);
        Ok(())
    }

    fn submit_delegation_node(
        &self,
        node: &DelegationNode,
        signer: &Identity,
        invitee_signature: &str,
    ) -> Result<()> {
        let Some(parent_id) = node.parent_id() else {
            return Err(ClaimsError::Ledger(format!(
                "{} is not a delegation node",
                node.id
            )));
        };
        let mut state = lock_state(&self.state)?;
        if state.lookup(&node.id).is_some() {
            return Err(ClaimsError::DuplicateDelegation(node.id.to_hex()));
        }
        let root = state
            .roots
            .get(&node.root_id())
            .ok_or_else(|| ClaimsError::DelegationNotFound(node.root_id().to_hex()))?;
        if root.revoked {
            return Err(ClaimsError::DelegationRevoked(root.id.to_hex()));
        }
        let parent = state
            .lookup(&parent_id)
            .ok_or_else(|| ClaimsError::DelegationNotFound(parent_id.to_hex()))?;
        if parent.root_id() != node.root_id() {
            return Err(ClaimsError::NotPermitted(format!(
                "parent {parent_id} belongs to another hierarchy"
            )));
        }
        if parent.revoked {
            return Err(ClaimsError::DelegationRevoked(parent_id.to_hex()));
        }
        if parent.account != signer.address() {
            return Err(ClaimsError::NotPermitted(format!(
                "{} does not own parent {parent_id}",
                signer.address()
            )));
        }
        if !parent.permissions().contains(Permissions::DELEGATE) {
            return Err(ClaimsError::NotPermitted(format!(
                "parent {parent_id} lacks the delegate permission"
            )));
        }
        if !signing::verify(
            node.generate_hash().as_bytes(),
            invitee_signature,
            &node.account,
        ) {
            return Err(ClaimsError::NotPermitted(format!(
                "invalid delegate signature for node {}",
                node.id
            )));
        }
        let mut record = node.clone();
        record.revoked = false;
        state.children.entry(parent_id).or_default().push(record.id);
        state.nodes.insert(record.id, record);
        Ok(())
    }

    fn revoke_delegation_root(&self, id: &H256, signer: &Identity) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        let root = state
            .roots
            .get(id)
            .ok_or_else(|| ClaimsError::DelegationNotFound(id.to_hex()))?;
        if root.account != signer.address() {
            return Err(ClaimsError::NotPermitted(format!(
                "{} does not own root {id}",
                signer.address()
            )));
        }
        state.revoke_subtree(id);
        log::debug!("ledger: delegation root {id} revoked");
        Ok(())
    }

    fn revoke_delegation_node(&self, id: &H256, signer: &Identity, max_depth: u32) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        if !state.nodes.contains_key(id) {
            return Err(ClaimsError::DelegationNotFound(id.to_hex()));
        }
        if !state.owns_within(id, &signer.address(), max_depth) {
            return Err(ClaimsError::NotPermitted(format!(
                "{} owns neither node {id} nor an ancestor within {max_depth} steps",
                signer.address()
            )));
        }
        state.revoke_subtree(id);
        log::debug!("ledger: delegation node {id} revoked");
        Ok(())
    }
}
