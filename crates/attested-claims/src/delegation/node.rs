//! Delegation nodes: root and child entries of a trust hierarchy.
//!
//! A root anchors a hierarchy for one CType. Children grant their account
//! scoped permissions below a parent (or directly below the root). A child
//! is only anchored once the delegate has signed its [`generate_hash`].
//!
//! [`generate_hash`]: DelegationNode::generate_hash

use serde::{Deserialize, Serialize};

use crate::crypto::{hash, H256};
use crate::error::{ClaimsError, Result};
use crate::identity::{Address, Identity};
use crate::ledger::Ledger;

use super::permissions::Permissions;

/// What distinguishes a root from a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DelegationKind {
    #[serde(rename_all = "camelCase")]
    Root { ctype_hash: H256 },
    #[serde(rename_all = "camelCase")]
    Child {
        root_id: H256,
        /// `None` when the parent is the root itself.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<H256>,
        permissions: Permissions,
    },
}

/// An entry in a delegation hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationNode {
    pub id: H256,
    pub account: Address,
    #[serde(default)]
    pub revoked: bool,
    #[serde(flatten)]
    pub kind: DelegationKind,
}

impl DelegationNode {
    /// A hierarchy root for `ctype_hash`, owned by `account`.
    pub fn new_root(id: H256, ctype_hash: H256, account: Address) -> Self {
        Self {
            id,
            account,
            revoked: false,
            kind: DelegationKind::Root { ctype_hash },
        }
    }

    /// A child of `parent_id` (or of the root, when `parent_id` is `None`
    /// or equal to `root_id`).
    pub fn new_child(
        id: H256,
        root_id: H256,
        parent_id: Option<H256>,
        account: Address,
        permissions: Permissions,
    ) -> Self {
        Self {
            id,
            account,
            revoked: false,
            kind: DelegationKind::Child {
                root_id,
                parent_id: parent_id.filter(|parent| *parent != root_id),
                permissions,
            },
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, DelegationKind::Root { .. })
    }

    /// Id of the hierarchy root; a root is its own root.
    pub fn root_id(&self) -> H256 {
        match &self.kind {
            DelegationKind::Root { .. } => self.id,
            DelegationKind::Child { root_id, .. } => *root_id,
        }
    }

    /// Id of the direct parent, `None` for a root.
    pub fn parent_id(&self) -> Option<H256> {
        match &self.kind {
            DelegationKind::Root { .. } => None,
            DelegationKind::Child {
                root_id, parent_id, ..
            } => Some(parent_id.unwrap_or(*root_id)),
        }
    }

    /// Roots hold every permission.
    pub fn permissions(&self) -> Permissions {
        match &self.kind {
            DelegationKind::Root { .. } => Permissions::all(),
            DelegationKind::Child { permissions, .. } => *permissions,
        }
    }

    /// The hash a delegate signs to accept the node.
    ///
    /// Child: `H(id ‖ root_id ‖ [parent_id] ‖ permissions_le32)`, with the
    /// parent included only when it is not the root. Root: `H(id ‖
    /// ctype_hash)`.
    pub fn generate_hash(&self) -> H256 {
        let mut data = Vec::with_capacity(32 * 3 + 4);
        data.extend_from_slice(self.id.as_bytes());
        match &self.kind {
            DelegationKind::Root { ctype_hash } => {
                data.extend_from_slice(ctype_hash.as_bytes());
            }
            DelegationKind::Child {
                root_id,
                parent_id,
                permissions,
            } => {
                data.extend_from_slice(root_id.as_bytes());
                if let Some(parent_id) = parent_id.filter(|parent| parent != root_id) {
                    data.extend_from_slice(parent_id.as_bytes());
                }
                data.extend_from_slice(&permissions.to_le_bytes());
            }
        }
        hash(&data)
    }

    /// The delegate's consent signature over [`Self::generate_hash`].
    pub fn sign_invitation(&self, delegate: &Identity) -> String {
        delegate.sign(self.generate_hash().as_bytes())
    }

    /// Anchor the node on the ledger.
    ///
    /// A child needs the delegate's signature from [`Self::sign_invitation`];
    /// `signer` must own the parent.
    pub fn store(
        &self,
        signer: &Identity,
        invitee_signature: Option<&str>,
        ledger: &dyn Ledger,
    ) -> Result<()> {
        match (&self.kind, invitee_signature) {
            (DelegationKind::Root { .. }, _) => ledger.submit_delegation_root(self, signer)?,
            (DelegationKind::Child { .. }, Some(signature)) => {
                ledger.submit_delegation_node(self, signer, signature)?
            }
            (DelegationKind::Child { .. }, None) => {
                return Err(ClaimsError::NotPermitted(format!(
                    "delegation node {} lacks the delegate's signature",
                    self.id
                )))
            }
        }
        log::info!("stored delegation node {} for {}", self.id, self.account);
        Ok(())
    }

    /// Look up a node or root by id.
    pub fn query(ledger: &dyn Ledger, id: &H256) -> Result<Option<Self>> {
        match ledger.query_delegation_node(id)? {
            Some(node) => Ok(Some(node)),
            None => ledger.query_delegation_root(id),
        }
    }

    /// Whether the node is anchored and not revoked.
    pub fn verify(&self, ledger: &dyn Ledger) -> Result<bool> {
        let record = match self.kind {
            DelegationKind::Root { .. } => ledger.query_delegation_root(&self.id)?,
            DelegationKind::Child { .. } => ledger.query_delegation_node(&self.id)?,
        };
        let valid = record.is_some_and(|node| !node.revoked);
        log::debug!("delegation node {} valid: {valid}", self.id);
        Ok(valid)
    }

    /// Revoke the node and, on the ledger, its whole subtree.
    ///
    /// `signer` must own the node or one of its ancestors.
    pub fn revoke(&self, signer: &Identity, ledger: &dyn Ledger) -> Result<()> {
        if self.is_root() {
            ledger.revoke_delegation_root(&self.id, signer)?;
        } else {
            let (steps, _) = self
                .find_ancestor_owned_by(&signer.address(), ledger)?
                .ok_or_else(|| {
                    ClaimsError::NotPermitted(format!(
                        "{} owns neither node {} nor any ancestor",
                        signer.address(),
                        self.id
                    ))
                })?;
            ledger.revoke_delegation_node(&self.id, signer, steps)?;
        }
        log::info!("revoked delegation node {}", self.id);
        Ok(())
    }

    /// The direct parent; `None` for a root.
    pub fn get_parent(&self, ledger: &dyn Ledger) -> Result<Option<Self>> {
        match &self.kind {
            DelegationKind::Root { .. } => Ok(None),
            DelegationKind::Child {
                root_id,
                parent_id: None,
                ..
            } => ledger.query_delegation_root(root_id),
            DelegationKind::Child {
                parent_id: Some(parent_id),
                ..
            } => ledger.query_delegation_node(parent_id),
        }
    }

    /// The hierarchy root.
    pub fn get_root(&self, ledger: &dyn Ledger) -> Result<Self> {
        match &self.kind {
            DelegationKind::Root { .. } => Ok(self.clone()),
            DelegationKind::Child { root_id, .. } => ledger
                .query_delegation_root(root_id)?
                .ok_or_else(|| ClaimsError::DelegationNotFound(root_id.to_hex())),
        }
    }

    /// Direct children, re-queried on every call.
    pub fn get_children(&self, ledger: &dyn Ledger) -> Result<Vec<Self>> {
        let mut children = Vec::new();
        for id in ledger.query_child_ids(&self.id)? {
            if let Some(child) = ledger.query_delegation_node(&id)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    /// Number of nodes below this one.
    pub fn subtree_node_count(&self, ledger: &dyn Ledger) -> Result<usize> {
        let mut count = 0;
        for child in self.get_children(ledger)? {
            count += 1 + child.subtree_node_count(ledger)?;
        }
        Ok(count)
    }

    /// Walk upwards from this node to the first one owned by `address`.
    ///
    /// Returns the number of steps taken (0 when this node matches) and
    /// the matching node.
    pub fn find_ancestor_owned_by(
        &self,
        address: &Address,
        ledger: &dyn Ledger,
    ) -> Result<Option<(u32, Self)>> {
        let mut current = self.clone();
        let mut steps = 0;
        loop {
            if current.account == *address {
                return Ok(Some((steps, current)));
            }
            match current.get_parent(ledger)? {
                Some(parent) => {
                    current = parent;
                    steps += 1;
                }
                None => return Ok(None),
            }
        }
    }
}
