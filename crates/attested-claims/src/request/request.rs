//! RequestForAttestation: the signed commitment tree over a claim.
//!
//! Leaves, in order:
//!
//! 1. owner commitment hash
//! 2. CType commitment hash
//! 3. one hash per attribute, in insertion order
//! 4. root hash of each legitimation, in order
//! 5. delegation id, if any
//!
//! With one leaf the root is that leaf; otherwise the root is the hash of
//! the concatenated leaves. The claimer signs the 32 root bytes.
//!
//! Redaction strips nonces (and values) but never touches the root, so the
//! claimer's signature survives every presentation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::claim::Claim;
use crate::credential::AttestedClaim;
use crate::crypto::{hash, signing, H256};
use crate::error::{ClaimsError, Result};

use super::nonce_hash::NonceHash;

/// A claim bound to per-attribute commitments and signed by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestForAttestation {
    pub claim: Claim,
    #[serde(default)]
    pub legitimations: Vec<AttestedClaim>,
    pub claim_owner_commit: NonceHash,
    pub schema_commit: NonceHash,
    pub attribute_tree: IndexMap<String, NonceHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_id: Option<H256>,
    pub root_hash: H256,
    pub claimer_signature: String,
}

/// The value committed to by the owner commitment.
pub(crate) fn owner_value(claim: &Claim) -> Option<Value> {
    claim
        .owner
        .as_ref()
        .map(|owner| Value::String(owner.as_str().to_string()))
}

/// The value committed to by the schema commitment.
pub(crate) fn schema_value(claim: &Claim) -> Value {
    Value::String(claim.ctype_hash.to_hex())
}

/// Combine leaves into a root.
pub(crate) fn combine_leaves(leaves: &[H256]) -> H256 {
    if let [single] = leaves {
        return *single;
    }
    let mut concat = Vec::with_capacity(leaves.len() * 32);
    for leaf in leaves {
        concat.extend_from_slice(leaf.as_bytes());
    }
    hash(&concat)
}

impl RequestForAttestation {
    /// The ordered leaf hashes of the tree as it currently stands.
    pub fn leaves(&self) -> Vec<H256> {
        let mut leaves = Vec::with_capacity(
            2 + self.attribute_tree.len() + self.legitimations.len() + 1,
        );
        leaves.push(self.claim_owner_commit.hash);
        leaves.push(self.schema_commit.hash);
        leaves.extend(self.attribute_tree.values().map(|commit| commit.hash));
        leaves.extend(
            self.legitimations
                .iter()
                .map(|legitimation| legitimation.request.root_hash),
        );
        if let Some(delegation_id) = self.delegation_id {
            leaves.push(delegation_id);
        }
        leaves
    }

    /// Recompute the root from the current leaves.
    pub fn calculate_root_hash(&self) -> H256 {
        combine_leaves(&self.leaves())
    }

    /// Whether the claimer's signature covers the root and the owner.
    ///
    /// A request whose owner has been redacted has nobody to verify
    /// against and is reported unsigned.
    pub fn verify_signature(&self) -> bool {
        let Some(owner) = &self.claim.owner else {
            log::debug!("request {}: owner redacted, signature unverifiable", self.root_hash);
            return false;
        };
        signing::verify(self.root_hash.as_bytes(), &self.claimer_signature, owner)
    }

    /// Full integrity check.
    ///
    /// A root mismatch, a bad signature, or a legitimation that fails
    /// softly yields `Ok(false)`. A value that no longer matches its
    /// commitment is tampering and yields the matching integrity error.
    pub fn verify_data(&self) -> Result<bool> {
        if self.calculate_root_hash() != self.root_hash {
            log::debug!("request {}: root hash mismatch", self.root_hash);
            return Ok(false);
        }

        if let Some(owner) = owner_value(&self.claim) {
            if !self.claim_owner_commit.matches(&owner) {
                log::warn!("request {}: owner commitment broken", self.root_hash);
                return Err(ClaimsError::InvalidOwnerHash);
            }
        }

        if !self.schema_commit.matches(&schema_value(&self.claim)) {
            log::warn!("request {}: ctype commitment broken", self.root_hash);
            return Err(ClaimsError::InvalidSchemaHash);
        }

        for (key, value) in &self.claim.contents {
            let intact = self
                .attribute_tree
                .get(key)
                .is_some_and(|commit| commit.matches(value));
            if !intact {
                log::warn!("request {}: attribute '{key}' commitment broken", self.root_hash);
                return Err(ClaimsError::InvalidAttributeHash(key.clone()));
            }
        }

        for legitimation in &self.legitimations {
            if !legitimation.verify_data()? {
                log::debug!(
                    "request {}: legitimation {} failed",
                    self.root_hash,
                    legitimation.request.root_hash
                );
                return Ok(false);
            }
        }

        Ok(self.verify_signature())
    }

    /// A copy with the given attributes' values and nonces removed.
    ///
    /// Every key must still be disclosed; otherwise nothing is removed and
    /// `PropertyNotFound` names the first missing key.
    pub fn remove_attributes<I>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut redacted = self.clone();
        for key in keys {
            let key = key.as_ref();
            if redacted.claim.contents.remove(key).is_none() {
                return Err(ClaimsError::PropertyNotFound(key.to_string()));
            }
            let commit = redacted
                .attribute_tree
                .get_mut(key)
                .ok_or_else(|| ClaimsError::PropertyNotFound(key.to_string()))?;
            *commit = commit.redacted();
        }
        Ok(redacted)
    }

    /// A copy with the owner and the owner nonce removed.
    pub fn remove_owner(&self) -> Result<Self> {
        if self.claim.owner.is_none() {
            return Err(ClaimsError::OwnerNotPresent);
        }
        let mut redacted = self.clone();
        redacted.claim.owner = None;
        redacted.claim_owner_commit = redacted.claim_owner_commit.redacted();
        Ok(redacted)
    }

    /// Attribute keys whose values are still disclosed.
    pub fn disclosed_attributes(&self) -> impl Iterator<Item = &str> {
        self.claim.contents.keys().map(String::as_str)
    }
}
