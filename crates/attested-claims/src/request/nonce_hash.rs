//! Nonce-salted commitments to single values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{hash_object_as_string, random, H256};

/// `hash = H(nonce ‖ canonical(value))`.
///
/// Dropping the nonce makes the hash non-recomputable, which hides the
/// value while the hash still counts towards the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceHash {
    pub hash: H256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl NonceHash {
    /// Commit to `value` under a fresh nonce.
    pub fn commit(value: &Value) -> Self {
        let nonce = random::commitment_nonce();
        Self {
            hash: hash_object_as_string(value, Some(&nonce)),
            nonce: Some(nonce),
        }
    }

    /// Whether `value` reproduces the stored hash under the stored nonce.
    pub fn matches(&self, value: &Value) -> bool {
        hash_object_as_string(value, self.nonce.as_deref()) == self.hash
    }

    /// Drop the nonce, keeping only the hash.
    pub fn redacted(&self) -> Self {
        Self {
            hash: self.hash,
            nonce: None,
        }
    }

    pub fn is_redacted(&self) -> bool {
        self.nonce.is_none()
    }
}
