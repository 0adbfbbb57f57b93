//! Building and signing a RequestForAttestation.

use indexmap::IndexMap;

use crate::claim::Claim;
use crate::credential::AttestedClaim;
use crate::crypto::H256;
use crate::error::{ClaimsError, Result};
use crate::identity::Identity;

use super::nonce_hash::NonceHash;
use super::request::{combine_leaves, owner_value, schema_value, RequestForAttestation};

/// Builder for requests for attestation.
pub struct RequestBuilder {
    claim: Claim,
    legitimations: Vec<AttestedClaim>,
    delegation_id: Option<H256>,
}

impl RequestBuilder {
    /// Start a request over `claim`.
    pub fn new(claim: Claim) -> Self {
        Self {
            claim,
            legitimations: Vec::new(),
            delegation_id: None,
        }
    }

    /// Add a credential that supports this request.
    pub fn legitimation(mut self, legitimation: AttestedClaim) -> Self {
        self.legitimations.push(legitimation);
        self
    }

    /// Add several supporting credentials.
    pub fn legitimations(mut self, legitimations: Vec<AttestedClaim>) -> Self {
        self.legitimations.extend(legitimations);
        self
    }

    /// Bind the request to a delegation node.
    pub fn delegation(mut self, delegation_id: H256) -> Self {
        self.delegation_id = Some(delegation_id);
        self
    }

    /// Commit to every value and sign the root with `identity`.
    ///
    /// `identity` must own the claim.
    pub fn sign(self, identity: &Identity) -> Result<RequestForAttestation> {
        let owner = owner_value(&self.claim).ok_or(ClaimsError::OwnerMismatch)?;
        if self.claim.owner.as_ref() != Some(&identity.address()) {
            return Err(ClaimsError::OwnerMismatch);
        }

        let claim_owner_commit = NonceHash::commit(&owner);
        let schema_commit = NonceHash::commit(&schema_value(&self.claim));
        let attribute_tree: IndexMap<String, NonceHash> = self
            .claim
            .contents
            .iter()
            .map(|(key, value)| (key.clone(), NonceHash::commit(value)))
            .collect();

        let mut request = RequestForAttestation {
            claim: self.claim,
            legitimations: self.legitimations,
            claim_owner_commit,
            schema_commit,
            attribute_tree,
            delegation_id: self.delegation_id,
            root_hash: H256::default(),
            claimer_signature: String::new(),
        };
        request.root_hash = combine_leaves(&request.leaves());
        request.claimer_signature = identity.sign(request.root_hash.as_bytes());

        log::debug!(
            "built request {} with {} attributes, {} legitimations",
            request.root_hash,
            request.attribute_tree.len(),
            request.legitimations.len()
        );
        Ok(request)
    }
}
