//! Attestations: an attester's on-ledger commitment to a request's root.
//!
//! The ledger keys attestations by claim hash. Revocation is one-way.

use serde::{Deserialize, Serialize};

use crate::crypto::H256;
use crate::delegation::DelegationNode;
use crate::error::{ClaimsError, Result};
use crate::identity::{Address, Identity};
use crate::ledger::Ledger;
use crate::request::RequestForAttestation;

/// An attester's record for one claim hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub claim_hash: H256,
    pub ctype_hash: H256,
    pub owner: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_id: Option<H256>,
    #[serde(default)]
    pub revoked: bool,
}

impl Attestation {
    /// Attest `request` as `attester`.
    ///
    /// Without an explicit delegation the request's own delegation, if
    /// any, is used.
    pub fn issue(
        request: &RequestForAttestation,
        attester: &Identity,
        delegation_id: Option<H256>,
    ) -> Self {
        Self {
            claim_hash: request.root_hash,
            ctype_hash: request.claim.ctype_hash,
            owner: attester.address(),
            delegation_id: delegation_id.or(request.delegation_id),
            revoked: false,
        }
    }

    /// Anchor the attestation on the ledger.
    pub fn store(&self, attester: &Identity, ledger: &dyn Ledger) -> Result<()> {
        ledger.submit_attestation(self, attester)?;
        log::info!("stored attestation {} by {}", self.claim_hash, self.owner);
        Ok(())
    }

    /// Revoke the attestation.
    ///
    /// Allowed for the attester, or for the owner of the attestation's
    /// delegation node or any of its ancestors.
    pub fn revoke(&mut self, identity: &Identity, ledger: &dyn Ledger) -> Result<()> {
        let address = identity.address();
        let max_depth = if address == self.owner {
            0
        } else {
            self.delegation_depth_of(&address, ledger)?
        };
        ledger.revoke_attestation(&self.claim_hash, identity, max_depth)?;
        self.revoked = true;
        log::info!("revoked attestation {} by {address}", self.claim_hash);
        Ok(())
    }

    fn delegation_depth_of(&self, address: &Address, ledger: &dyn Ledger) -> Result<u32> {
        let not_permitted = || {
            ClaimsError::NotPermitted(format!(
                "{address} may not revoke attestation {}",
                self.claim_hash
            ))
        };
        let delegation_id = self.delegation_id.ok_or_else(not_permitted)?;
        let node = DelegationNode::query(ledger, &delegation_id)?
            .ok_or_else(|| ClaimsError::DelegationNotFound(delegation_id.to_hex()))?;
        let (steps, _) = node
            .find_ancestor_owned_by(address, ledger)?
            .ok_or_else(not_permitted)?;
        Ok(steps)
    }

    /// The ledger's record for `claim_hash`.
    pub fn query(ledger: &dyn Ledger, claim_hash: &H256) -> Result<Option<Self>> {
        ledger.query_attestation(claim_hash)
    }

    /// Whether the ledger holds an unrevoked record by the same attester
    /// for `claim_hash` (defaults to this attestation's own).
    pub fn verify(&self, ledger: &dyn Ledger, claim_hash: Option<&H256>) -> Result<bool> {
        let claim_hash = claim_hash.unwrap_or(&self.claim_hash);
        let valid = match Self::query(ledger, claim_hash)? {
            Some(record) => record.owner == self.owner && !record.revoked,
            None => false,
        };
        log::debug!("attestation {claim_hash} valid: {valid}");
        Ok(valid)
    }
}
