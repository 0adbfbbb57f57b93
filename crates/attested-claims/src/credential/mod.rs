//! Credentials: a request paired with its attestation, and presentations
//! derived from it.

use serde::{Deserialize, Serialize};

use crate::attestation::Attestation;
use crate::error::{ClaimsError, Result};
use crate::identity::Address;
use crate::ledger::Ledger;
use crate::request::RequestForAttestation;

/// A (possibly redacted) request together with the attestation of its
/// root hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestedClaim {
    pub request: RequestForAttestation,
    pub attestation: Attestation,
}

impl AttestedClaim {
    /// Pair a request with its attestation.
    ///
    /// Fails with `InvalidHash` when the attestation covers a different
    /// root.
    pub fn new(request: RequestForAttestation, attestation: Attestation) -> Result<Self> {
        if request.root_hash != attestation.claim_hash {
            return Err(ClaimsError::InvalidHash(format!(
                "attestation covers {}, request root is {}",
                attestation.claim_hash, request.root_hash
            )));
        }
        Ok(Self {
            request,
            attestation,
        })
    }

    /// Local integrity: the request verifies and the attestation covers it.
    pub fn verify_data(&self) -> Result<bool> {
        Ok(self.request.verify_data()?
            && self.request.root_hash == self.attestation.claim_hash)
    }

    /// Local integrity, then the ledger's view of the attestation.
    ///
    /// The ledger is not consulted when local checks fail.
    pub fn verify(&self, ledger: &dyn Ledger) -> Result<bool> {
        if !self.verify_data()? {
            log::debug!("credential {}: local data invalid", self.attestation.claim_hash);
            return Ok(false);
        }
        self.attestation.verify(ledger, None)
    }

    /// A copy for disclosure with `excluded` attributes (and optionally
    /// the owner) redacted. `self` is left untouched.
    pub fn create_presentation<I>(&self, excluded: I, exclude_owner: bool) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut request = self.request.remove_attributes(excluded)?;
        if exclude_owner {
            request = request.remove_owner()?;
        }
        Ok(Self {
            request,
            attestation: self.attestation.clone(),
        })
    }

    pub fn attester(&self) -> &Address {
        &self.attestation.owner
    }

    pub fn owner(&self) -> Option<&Address> {
        self.request.claim.owner.as_ref()
    }
}
