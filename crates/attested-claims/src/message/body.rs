//! Protocol message bodies.
//!
//! Serialized as `{"type": "<kebab-case-name>", "content": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attestation::Attestation;
use crate::credential::AttestedClaim;
use crate::crypto::H256;
use crate::delegation::DelegationNode;
use crate::identity::Address;
use crate::request::RequestForAttestation;

/// A claim whose contents and owner may still be open, used while
/// negotiating terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialClaim {
    pub ctype_hash: H256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
}

/// Terms an attester offers or a claimer rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    pub claim: PartialClaim,
    #[serde(default)]
    pub legitimations: Vec<AttestedClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_id: Option<H256>,
    /// Free-form pricing or policy data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAttestation {
    pub request_for_attestation: RequestForAttestation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Value>,
}

/// A verifier asking for credentials of one CType.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsRequest {
    pub ctype_hash: H256,
    /// Attesters the verifier trusts; empty means any.
    #[serde(default)]
    pub accepted_attesters: Vec<Address>,
}

/// A delegation offered by its future parent's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationInvitation {
    pub node: DelegationNode,
    /// Inviter's signature over the node's generated hash.
    pub inviter_signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
}

/// A delegation accepted by the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationAcceptance {
    pub node: DelegationNode,
    pub inviter_signature: String,
    /// Delegate's signature over the node's generated hash.
    pub invitee_signature: String,
}

/// Every message a participant can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum MessageBody {
    RequestTerms(PartialClaim),
    SubmitTerms(Terms),
    RejectTerms(Terms),
    RequestAttestationForClaim(RequestAttestation),
    SubmitAttestationForClaim(Attestation),
    /// Root hash of the rejected request.
    RejectAttestationForClaim(H256),
    RequestClaimsForCtypes(Vec<ClaimsRequest>),
    SubmitClaimsForCtypes(Vec<AttestedClaim>),
    /// Root hashes of the accepted credentials.
    AcceptClaimsForCtypes(Vec<H256>),
    RejectClaimsForCtypes(Vec<H256>),
    RequestAcceptDelegation(DelegationInvitation),
    SubmitAcceptDelegation(DelegationAcceptance),
    RejectAcceptDelegation(DelegationInvitation),
    InformCreateDelegation(H256),
}

impl MessageBody {
    /// The wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestTerms(_) => "request-terms",
            Self::SubmitTerms(_) => "submit-terms",
            Self::RejectTerms(_) => "reject-terms",
            Self::RequestAttestationForClaim(_) => "request-attestation-for-claim",
            Self::SubmitAttestationForClaim(_) => "submit-attestation-for-claim",
            Self::RejectAttestationForClaim(_) => "reject-attestation-for-claim",
            Self::RequestClaimsForCtypes(_) => "request-claims-for-ctypes",
            Self::SubmitClaimsForCtypes(_) => "submit-claims-for-ctypes",
            Self::AcceptClaimsForCtypes(_) => "accept-claims-for-ctypes",
            Self::RejectClaimsForCtypes(_) => "reject-claims-for-ctypes",
            Self::RequestAcceptDelegation(_) => "request-accept-delegation",
            Self::SubmitAcceptDelegation(_) => "submit-accept-delegation",
            Self::RejectAcceptDelegation(_) => "reject-accept-delegation",
            Self::InformCreateDelegation(_) => "inform-create-delegation",
        }
    }
}
