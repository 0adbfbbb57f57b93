//! Messaging between claimers, attesters and verifiers.

pub mod body;
pub mod envelope;

pub use body::{
    ClaimsRequest, DelegationAcceptance, DelegationInvitation, MessageBody, PartialClaim,
    RequestAttestation, Terms,
};
pub use envelope::{EncryptedMessage, Message};
