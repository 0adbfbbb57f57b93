//! Attested claims: selective-disclosure credentials anchored on a ledger.
//!
//! A claimer commits to every attribute of a [`Claim`] under its own nonce,
//! combines the commitments into a signed root ([`RequestForAttestation`]),
//! and has an attester anchor that root on a [`Ledger`] as an
//! [`Attestation`]. The resulting [`AttestedClaim`] can be presented with
//! any subset of attributes hidden, and a verifier checks it locally and
//! against the ledger. Delegation hierarchies scope who may attest and
//! revoke; encrypted messages carry all of this between participants.

pub mod attestation;
pub mod claim;
pub mod compress;
pub mod config;
pub mod credential;
pub mod crypto;
pub mod ctype;
pub mod delegation;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod message;
pub mod request;
pub mod storage;
pub mod time;

// Re-export primary types
pub use attestation::Attestation;
pub use claim::Claim;
pub use compress::Compress;
pub use config::ClientConfig;
pub use credential::AttestedClaim;
pub use crypto::H256;
pub use ctype::{CType, CTypeSchema, PropertyType, SchemaValidator};
pub use delegation::{DelegationKind, DelegationNode, Permissions};
pub use error::{ClaimsError, Result};
pub use identity::{Address, Identity, PublicIdentity};
pub use ledger::{ConnectionCache, InMemoryLedger, Ledger};
pub use message::{EncryptedMessage, Message, MessageBody};
pub use request::{NonceHash, RequestBuilder, RequestForAttestation};
