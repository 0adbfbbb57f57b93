//! Requests for attestation: commitment trees, signing and redaction.

pub mod builder;
pub mod nonce_hash;
#[allow(clippy::module_inception)]
pub mod request;

pub use builder::RequestBuilder;
pub use nonce_hash::NonceHash;
pub use request::RequestForAttestation;
