//! Signing and box key pairs.
//!
//! Ed25519 signs commitments and messages; the verifying key is embedded
//! in the owner's address. X25519 is the "box" key used to agree on a
//! per-pair symmetric key for encrypted messages.

use ed25519_dalek::{SigningKey, VerifyingKey};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::error::{ClaimsError, Result};

/// An Ed25519 key pair for signing root hashes and message hashes.
///
/// The secret bytes are zeroized on drop.
pub struct SigningKeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl SigningKeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Build a key pair from a 32-byte secret.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Parse a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(bytes)
            .map_err(|e| ClaimsError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }
}

impl Drop for SigningKeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

/// An X25519 static key pair for message boxes.
pub struct BoxKeyPair {
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl BoxKeyPair {
    /// Generate a new random box key pair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(rand::thread_rng());
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Build a box key pair from a 32-byte secret.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Diffie-Hellman with a peer's public box key. Both sides of a pair
    /// obtain the same 32 bytes.
    pub fn shared_secret(&self, peer_public: &[u8; 32]) -> [u8; 32] {
        let peer = X25519PublicKey::from(*peer_public);
        *self.secret.diffie_hellman(&peer).as_bytes()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }
}
