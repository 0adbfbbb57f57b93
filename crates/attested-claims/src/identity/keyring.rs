//! Identities: the signing and box keys of one protocol participant.
//!
//! An identity is derived from a 32-byte seed. The seed is the only secret
//! that needs persisting; signing and box secrets are HKDF expansions of it.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::derivation::{box_context, derive_key, signing_context};
use crate::crypto::keys::{BoxKeyPair, SigningKeyPair};
use crate::crypto::{hash, random, signing};
use crate::error::{ClaimsError, Result};

use super::address::{Address, DEFAULT_ADDRESS_PREFIX};

/// A participant holding signing and box secrets.
pub struct Identity {
    seed: [u8; 32],
    signing: SigningKeyPair,
    boxed: BoxKeyPair,
    address: Address,
}

impl Identity {
    /// A fresh identity from a random seed.
    pub fn generate() -> Result<Self> {
        let mut seed: [u8; 32] = random::random_bytes();
        let identity = Self::from_seed(seed);
        seed.zeroize();
        identity
    }

    /// Derive an identity from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Result<Self> {
        Self::from_seed_with_prefix(seed, DEFAULT_ADDRESS_PREFIX)
    }

    /// Derive an identity whose address uses a specific network prefix.
    pub fn from_seed_with_prefix(seed: [u8; 32], prefix: u8) -> Result<Self> {
        let mut sign_secret = derive_key(&seed, signing_context())?;
        let mut box_secret = derive_key(&seed, box_context())?;
        let signing = SigningKeyPair::from_secret_bytes(&sign_secret);
        let boxed = BoxKeyPair::from_secret_bytes(box_secret);
        sign_secret.zeroize();
        box_secret.zeroize();
        let address = Address::from_public_key_with_prefix(&signing.verifying_key_bytes(), prefix)?;
        Ok(Self {
            seed,
            signing,
            boxed,
            address,
        })
    }

    /// Deterministic development identity, e.g. `//Alice`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        Self::from_seed(*hash(uri.as_bytes()).as_bytes())
    }

    pub fn address(&self) -> Address {
        self.address.clone()
    }

    pub fn signing_key(&self) -> &SigningKey {
        self.signing.signing_key()
    }

    /// Sign raw bytes; returns a base64 signature.
    pub fn sign(&self, message: &[u8]) -> String {
        signing::sign(self.signing.signing_key(), message)
    }

    pub fn sign_str(&self, message: &str) -> String {
        self.sign(message.as_bytes())
    }

    pub fn box_key_pair(&self) -> &BoxKeyPair {
        &self.boxed
    }

    pub fn box_public_key(&self) -> [u8; 32] {
        self.boxed.public_key_bytes()
    }

    /// The shareable half: address plus box public key.
    pub fn public_identity(&self) -> PublicIdentity {
        PublicIdentity {
            address: self.address(),
            box_public_key: format!("0x{}", hex::encode(self.box_public_key())),
        }
    }

    /// Seed bytes, for the keystore. Caller must zeroize.
    pub(crate) fn seed_bytes(&self) -> [u8; 32] {
        self.seed
    }
}

impl Drop for Identity {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// What a counterparty needs to address and encrypt to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentity {
    pub address: Address,
    pub box_public_key: String,
}

impl PublicIdentity {
    /// Decode the hex box public key.
    pub fn box_public_key_bytes(&self) -> Result<[u8; 32]> {
        decode_box_key(&self.box_public_key)
    }
}

pub(crate) fn decode_box_key(s: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map_err(|e| ClaimsError::InvalidKey(format!("invalid box public key hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| ClaimsError::InvalidKey("box public key must be 32 bytes".into()))
}
