//! SS58-style account addresses.
//!
//! An address is `base58(prefix ‖ public_key ‖ checksum)` where the checksum
//! is the first two bytes of BLAKE2b-512 over `"SS58PRE" ‖ prefix ‖
//! public_key`. The ed25519 verifying key is recoverable from the address,
//! which is what makes address-based signature verification possible.

use blake2::{Blake2b512, Digest};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::crypto::keys::SigningKeyPair;
use crate::error::{ClaimsError, Result};

/// Network prefix used when none is configured.
pub const DEFAULT_ADDRESS_PREFIX: u8 = 38;

const MAX_PREFIX: u8 = 64;
const CHECKSUM_PREAMBLE: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const DECODED_LEN: usize = 1 + 32 + CHECKSUM_LEN;

/// An account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Encode a verifying key with the default prefix.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        Self::encode(public_key, DEFAULT_ADDRESS_PREFIX)
    }

    /// Encode a verifying key with an explicit network prefix.
    ///
    /// Only single-byte prefixes (below 64) are supported.
    pub fn from_public_key_with_prefix(public_key: &[u8; 32], prefix: u8) -> Result<Self> {
        if prefix >= MAX_PREFIX {
            return Err(ClaimsError::InvalidAddress(format!(
                "unsupported prefix {prefix}"
            )));
        }
        Ok(Self::encode(public_key, prefix))
    }

    fn encode(public_key: &[u8; 32], prefix: u8) -> Self {
        let mut data = Vec::with_capacity(DECODED_LEN);
        data.push(prefix);
        data.extend_from_slice(public_key);
        let checksum = checksum(&data);
        data.extend_from_slice(&checksum);
        Self(bs58::encode(data).into_string())
    }

    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self> {
        let address = Self(s.to_string());
        address.decode()?;
        Ok(address)
    }

    /// Wrap a string without validating it. Verification against such an
    /// address simply fails.
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The network prefix byte.
    pub fn prefix(&self) -> Result<u8> {
        Ok(self.decode()?.0)
    }

    /// The raw verifying key bytes embedded in the address.
    pub fn public_key_bytes(&self) -> Result<[u8; 32]> {
        Ok(self.decode()?.1)
    }

    /// The ed25519 verifying key embedded in the address.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        SigningKeyPair::verifying_key_from_bytes(&self.public_key_bytes()?)
    }

    fn decode(&self) -> Result<(u8, [u8; 32])> {
        let raw = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| ClaimsError::InvalidAddress(format!("{}: {e}", self.0)))?;
        if raw.len() != DECODED_LEN {
            return Err(ClaimsError::InvalidAddress(format!(
                "{}: expected {DECODED_LEN} bytes, got {}",
                self.0,
                raw.len()
            )));
        }
        let (data, check) = raw.split_at(1 + 32);
        if data[0] >= MAX_PREFIX {
            return Err(ClaimsError::InvalidAddress(format!(
                "{}: unsupported prefix {}",
                self.0, data[0]
            )));
        }
        if checksum(data) != check {
            return Err(ClaimsError::InvalidAddress(format!("{}: bad checksum", self.0)));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&data[1..]);
        Ok((data[0], key))
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_PREAMBLE);
    hasher.update(data);
    let full = hasher.finalize();
    [full[0], full[1]]
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
