//! Content hashing: canonical serialization + BLAKE2b.
//!
//! Every commitment in the protocol is built from these functions, so their
//! output is an interop contract: object keys are sorted before
//! serialization, scalars hash as their literal string form, and the digest
//! is BLAKE2b with a 256-bit output.

use std::fmt;
use std::str::FromStr;

use blake2::digest::consts::U32;
use blake2::digest::{Update, VariableOutput};
use blake2::{Blake2b, Blake2bVar, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ClaimsError, Result};

type Blake2b256 = Blake2b<U32>;

/// Default digest width in bits.
pub const DEFAULT_BIT_LENGTH: usize = 256;

/// A 256-bit digest.
///
/// Rendered as `0x`-prefixed lowercase hex, which is also its serde form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct H256(pub [u8; 32]);

impl H256 {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build from a slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ClaimsError::InvalidHash(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// A fresh random value, used for delegation ids.
    pub fn random() -> Self {
        Self(crate::crypto::random::random_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `0x`-prefixed hex rendering.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({self})")
    }
}

impl FromStr for H256 {
    type Err = ClaimsError;

    fn from_str(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| ClaimsError::InvalidHash(format!("invalid hex '{s}': {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serialize a value deterministically.
///
/// Strings pass through unquoted, numbers/booleans/null as their JSON
/// literal, and objects/arrays as compact JSON with object keys sorted at
/// every depth. Array order is preserved.
pub fn canonicalize(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => sort_keys(value).to_string(),
        other => other.to_string(),
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// BLAKE2b-256 of `data`.
pub fn hash(data: &[u8]) -> H256 {
    H256(Blake2b256::digest(data).into())
}

/// BLAKE2b with a caller-chosen output width.
///
/// `bit_length` must be a multiple of 8 between 8 and 512.
pub fn digest(data: &[u8], bit_length: usize) -> Result<Vec<u8>> {
    if bit_length == 0 || bit_length % 8 != 0 || bit_length > 512 {
        return Err(ClaimsError::InvalidHash(format!(
            "unsupported digest bit length: {bit_length}"
        )));
    }
    let mut hasher = Blake2bVar::new(bit_length / 8)
        .map_err(|e| ClaimsError::InvalidHash(format!("digest init: {e}")))?;
    hasher.update(data);
    let mut out = vec![0u8; bit_length / 8];
    hasher
        .finalize_variable(&mut out)
        .map_err(|e| ClaimsError::InvalidHash(format!("digest finalize: {e}")))?;
    Ok(out)
}

/// Hash a UTF-8 string and return the `0x`-hex rendering.
pub fn hash_str(input: &str) -> String {
    hash(input.as_bytes()).to_hex()
}

/// `hash(nonce ‖ canonicalize(value))`, the building block of every
/// nonce-salted commitment.
pub fn hash_object_as_string(value: &Value, nonce: Option<&str>) -> H256 {
    let canonical = canonicalize(value);
    match nonce {
        Some(nonce) => hash(format!("{nonce}{canonical}").as_bytes()),
        None => hash(canonical.as_bytes()),
    }
}
