//! Encrypted identity files.
//!
//! A keystore file holds one identity seed encrypted with
//! ChaCha20-Poly1305 under a key derived from a passphrase via Argon2id,
//! next to the public identity in plaintext so it can be inspected
//! without the passphrase.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "claims-keystore-v1",
//!     "encryption": {
//!         "algorithm": "chacha20-poly1305",
//!         "kdf": "argon2id",
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>"
//!     },
//!     "encrypted_seed": "<base64-ciphertext>",
//!     "name": "alice",
//!     "public_identity": { "address": "...", "boxPublicKey": "0x..." }
//! }
//! ```

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::encryption::{self, EncryptedPayload};
use crate::crypto::{derivation, random};
use crate::error::{ClaimsError, Result};
use crate::identity::{Identity, PublicIdentity};

const KEYSTORE_VERSION: u32 = 1;
const KEYSTORE_FORMAT: &str = "claims-keystore-v1";
const KEYSTORE_ALGORITHM: &str = "chacha20-poly1305";
const KEYSTORE_KDF: &str = "argon2id";

/// Top-level structure of a keystore file.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    pub format: String,
    pub encryption: EncryptionMetadata,
    /// Base64 ciphertext of the 32-byte seed.
    pub encrypted_seed: String,
    pub name: Option<String>,
    pub public_identity: PublicIdentity,
}

/// Parameters needed to decrypt the seed.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub algorithm: String,
    pub kdf: String,
    pub salt: String,
    pub nonce: String,
}

fn file_key(passphrase: &str, salt: &[u8; 16]) -> Result<[u8; 32]> {
    let mut master_key = encryption::derive_passphrase_key(passphrase.as_bytes(), salt)?;
    let key = derivation::derive_key(&master_key, derivation::keystore_context());
    master_key.zeroize();
    key
}

/// Encrypt `identity` under `passphrase` and write it to `path`.
///
/// Written to a sibling temp file and renamed into place.
pub fn save_identity(
    identity: &Identity,
    name: Option<&str>,
    path: &Path,
    passphrase: &str,
) -> Result<()> {
    let salt = random::random_salt_16();
    let mut key = file_key(passphrase, &salt)?;
    let mut seed = identity.seed_bytes();
    let payload = encryption::encrypt_symmetric(&key, &seed);
    seed.zeroize();
    key.zeroize();
    let payload = payload?;

    let file = KeystoreFile {
        version: KEYSTORE_VERSION,
        format: KEYSTORE_FORMAT.to_string(),
        encryption: EncryptionMetadata {
            algorithm: KEYSTORE_ALGORITHM.to_string(),
            kdf: KEYSTORE_KDF.to_string(),
            salt: B64.encode(salt),
            nonce: B64.encode(payload.nonce),
        },
        encrypted_seed: B64.encode(&payload.ciphertext),
        name: name.map(str::to_string),
        public_identity: identity.public_identity(),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| ClaimsError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Decrypt the identity stored at `path`.
///
/// A wrong passphrase fails AEAD authentication and yields
/// `InvalidPassphrase`.
pub fn load_identity(path: &Path, passphrase: &str) -> Result<Identity> {
    let file = read_file(path)?;

    let salt: [u8; 16] = decode_field(&file.encryption.salt, "salt")?
        .try_into()
        .map_err(|_| ClaimsError::InvalidFileFormat("salt must be 16 bytes".into()))?;
    let nonce: [u8; 12] = decode_field(&file.encryption.nonce, "nonce")?
        .try_into()
        .map_err(|_| ClaimsError::InvalidFileFormat("nonce must be 12 bytes".into()))?;
    let ciphertext = decode_field(&file.encrypted_seed, "encrypted_seed")?;

    let mut key = file_key(passphrase, &salt)?;
    let plaintext = encryption::decrypt_symmetric(&key, &EncryptedPayload { ciphertext, nonce });
    key.zeroize();
    let mut plaintext = plaintext.ok_or(ClaimsError::InvalidPassphrase)?;

    let seed: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let mut seed =
        seed.map_err(|_| ClaimsError::InvalidFileFormat("seed must be 32 bytes".into()))?;

    let prefix = file.public_identity.address.prefix()?;
    let identity = Identity::from_seed_with_prefix(seed, prefix);
    seed.zeroize();
    let identity = identity?;

    if identity.address() != file.public_identity.address {
        return Err(ClaimsError::InvalidFileFormat(
            "decrypted seed does not match the stored address".into(),
        ));
    }
    Ok(identity)
}

/// Read the public identity without decrypting anything.
pub fn read_public_identity(path: &Path) -> Result<PublicIdentity> {
    Ok(read_file(path)?.public_identity)
}

fn read_file(path: &Path) -> Result<KeystoreFile> {
    let bytes = std::fs::read(path)?;
    let file: KeystoreFile = serde_json::from_slice(&bytes)
        .map_err(|e| ClaimsError::InvalidFileFormat(format!("failed to parse keystore: {e}")))?;
    if file.version != KEYSTORE_VERSION || file.format != KEYSTORE_FORMAT {
        return Err(ClaimsError::InvalidFileFormat(format!(
            "unsupported keystore version={} format={}",
            file.version, file.format
        )));
    }
    Ok(file)
}

fn decode_field(value: &str, field: &str) -> Result<Vec<u8>> {
    B64.decode(value)
        .map_err(|e| ClaimsError::InvalidFileFormat(format!("invalid {field} base64: {e}")))
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
