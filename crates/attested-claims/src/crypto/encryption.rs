//! Authenticated encryption with ChaCha20-Poly1305.
//!
//! - Symmetric: caller-supplied 32-byte key.
//! - Asymmetric ("box"): X25519 agreement between the sender's box secret
//!   and the receiver's box public key, expanded with HKDF-SHA256.
//! - Passphrase: Argon2id key for keystore files.
//!
//! Decryption of symmetric and box payloads returns `None` on any failure;
//! the caller decides how fatal that is.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::derivation::{derive_key, message_box_context};
use crate::crypto::keys::BoxKeyPair;
use crate::crypto::random::random_nonce_12;
use crate::error::{ClaimsError, Result};

/// Argon2id parameters for passphrase-based key derivation.
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

/// Ciphertext plus the nonce needed to open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 12],
}

/// Encrypt `plaintext` under a symmetric key.
pub fn encrypt_symmetric(key: &[u8; 32], plaintext: &[u8]) -> Result<EncryptedPayload> {
    let nonce = random_nonce_12();
    let cipher = ChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| ClaimsError::EncryptionFailed(format!("cipher init: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| ClaimsError::EncryptionFailed(format!("encrypt: {e}")))?;
    Ok(EncryptedPayload { ciphertext, nonce })
}

/// Open a symmetric payload. `None` if the key is wrong or the payload
/// was tampered with.
pub fn decrypt_symmetric(key: &[u8; 32], payload: &EncryptedPayload) -> Option<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new_from_slice(key).ok()?;
    cipher
        .decrypt(Nonce::from_slice(&payload.nonce), payload.ciphertext.as_slice())
        .ok()
}

fn box_key(own: &BoxKeyPair, peer_public: &[u8; 32]) -> Result<[u8; 32]> {
    let mut shared = own.shared_secret(peer_public);
    let key = derive_key(&shared, message_box_context());
    shared.zeroize();
    key
}

/// Encrypt `plaintext` from `sender` to the holder of `receiver_public`.
pub fn encrypt_asymmetric(
    plaintext: &[u8],
    sender: &BoxKeyPair,
    receiver_public: &[u8; 32],
) -> Result<EncryptedPayload> {
    let mut key = box_key(sender, receiver_public)?;
    let payload = encrypt_symmetric(&key, plaintext);
    key.zeroize();
    payload
}

/// Open a box addressed to `receiver` from the holder of `sender_public`.
pub fn decrypt_asymmetric(
    payload: &EncryptedPayload,
    sender_public: &[u8; 32],
    receiver: &BoxKeyPair,
) -> Option<Vec<u8>> {
    let mut key = box_key(receiver, sender_public).ok()?;
    let plaintext = decrypt_symmetric(&key, payload);
    key.zeroize();
    plaintext
}

/// Derive a 32-byte key from a passphrase and salt using Argon2id.
pub fn derive_passphrase_key(passphrase: &[u8], salt: &[u8; 16]) -> Result<[u8; 32]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| ClaimsError::DerivationFailed(format!("Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut output)
        .map_err(|e| ClaimsError::DerivationFailed(format!("Argon2 hash: {e}")))?;

    Ok(output)
}
