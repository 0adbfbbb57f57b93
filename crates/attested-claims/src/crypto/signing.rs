//! Ed25519 signing and address-based verification.
//!
//! Signatures travel as base64 strings. Verification takes an [`Address`]
//! rather than a key: the address embeds the verifying key, so no key
//! registry is needed. Verification never errors; anything that prevents
//! a positive answer is `false`.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{ClaimsError, Result};
use crate::identity::Address;

/// Sign a message and return the base64-encoded signature.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> String {
    let sig = signing_key.sign(message);
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, sig.to_bytes())
}

/// Verify a base64 signature against a known verifying key.
pub fn verify_with_key(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature_b64: &str,
) -> Result<()> {
    let signature = decode_signature(signature_b64)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| ClaimsError::InvalidKey("signature verification failed".into()))
}

/// Verify a base64 signature against the key embedded in `address`.
pub fn verify(message: &[u8], signature_b64: &str, address: &Address) -> bool {
    let Ok(key) = address.verifying_key() else {
        log::debug!("cannot verify signature: undecodable address {address}");
        return false;
    };
    verify_with_key(&key, message, signature_b64).is_ok()
}

fn decode_signature(signature_b64: &str) -> Result<Signature> {
    let sig_bytes =
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, signature_b64)
            .map_err(|e| ClaimsError::InvalidKey(format!("invalid base64 signature: {e}")))?;

    let sig_array: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| ClaimsError::InvalidKey("signature must be 64 bytes".into()))?;

    Ok(Signature::from_bytes(&sig_array))
}
