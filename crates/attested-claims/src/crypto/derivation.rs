//! Key derivation using HKDF-SHA256.
//!
//! A single 32-byte identity seed yields independent signing and box
//! secrets through distinct context strings; message boxes and keystore
//! files derive their symmetric keys the same way.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{ClaimsError, Result};

/// Derive a 32-byte key from input key material and a context string.
///
/// Uses HKDF-SHA256 (RFC 5869) with `ikm` as input key material and the
/// context as info.
pub fn derive_key(ikm: &[u8], context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| ClaimsError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}

/// Context for the ed25519 signing secret of an identity.
pub fn signing_context() -> &'static str {
    "attested-claims/identity/signing"
}

/// Context for the x25519 box secret of an identity.
pub fn box_context() -> &'static str {
    "attested-claims/identity/box"
}

/// Context for the symmetric key of a sender/receiver message box.
pub fn message_box_context() -> &'static str {
    "attested-claims/message/box"
}

/// Context for the keystore file encryption key.
pub fn keystore_context() -> &'static str {
    "attested-claims/keystore"
}
