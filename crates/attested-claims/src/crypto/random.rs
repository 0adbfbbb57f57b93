//! Secure random generation.
//!
//! Uses the operating system's cryptographic random source via `rand`.
//! Commitment nonces must never repeat: each call draws fresh entropy and
//! there is no shared generator state between callers.

use rand::RngCore;

/// Fill a buffer with cryptographically secure random bytes.
pub fn fill_random(buf: &mut [u8]) {
    rand::thread_rng().fill_bytes(buf);
}

/// Generate a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    fill_random(&mut buf);
    buf
}

/// Generate a random 12-byte nonce (for ChaCha20-Poly1305).
pub fn random_nonce_12() -> [u8; 12] {
    random_bytes()
}

/// Generate a random 16-byte salt.
pub fn random_salt_16() -> [u8; 16] {
    random_bytes()
}

/// Generate a fresh commitment nonce (random UUIDv4 string).
pub fn commitment_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}
