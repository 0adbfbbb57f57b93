//! Cryptographic primitives.
//!
//! This module provides:
//! - Canonical content hashing (sorted-key JSON + BLAKE2b-256)
//! - Ed25519 signing with address-based verification
//! - X25519 box keys and ChaCha20-Poly1305 authenticated encryption
//! - HKDF-SHA256 and Argon2id key derivation
//! - Cryptographically secure nonces

pub mod derivation;
pub mod encryption;
pub mod hashing;
pub mod keys;
pub mod random;
pub mod signing;

pub use hashing::{canonicalize, digest, hash, hash_object_as_string, hash_str, H256};
