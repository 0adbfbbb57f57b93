//! Local persistence.
//!
//! # Directory layout
//!
//! By convention the keystore lives under `~/.attested-claims/`:
//!
//! ```text
//! ~/.attested-claims/
//! ├── config.json
//! └── keystore/
//!     ├── default.json
//!     └── {name}.json
//! ```
//!
//! - [`keystore`]: passphrase-encrypted identity files.

pub mod keystore;

pub use keystore::{
    load_identity, read_public_identity, save_identity, EncryptionMetadata, KeystoreFile,
};
