//! Error types for attested claims.
//!
//! Structural and integrity failures are distinct variants so callers can
//! tell *which* commitment was tampered with. Soft verification outcomes
//! (root hash, signature, ledger status) are plain `bool`s and never show
//! up here. Private key material is never included in error messages.

/// Error types covering all protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    // ── Structural / validation ──────────────────────────────────────────────
    #[error("Claim contents do not match the CType schema")]
    InvalidClaimStructure,

    #[error("CType schema does not match the CType meta-schema: {0}")]
    InvalidCTypeStructure(String),

    #[error("Claim owner does not match the signing identity")]
    OwnerMismatch,

    #[error("Property not found in claim: {0}")]
    PropertyNotFound(String),

    #[error("Claim owner has already been removed")]
    OwnerNotPresent,

    // ── Integrity ────────────────────────────────────────────────────────────
    #[error("Claim owner hash does not match its commitment")]
    InvalidOwnerHash,

    #[error("CType hash does not match its commitment")]
    InvalidSchemaHash,

    #[error("Attribute hash does not match its commitment: {0}")]
    InvalidAttributeHash(String),

    // ── Ledger / authorization ───────────────────────────────────────────────
    #[error("CType not found on the ledger: {0}")]
    SchemaNotFound(String),

    #[error("CType already exists on the ledger: {0}")]
    CTypeAlreadyExists(String),

    #[error("Attestation already exists for claim hash: {0}")]
    DuplicateAttestation(String),

    #[error("Attestation not found for claim hash: {0}")]
    AttestationNotFound(String),

    #[error("Attestation already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    #[error("Delegation node not found: {0}")]
    DelegationNotFound(String),

    #[error("Delegation node already exists: {0}")]
    DuplicateDelegation(String),

    #[error("Delegation has been revoked: {0}")]
    DelegationRevoked(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    // ── Messaging ────────────────────────────────────────────────────────────
    #[error("Message hash does not match its contents")]
    MessageHashMismatch,

    #[error("Message signature is invalid for the sender")]
    MessageSignatureInvalid,

    #[error("Message could not be decrypted")]
    MessageDecryptionFailed,

    #[error("Decrypted message could not be parsed: {0}")]
    MessageParseFailed(String),

    #[error("Message sender does not own the enclosed content")]
    SenderMismatch,

    // ── Keys / encoding ──────────────────────────────────────────────────────
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Decompression failed for {0}")]
    DecompressionFailed(&'static str),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ClaimsError>;
