//! Encrypted, signed message envelopes.
//!
//! Wire form:
//!
//! ```json
//! {
//!     "message": "<base64 ciphertext>",
//!     "nonce": "<base64 12 bytes>",
//!     "createdAt": 1700000000000000,
//!     "hash": "0x…",
//!     "signature": "<base64>",
//!     "senderAddress": "...",
//!     "senderBoxPublicKey": "0x…",
//!     "receiverAddress": "..."
//! }
//! ```
//!
//! `hash = H(message ‖ nonce ‖ createdAt)` and `signature` is the sender's
//! signature over the hash string. A receiver checks hash, signature,
//! decryption, parsing and sender binding, in that order.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::encryption::{self, EncryptedPayload};
use crate::crypto::{hash_str, signing};
use crate::error::{ClaimsError, Result};
use crate::identity::keyring::decode_box_key;
use crate::identity::{Address, Identity, PublicIdentity};

use super::body::MessageBody;

/// A plaintext protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub body: MessageBody,
    /// Microseconds since the Unix epoch.
    pub created_at: u64,
    pub sender_address: Address,
    pub sender_box_public_key: String,
    pub receiver_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Set on the receiving side only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<u64>,
}

/// The transport form of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMessage {
    pub message: String,
    pub nonce: String,
    pub created_at: u64,
    pub hash: String,
    pub signature: String,
    pub sender_address: Address,
    pub sender_box_public_key: String,
    pub receiver_address: Address,
}

impl EncryptedMessage {
    fn compute_hash(&self) -> String {
        hash_str(&format!("{}{}{}", self.message, self.nonce, self.created_at))
    }

    /// Check the hash and the sender's signature over it.
    pub fn ensure_hash_and_signature(&self) -> Result<()> {
        if self.compute_hash() != self.hash {
            return Err(ClaimsError::MessageHashMismatch);
        }
        if !signing::verify(self.hash.as_bytes(), &self.signature, &self.sender_address) {
            return Err(ClaimsError::MessageSignatureInvalid);
        }
        Ok(())
    }
}

impl Message {
    /// A new message from `sender` to `receiver`, stamped now.
    pub fn new(body: MessageBody, sender: &Identity, receiver: &PublicIdentity) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            body,
            created_at: crate::time::now_micros(),
            sender_address: sender.address(),
            sender_box_public_key: sender.public_identity().box_public_key,
            receiver_address: receiver.address.clone(),
            in_reply_to: None,
            references: Vec::new(),
            received_at: None,
        }
    }

    /// Mark this message as an answer to `original`.
    pub fn in_reply_to(mut self, original: &Message) -> Self {
        self.in_reply_to = Some(original.message_id.clone());
        self.references = original.references.clone();
        self.references.push(original.message_id.clone());
        self
    }

    /// RFC 3339 rendering of `created_at`.
    pub fn created_at_rfc3339(&self) -> String {
        crate::time::micros_to_rfc3339(self.created_at)
    }

    /// Encrypt to `receiver` and sign as `sender`.
    ///
    /// `sender` must be the identity the message was created for.
    pub fn encrypt(&self, sender: &Identity, receiver: &PublicIdentity) -> Result<EncryptedMessage> {
        if sender.address() != self.sender_address || receiver.address != self.receiver_address {
            return Err(ClaimsError::SenderMismatch);
        }
        let plaintext =
            serde_json::to_vec(self).map_err(|e| ClaimsError::SerializationError(e.to_string()))?;
        let payload = encryption::encrypt_asymmetric(
            &plaintext,
            sender.box_key_pair(),
            &receiver.box_public_key_bytes()?,
        )?;

        let mut encrypted = EncryptedMessage {
            message: B64.encode(&payload.ciphertext),
            nonce: B64.encode(payload.nonce),
            created_at: self.created_at,
            hash: String::new(),
            signature: String::new(),
            sender_address: self.sender_address.clone(),
            sender_box_public_key: self.sender_box_public_key.clone(),
            receiver_address: self.receiver_address.clone(),
        };
        encrypted.hash = encrypted.compute_hash();
        encrypted.signature = sender.sign_str(&encrypted.hash);
        log::debug!(
            "encrypted {} message {} for {}",
            self.body.kind(),
            self.message_id,
            self.receiver_address
        );
        Ok(encrypted)
    }

    /// Open an envelope addressed to `receiver`.
    pub fn decrypt(encrypted: &EncryptedMessage, receiver: &Identity) -> Result<Self> {
        encrypted.ensure_hash_and_signature()?;

        let ciphertext = B64
            .decode(&encrypted.message)
            .map_err(|_| ClaimsError::MessageDecryptionFailed)?;
        let nonce: [u8; 12] = B64
            .decode(&encrypted.nonce)
            .ok()
            .and_then(|n| n.try_into().ok())
            .ok_or(ClaimsError::MessageDecryptionFailed)?;
        let sender_box_key = decode_box_key(&encrypted.sender_box_public_key)
            .map_err(|_| ClaimsError::MessageDecryptionFailed)?;
        let plaintext = encryption::decrypt_asymmetric(
            &EncryptedPayload { ciphertext, nonce },
            &sender_box_key,
            receiver.box_key_pair(),
        )
        .ok_or(ClaimsError::MessageDecryptionFailed)?;

        let mut message: Message = serde_json::from_slice(&plaintext)
            .map_err(|e| ClaimsError::MessageParseFailed(e.to_string()))?;

        if message.sender_address != encrypted.sender_address
            || message.created_at != encrypted.created_at
        {
            log::warn!("message {}: envelope does not match contents", message.message_id);
            return Err(ClaimsError::SenderMismatch);
        }
        message.ensure_owner_is_sender()?;

        message.received_at = Some(crate::time::now_micros());
        log::debug!(
            "decrypted {} message {} from {}",
            message.body.kind(),
            message.message_id,
            message.sender_address
        );
        Ok(message)
    }

    /// Content that names an owner must be owned by the sender.
    pub fn ensure_owner_is_sender(&self) -> Result<()> {
        let sender = Some(&self.sender_address);
        let owned = match &self.body {
            MessageBody::RequestAttestationForClaim(request) => {
                request.request_for_attestation.claim.owner.as_ref() == sender
            }
            MessageBody::SubmitAttestationForClaim(attestation) => {
                Some(&attestation.owner) == sender
            }
            MessageBody::SubmitClaimsForCtypes(credentials) => credentials
                .iter()
                .all(|credential| credential.request.claim.owner.as_ref() == sender),
            _ => true,
        };
        if owned {
            Ok(())
        } else {
            Err(ClaimsError::SenderMismatch)
        }
    }
}
