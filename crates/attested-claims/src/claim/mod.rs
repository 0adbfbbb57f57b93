//! Claims: typed assertions about a subject.
//!
//! A claim names the CType it conforms to, carries the attribute values,
//! and records its owner. The owner is optional only because a holder may
//! redact it from a presentation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::H256;
use crate::ctype::SchemaValidator;
use crate::error::{ClaimsError, Result};
use crate::identity::Address;

/// A typed assertion about the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub ctype_hash: H256,
    pub contents: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
}

impl Claim {
    /// Build a claim, checking `contents` against the CType and `owner`
    /// for well-formedness.
    pub fn new(
        ctype: &dyn SchemaValidator,
        contents: Map<String, Value>,
        owner: Address,
    ) -> Result<Self> {
        owner.public_key_bytes()?;
        if !ctype.validate(&contents) {
            log::debug!("claim contents rejected by ctype {}", ctype.schema_hash());
            return Err(ClaimsError::InvalidClaimStructure);
        }
        Ok(Self {
            ctype_hash: ctype.schema_hash(),
            contents,
            owner: Some(owner),
        })
    }

    /// Build a claim from a JSON object literal.
    pub fn from_value(ctype: &dyn SchemaValidator, contents: Value, owner: Address) -> Result<Self> {
        match contents {
            Value::Object(map) => Self::new(ctype, map, owner),
            _ => Err(ClaimsError::InvalidClaimStructure),
        }
    }
}
