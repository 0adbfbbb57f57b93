//! CType schema structure, hashing and content validation.
//!
//! Schema shape:
//! ```json
//! {
//!     "$id": "kilt:ctype:0x…",
//!     "$schema": "http://kilt-protocol.org/draft-01/ctype#",
//!     "title": "Person",
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "type": "integer" }
//!     }
//! }
//! ```
//!
//! The hash covers everything but `$id`; `$id` is derived from the hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::{hash_object_as_string, H256};
use crate::error::{ClaimsError, Result};
use crate::identity::{Address, Identity};
use crate::ledger::Ledger;

use super::validator::SchemaValidator;

/// URI every CType schema must declare in `$schema`.
pub const CTYPE_META_SCHEMA: &str = "http://kilt-protocol.org/draft-01/ctype#";

const CTYPE_ID_PREFIX: &str = "kilt:ctype:";

const SUPPORTED_FORMATS: &[&str] = &["date", "time", "uri"];

/// JSON type of a single claim attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
}

/// Declaration of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl PropertySchema {
    pub fn new(kind: PropertyType) -> Self {
        Self { kind, format: None }
    }

    fn accepts(&self, value: &Value) -> bool {
        let type_ok = match self.kind {
            PropertyType::String => value.is_string(),
            PropertyType::Integer => value.is_i64() || value.is_u64(),
            PropertyType::Number => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
        };
        if !type_ok {
            return false;
        }
        match (self.format.as_deref(), value.as_str()) {
            (Some("date"), Some(s)) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            (Some("time"), Some(s)) => chrono::NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok(),
            (Some("uri"), Some(s)) => s.split_once(':').is_some_and(|(scheme, _)| !scheme.is_empty()),
            _ => true,
        }
    }
}

/// The schema document of a CType.
///
/// Keywords outside the meta-schema are rejected rather than dropped, so
/// the hash always covers the document as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CTypeSchema {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: BTreeMap<String, PropertySchema>,
}

impl CTypeSchema {
    /// Start a schema with the given title and no properties.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            schema: CTYPE_META_SCHEMA.to_string(),
            title: title.into(),
            kind: "object".to_string(),
            properties: BTreeMap::new(),
        }
    }

    /// Declare an attribute.
    pub fn property(mut self, name: impl Into<String>, kind: PropertyType) -> Self {
        self.properties.insert(name.into(), PropertySchema::new(kind));
        self
    }

    /// Declare a string attribute with a format (`date`, `time`, `uri`).
    pub fn formatted_property(mut self, name: impl Into<String>, format: &str) -> Self {
        self.properties.insert(
            name.into(),
            PropertySchema {
                kind: PropertyType::String,
                format: Some(format.to_string()),
            },
        );
        self
    }

    /// Hash of the schema without its `$id`.
    pub fn compute_hash(&self) -> Result<H256> {
        let mut value = serde_json::to_value(self)
            .map_err(|e| ClaimsError::SerializationError(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.remove("$id");
        }
        Ok(hash_object_as_string(&value, None))
    }

    fn check_meta_schema(&self) -> Result<()> {
        if self.schema != CTYPE_META_SCHEMA {
            return Err(ClaimsError::InvalidCTypeStructure(format!(
                "unsupported $schema: {}",
                self.schema
            )));
        }
        if self.kind != "object" {
            return Err(ClaimsError::InvalidCTypeStructure(format!(
                "type must be \"object\", got \"{}\"",
                self.kind
            )));
        }
        for (name, property) in &self.properties {
            if name.is_empty() {
                return Err(ClaimsError::InvalidCTypeStructure(
                    "empty property name".into(),
                ));
            }
            if let Some(format) = &property.format {
                if property.kind != PropertyType::String {
                    return Err(ClaimsError::InvalidCTypeStructure(format!(
                        "property '{name}' has a format but is not a string"
                    )));
                }
                if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                    return Err(ClaimsError::InvalidCTypeStructure(format!(
                        "property '{name}' has unsupported format '{format}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A validated schema together with its hash and optional owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CType {
    pub schema: CTypeSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    pub hash: H256,
}

impl CType {
    /// Check `schema` against the meta-schema, hash it and fill in `$id`.
    ///
    /// A schema that already carries an `$id` must carry the right one.
    pub fn from_schema(mut schema: CTypeSchema, owner: Option<Address>) -> Result<Self> {
        schema.check_meta_schema()?;
        let hash = schema.compute_hash()?;
        let expected_id = format!("{CTYPE_ID_PREFIX}{hash}");
        if !schema.id.is_empty() && schema.id != expected_id {
            return Err(ClaimsError::InvalidCTypeStructure(format!(
                "$id {} does not match schema hash {hash}",
                schema.id
            )));
        }
        schema.id = expected_id;
        Ok(Self {
            schema,
            owner,
            hash,
        })
    }

    /// Parse an untyped schema document.
    pub fn from_schema_value(value: Value, owner: Option<Address>) -> Result<Self> {
        let schema: CTypeSchema = serde_json::from_value(value)
            .map_err(|e| ClaimsError::InvalidCTypeStructure(e.to_string()))?;
        Self::from_schema(schema, owner)
    }

    /// Register the CType on the ledger with `identity` as owner.
    pub fn store(&mut self, identity: &Identity, ledger: &dyn Ledger) -> Result<()> {
        ledger.submit_ctype(&self.hash, identity)?;
        log::info!("stored ctype {}", self.hash);
        self.owner = Some(identity.address());
        Ok(())
    }

    /// Whether the CType is registered on the ledger.
    pub fn verify_stored(&self, ledger: &dyn Ledger) -> Result<bool> {
        Ok(ledger.query_ctype(&self.hash)?.is_some())
    }
}

impl SchemaValidator for CType {
    fn validate(&self, contents: &Map<String, Value>) -> bool {
        contents.iter().all(|(key, value)| {
            self.schema
                .properties
                .get(key)
                .is_some_and(|property| property.accepts(value))
        })
    }

    fn schema_hash(&self) -> H256 {
        self.hash
    }
}
