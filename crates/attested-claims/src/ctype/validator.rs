//! The schema validation seam consumed by [`Claim`](crate::claim::Claim).

use serde_json::{Map, Value};

use crate::crypto::H256;

/// Validates claim contents against a schema and names the schema by hash.
///
/// Implementations must be deterministic and independent of the order in
/// which the schema declares its properties.
pub trait SchemaValidator {
    /// Whether `contents` conforms to the schema.
    fn validate(&self, contents: &Map<String, Value>) -> bool;

    /// The hash identifying the schema.
    fn schema_hash(&self) -> H256;
}
