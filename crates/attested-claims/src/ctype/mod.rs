//! CTypes: claim type schemas.
//!
//! A CType is a restricted JSON schema describing the attributes a claim
//! may carry. Its hash is the schema identity referenced by claims,
//! requests, attestations and delegation roots.

pub mod schema;
pub mod validator;

pub use schema::{CType, CTypeSchema, PropertySchema, PropertyType, CTYPE_META_SCHEMA};
pub use validator::SchemaValidator;
