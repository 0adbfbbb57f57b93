//! Compact positional encoding for transport.
//!
//! Each entity compresses to a JSON array whose positions are fixed:
//!
//! | Entity                | Tuple                                                                                   |
//! |-----------------------|-----------------------------------------------------------------------------------------|
//! | NonceHash             | `[hash, nonce\|null]`                                                                   |
//! | Claim                 | `[contents, owner\|null, ctypeHash]`                                                    |
//! | Attestation           | `[claimHash, ctypeHash, owner, revoked, delegationId\|null]`                            |
//! | RequestForAttestation | `[claim, attributeTree, ownerCommit, signature, schemaCommit, rootHash, [legitimations], delegationId\|null]` |
//! | AttestedClaim         | `[request, attestation]`                                                                |
//!
//! Decompression rejects wrong arity and wrong element types.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::attestation::Attestation;
use crate::claim::Claim;
use crate::credential::AttestedClaim;
use crate::crypto::H256;
use crate::error::{ClaimsError, Result};
use crate::identity::Address;
use crate::request::{NonceHash, RequestForAttestation};

/// Conversion to and from the positional tuple form.
pub trait Compress: Sized {
    const ENTITY: &'static str;

    fn compress(&self) -> Value;

    fn decompress(value: &Value) -> Result<Self>;
}

struct Tuple<'a> {
    items: &'a [Value],
    entity: &'static str,
}

impl<'a> Tuple<'a> {
    fn new(value: &'a Value, len: usize, entity: &'static str) -> Result<Self> {
        match value {
            Value::Array(items) if items.len() == len => Ok(Self { items, entity }),
            _ => Err(ClaimsError::DecompressionFailed(entity)),
        }
    }

    fn fail(&self) -> ClaimsError {
        ClaimsError::DecompressionFailed(self.entity)
    }

    fn value(&self, index: usize) -> &'a Value {
        &self.items[index]
    }

    fn str(&self, index: usize) -> Result<&'a str> {
        self.items[index].as_str().ok_or_else(|| self.fail())
    }

    fn hash(&self, index: usize) -> Result<H256> {
        self.str(index)?.parse().map_err(|_| self.fail())
    }

    fn opt_hash(&self, index: usize) -> Result<Option<H256>> {
        match &self.items[index] {
            Value::Null => Ok(None),
            _ => self.hash(index).map(Some),
        }
    }

    fn bool(&self, index: usize) -> Result<bool> {
        self.items[index].as_bool().ok_or_else(|| self.fail())
    }

    fn object(&self, index: usize) -> Result<&'a Map<String, Value>> {
        self.items[index].as_object().ok_or_else(|| self.fail())
    }

    fn array(&self, index: usize) -> Result<&'a Vec<Value>> {
        self.items[index].as_array().ok_or_else(|| self.fail())
    }
}

fn opt_to_value<T: ToString>(value: Option<T>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

impl Compress for NonceHash {
    const ENTITY: &'static str = "NonceHash";

    fn compress(&self) -> Value {
        Value::Array(vec![
            Value::String(self.hash.to_hex()),
            opt_to_value(self.nonce.as_deref()),
        ])
    }

    fn decompress(value: &Value) -> Result<Self> {
        let t = Tuple::new(value, 2, Self::ENTITY)?;
        let nonce = match t.value(1) {
            Value::Null => None,
            _ => Some(t.str(1)?.to_string()),
        };
        Ok(Self {
            hash: t.hash(0)?,
            nonce,
        })
    }
}

impl Compress for Claim {
    const ENTITY: &'static str = "Claim";

    fn compress(&self) -> Value {
        Value::Array(vec![
            Value::Object(self.contents.clone()),
            opt_to_value(self.owner.as_ref().map(Address::as_str)),
            Value::String(self.ctype_hash.to_hex()),
        ])
    }

    fn decompress(value: &Value) -> Result<Self> {
        let t = Tuple::new(value, 3, Self::ENTITY)?;
        let owner = match t.value(1) {
            Value::Null => None,
            _ => Some(Address::new_unchecked(t.str(1)?)),
        };
        Ok(Self {
            contents: t.object(0)?.clone(),
            owner,
            ctype_hash: t.hash(2)?,
        })
    }
}

impl Compress for Attestation {
    const ENTITY: &'static str = "Attestation";

    fn compress(&self) -> Value {
        Value::Array(vec![
            Value::String(self.claim_hash.to_hex()),
            Value::String(self.ctype_hash.to_hex()),
            Value::String(self.owner.as_str().to_string()),
            Value::Bool(self.revoked),
            opt_to_value(self.delegation_id),
        ])
    }

    fn decompress(value: &Value) -> Result<Self> {
        let t = Tuple::new(value, 5, Self::ENTITY)?;
        Ok(Self {
            claim_hash: t.hash(0)?,
            ctype_hash: t.hash(1)?,
            owner: Address::new_unchecked(t.str(2)?),
            revoked: t.bool(3)?,
            delegation_id: t.opt_hash(4)?,
        })
    }
}

impl Compress for RequestForAttestation {
    const ENTITY: &'static str = "RequestForAttestation";

    fn compress(&self) -> Value {
        let tree: Map<String, Value> = self
            .attribute_tree
            .iter()
            .map(|(key, commit)| (key.clone(), commit.compress()))
            .collect();
        Value::Array(vec![
            self.claim.compress(),
            Value::Object(tree),
            self.claim_owner_commit.compress(),
            Value::String(self.claimer_signature.clone()),
            self.schema_commit.compress(),
            Value::String(self.root_hash.to_hex()),
            Value::Array(self.legitimations.iter().map(|l| l.compress()).collect()),
            opt_to_value(self.delegation_id),
        ])
    }

    fn decompress(value: &Value) -> Result<Self> {
        let t = Tuple::new(value, 8, Self::ENTITY)?;
        let attribute_tree = t
            .object(1)?
            .iter()
            .map(|(key, commit)| Ok((key.clone(), NonceHash::decompress(commit)?)))
            .collect::<Result<IndexMap<_, _>>>()?;
        let legitimations = t
            .array(6)?
            .iter()
            .map(AttestedClaim::decompress)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            claim: Claim::decompress(t.value(0))?,
            legitimations,
            claim_owner_commit: NonceHash::decompress(t.value(2))?,
            schema_commit: NonceHash::decompress(t.value(4))?,
            attribute_tree,
            delegation_id: t.opt_hash(7)?,
            root_hash: t.hash(5)?,
            claimer_signature: t.str(3)?.to_string(),
        })
    }
}

impl Compress for AttestedClaim {
    const ENTITY: &'static str = "AttestedClaim";

    fn compress(&self) -> Value {
        Value::Array(vec![self.request.compress(), self.attestation.compress()])
    }

    fn decompress(value: &Value) -> Result<Self> {
        let t = Tuple::new(value, 2, Self::ENTITY)?;
        Ok(Self {
            request: RequestForAttestation::decompress(t.value(0))?,
            attestation: Attestation::decompress(t.value(1))?,
        })
    }
}
