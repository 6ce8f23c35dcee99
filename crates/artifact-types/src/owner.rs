//! Object ownership as a closed tagged variant.
//!
//! The remote ledger reports ownership in several JSON shapes: the bare
//! string `"Immutable"`, or a single-key record such as
//! `{"AddressOwner": "0x9"}` or `{"Shared": {"initial_shared_version": "9"}}`.
//! All of them collapse into [`Owner`]; an unrecognized shape is a
//! [`MalformedResponse`](crate::ArtifactError::MalformedResponse), never a
//! stringified fallback.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::normalize_address;
use crate::error::ArtifactError;

/// Who may read and write a ledger object. Exactly one variant holds at any
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// Owned by a single account address.
    Address(String),
    /// Owned by another object (dynamic fields).
    Object(String),
    /// Readable and writable by any transaction. `initial_shared_version` is
    /// the version at which the object became shared; the ledger requires it
    /// to order concurrent access. It may arrive empty, which resolution
    /// treats as a failure rather than a default.
    Shared { initial_shared_version: String },
    /// Frozen; never writable again.
    Immutable,
}

impl Owner {
    /// Variant name for error messages and summaries.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Owner::Address(_) => "Address",
            Owner::Object(_) => "Object",
            Owner::Shared { .. } => "Shared",
            Owner::Immutable => "Immutable",
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Owner::Shared { .. })
    }

    /// Parse the owner field of a ledger RPC response.
    pub fn from_wire(value: &Value) -> Result<Self, ArtifactError> {
        match value {
            Value::String(s) if s == "Immutable" => Ok(Owner::Immutable),
            Value::Object(map) => {
                if let Some(addr) = map.get("AddressOwner") {
                    let addr = addr.as_str().ok_or_else(|| {
                        ArtifactError::malformed("AddressOwner is not a string")
                    })?;
                    return Ok(Owner::Address(normalize_address(addr)));
                }
                if let Some(parent) = map.get("ObjectOwner") {
                    let parent = parent.as_str().ok_or_else(|| {
                        ArtifactError::malformed("ObjectOwner is not a string")
                    })?;
                    return Ok(Owner::Object(normalize_address(parent)));
                }
                if let Some(shared) = map.get("Shared") {
                    let initial = shared
                        .get("initial_shared_version")
                        .map(|v| match v {
                            Value::String(s) => Ok(s.clone()),
                            Value::Number(n) => Ok(n.to_string()),
                            other => Err(ArtifactError::malformed(format!(
                                "initial_shared_version has unexpected type: {other}"
                            ))),
                        })
                        .transpose()?
                        .unwrap_or_default();
                    return Ok(Owner::Shared {
                        initial_shared_version: initial,
                    });
                }
                if map.contains_key("Immutable") {
                    return Ok(Owner::Immutable);
                }
                Err(ArtifactError::malformed(format!(
                    "unrecognized owner record: {value}"
                )))
            }
            other => Err(ArtifactError::malformed(format!(
                "unrecognized owner shape: {other}"
            ))),
        }
    }
}
