//! Object references and the local artifact snapshot model.
//!
//! An [`ObjectArtifact`] is this system's persisted best-known snapshot of
//! one remote object: its last observed reference, ownership, and lifecycle
//! timestamps. Artifacts live in a per-network [`ArtifactLedger`], keyed by
//! object id, at most one per key. Terminal changes (deleted, wrapped) mark
//! an artifact rather than removing it, so the ledger doubles as an
//! append-only audit trail.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::{is_hex_address, normalize_address};
use crate::owner::Owner;

/// Identifies an exact historical state of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: String,
    pub version: u64,
    pub digest: String,
}

/// Reference to a shared object, usable as a transaction argument.
///
/// `initial_shared_version` is kept in its wire string form and is required
/// to be non-empty by the resolver before one of these is ever produced.
/// `mutable` declares whether the transaction intends to write the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedObjectRef {
    pub object_id: String,
    pub initial_shared_version: String,
    pub mutable: bool,
}

/// The local best-known snapshot of one remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectArtifact {
    pub object_id: String,
    /// Fully-qualified type, e.g. `0x2::coin::Coin<0x2::sui::SUI>`.
    pub object_type: String,
    /// Leading address segment of `object_type`, normalized.
    pub package_id: String,
    pub owner: Owner,
    pub version: u64,
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped_at: Option<DateTime<Utc>>,
}

impl ObjectArtifact {
    /// Create an artifact with no lifecycle timestamps set. The package id
    /// is derived from the type string.
    pub fn new(
        object_id: impl Into<String>,
        object_type: impl Into<String>,
        owner: Owner,
        version: u64,
        digest: impl Into<String>,
    ) -> Self {
        let object_type = object_type.into();
        let package_id = package_id_of_type(&object_type).unwrap_or_default();
        Self {
            object_id: normalize_address(&object_id.into()),
            object_type,
            package_id,
            owner,
            version,
            digest: digest.into(),
            created_at: None,
            mutated_at: None,
            deleted_at: None,
            wrapped_at: None,
        }
    }

    /// Builder: set the creation timestamp.
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Builder: set the mutation timestamp.
    pub fn mutated(mut self, at: DateTime<Utc>) -> Self {
        self.mutated_at = Some(at);
        self
    }

    /// The exact reference this artifact last observed, as bound into
    /// transaction arguments.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.object_id.clone(),
            version: self.version,
            digest: self.digest.clone(),
        }
    }

    /// Whether this artifact has been marked deleted or wrapped. Terminal
    /// artifacts are retained for audit but excluded from latest-of-type
    /// resolution.
    pub fn is_terminal(&self) -> bool {
        self.deleted_at.is_some() || self.wrapped_at.is_some()
    }

    /// Whether the fully-qualified type contains the given suffix.
    pub fn matches_type(&self, type_suffix: &str) -> bool {
        !type_suffix.is_empty() && self.object_type.contains(type_suffix)
    }

    /// The most recent lifecycle timestamp, for recency ordering:
    /// mutation wins over creation.
    pub fn last_touched(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.mutated_at, self.created_at)
    }
}

/// Extract the leading package address from a fully-qualified type string
/// such as `0xabc::pool::Pool<0x2::sui::SUI>`.
///
/// Returns `None` when the leading segment is not a hex address.
pub fn package_id_of_type(type_str: &str) -> Option<String> {
    let head = type_str.split("::").next()?.trim();
    if is_hex_address(head) {
        Some(normalize_address(head))
    } else {
        None
    }
}

/// Per-network collection of artifacts, keyed by normalized object id.
///
/// A `BTreeMap` keeps the persisted JSON key-ordered and diffable.
pub type ArtifactLedger = BTreeMap<String, ObjectArtifact>;

/// Merge one observation into a ledger under the non-regression law: the
/// incoming artifact replaces the stored one only if its version is not
/// older. Returns whether the ledger changed.
pub fn merge_artifact(ledger: &mut ArtifactLedger, incoming: ObjectArtifact) -> bool {
    match ledger.get(&incoming.object_id) {
        Some(existing) if incoming.version < existing.version => false,
        _ => {
            ledger.insert(incoming.object_id.clone(), incoming);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(id: &str, version: u64) -> ObjectArtifact {
        ObjectArtifact::new(
            id,
            "0xabc::mod::Thing",
            Owner::Address("0x9".to_string()),
            version,
            format!("digest-{version}"),
        )
    }

    #[test]
    fn test_new_derives_package_id() {
        let art = artifact("0x10", 1);
        assert!(art.package_id.ends_with("abc"));
        assert_eq!(art.package_id.len(), 66);
    }

    #[test]
    fn test_package_id_of_type() {
        let pkg = package_id_of_type("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        assert!(pkg.ends_with("2"));
        assert_eq!(pkg.len(), 66);

        // Non-address heads yield None.
        assert_eq!(package_id_of_type("pkg::mod::Thing"), None);
        assert_eq!(package_id_of_type("vector<u8>"), None);
        assert_eq!(package_id_of_type(""), None);
    }

    #[test]
    fn test_merge_non_regression() {
        let mut ledger = ArtifactLedger::new();
        assert!(merge_artifact(&mut ledger, artifact("0x10", 5)));

        // Older observation never regresses the stored artifact.
        assert!(!merge_artifact(&mut ledger, artifact("0x10", 3)));
        let stored = ledger.values().next().unwrap();
        assert_eq!(stored.version, 5);
        assert_eq!(stored.digest, "digest-5");

        // Same version is last-write-wins.
        let mut same = artifact("0x10", 5);
        same.digest = "digest-5b".to_string();
        assert!(merge_artifact(&mut ledger, same));
        assert_eq!(ledger.values().next().unwrap().digest, "digest-5b");

        // Newer replaces.
        assert!(merge_artifact(&mut ledger, artifact("0x10", 9)));
        assert_eq!(ledger.values().next().unwrap().version, 9);
    }

    #[test]
    fn test_object_ref_snapshot() {
        let art = artifact("0x10", 5);
        let object_ref = art.object_ref();
        assert_eq!(object_ref.object_id, art.object_id);
        assert_eq!(object_ref.version, 5);
        assert_eq!(object_ref.digest, "digest-5");
    }

    #[test]
    fn test_terminal_markers() {
        let mut art = artifact("0x11", 2);
        assert!(!art.is_terminal());
        art.deleted_at = Some(Utc::now());
        assert!(art.is_terminal());

        let mut art = artifact("0x12", 2);
        art.wrapped_at = Some(Utc::now());
        assert!(art.is_terminal());
    }

    #[test]
    fn test_matches_type() {
        let art = artifact("0x10", 1);
        assert!(art.matches_type("Thing"));
        assert!(art.matches_type("mod::Thing"));
        assert!(!art.matches_type("Other"));
        assert!(!art.matches_type(""));
    }

    #[test]
    fn test_ledger_keys_are_ordered() {
        let mut ledger = ArtifactLedger::new();
        merge_artifact(&mut ledger, artifact("0xb", 1));
        merge_artifact(&mut ledger, artifact("0xa", 1));
        let keys: Vec<_> = ledger.keys().cloned().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
