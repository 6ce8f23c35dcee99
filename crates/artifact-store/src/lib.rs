//! Persisted artifact ledgers, one JSON document per network.
//!
//! The store is the only shared mutable resource in the system. It is
//! protected by atomic file replacement plus re-read-before-write merging in
//! [`ArtifactStore::commit`], not by a lock; see that method for the exact
//! guarantee.

pub mod paths;
pub mod store;

pub use paths::{atomic_write, atomic_write_json, default_store_root, ledger_path};
pub use store::{ArtifactStore, LedgerStats};
