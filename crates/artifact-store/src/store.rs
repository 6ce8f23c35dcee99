//! Persisted, network-scoped artifact ledgers.
//!
//! One JSON document per network, keyed by object id. Writes are atomic
//! (temp-file-plus-rename), and [`ArtifactStore::commit`] merges against a
//! freshly re-read snapshot immediately before persisting, so two processes
//! reconciling disjoint objects against the same file both survive. On
//! overlapping keys the last reader wins per key; the guarantee across
//! processes is eventual consistency per key, not global serializability.

use std::path::{Path, PathBuf};

use anyhow::Context;

use sui_artifact_types::{merge_artifact, ArtifactError, ArtifactLedger, ObjectArtifact};

use crate::paths::{atomic_write_json, default_store_root, ledger_path};

/// File-backed store of per-network artifact ledgers.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create store root {}", root.display()))
            .map_err(ArtifactError::store)?;
        Ok(Self { root })
    }

    /// Open the default store under the user's home directory.
    pub fn open_default() -> Result<Self, ArtifactError> {
        Self::new(default_store_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a network's ledger. A missing file is an empty ledger, not an
    /// error.
    pub fn read(&self, network: &str) -> Result<ArtifactLedger, ArtifactError> {
        let path = self.ledger_file(network)?;
        if !path.exists() {
            return Ok(ArtifactLedger::new());
        }

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))
            .map_err(ArtifactError::store)?;
        let ledger: ArtifactLedger = serde_json::from_str(&json)
            .with_context(|| format!("parse {}", path.display()))
            .map_err(ArtifactError::store)?;

        tracing::debug!(network, artifacts = ledger.len(), "ledger read");
        Ok(ledger)
    }

    /// Atomically replace a network's ledger.
    pub fn write(&self, network: &str, ledger: &ArtifactLedger) -> Result<(), ArtifactError> {
        let path = self.ledger_file(network)?;
        atomic_write_json(&path, ledger).map_err(ArtifactError::store)?;
        tracing::debug!(network, artifacts = ledger.len(), "ledger written");
        Ok(())
    }

    /// Merge `updates` into a network's ledger and persist the result.
    ///
    /// The file is re-read immediately before the write and each update is
    /// merged into that fresh snapshot under the non-regression law, so
    /// creations recorded by a concurrent writer are not clobbered. Returns
    /// the merged ledger as persisted.
    pub fn commit(
        &self,
        network: &str,
        updates: ArtifactLedger,
    ) -> Result<ArtifactLedger, ArtifactError> {
        let mut ledger = self.read(network)?;
        let mut changed = 0usize;
        for artifact in updates.into_values() {
            if merge_artifact(&mut ledger, artifact) {
                changed += 1;
            }
        }
        self.write(network, &ledger)?;
        tracing::debug!(network, changed, "ledger committed");
        Ok(ledger)
    }

    /// The most recently observed live artifact whose type contains the
    /// given suffix. Deleted and wrapped artifacts are excluded; ties break
    /// by latest mutation, then creation.
    pub fn latest_of_type(
        &self,
        type_suffix: &str,
        network: &str,
    ) -> Result<Option<ObjectArtifact>, ArtifactError> {
        let ledger = self.read(network)?;
        Ok(ledger
            .into_values()
            .filter(|a| !a.is_terminal() && a.matches_type(type_suffix))
            .max_by_key(|a| a.last_touched()))
    }

    /// Like [`latest_of_type`](Self::latest_of_type), but a missing match is
    /// an error naming the query.
    pub fn require_latest_of_type(
        &self,
        type_suffix: &str,
        network: &str,
    ) -> Result<ObjectArtifact, ArtifactError> {
        self.latest_of_type(type_suffix, network)?
            .ok_or_else(|| ArtifactError::MissingArtifact {
                query: type_suffix.to_string(),
                network: network.to_string(),
            })
    }

    /// Live/terminal breakdown of a network's ledger, for summaries.
    pub fn stats(&self, network: &str) -> Result<LedgerStats, ArtifactError> {
        let ledger = self.read(network)?;
        let mut stats = LedgerStats {
            total: ledger.len(),
            ..LedgerStats::default()
        };
        for artifact in ledger.values() {
            if artifact.deleted_at.is_some() {
                stats.deleted += 1;
            } else if artifact.wrapped_at.is_some() {
                stats.wrapped += 1;
            } else {
                stats.live += 1;
            }
        }
        Ok(stats)
    }

    fn ledger_file(&self, network: &str) -> Result<PathBuf, ArtifactError> {
        if network.is_empty()
            || network.contains('/')
            || network.contains('\\')
            || network.contains("..")
        {
            return Err(ArtifactError::precondition(format!(
                "invalid network name `{network}`; use a plain name such as testnet"
            )));
        }
        Ok(ledger_path(&self.root, network))
    }
}

/// Counts of a ledger's artifacts by lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub total: usize,
    pub live: usize,
    pub deleted: usize,
    pub wrapped: usize,
}
