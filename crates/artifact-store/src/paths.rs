//! Path helpers and the atomic write discipline for artifact files.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Default store root: `~/.sui-artifacts`, falling back to a relative
/// directory when no home is available.
pub fn default_store_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".sui-artifacts"))
        .unwrap_or_else(|| PathBuf::from(".sui-artifacts"))
}

/// Path of the one JSON document holding a network's ledger.
pub fn ledger_path(root: &Path, network: &str) -> PathBuf {
    root.join(format!("{network}.json"))
}

/// Ensure all parent directories exist for a path.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("failed to create directory {}: {e}", parent.display()))?;
    }
    Ok(())
}

/// Write a file atomically (write to a temp file, then rename).
///
/// The temp name carries the process id so concurrent writers never share a
/// staging file; the rename itself is atomic on POSIX filesystems.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let tmp_path = path.with_extension(format!("{}.tmp", std::process::id()));
    std::fs::write(&tmp_path, contents)
        .map_err(|e| anyhow!("failed to write temp file {}: {e}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        anyhow!(
            "failed to rename {} to {}: {e}",
            tmp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

/// Write a JSON document atomically, pretty-printed with a trailing newline
/// so the file stays human-diffable.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json =
        serde_json::to_vec_pretty(value).map_err(|e| anyhow!("failed to serialize JSON: {e}"))?;
    json.push(b'\n');
    atomic_write(path, &json)
}
