//! Canonical address formatting for object, package, and account ids.
//!
//! Storage and comparison always use the full 64-char form; short form is for
//! display to users.

use crate::error::ArtifactError;

/// Parse and normalize a caller-supplied object id.
///
/// Accepts short or long hex forms with or without the `0x` prefix and
/// returns the canonical full form. A missing or malformed id is a
/// precondition failure, never retried.
pub fn parse_object_id(id: &str) -> Result<String, ArtifactError> {
    let s = id.trim();
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if hex_str.is_empty() {
        return Err(ArtifactError::precondition(
            "empty object id; supply a hex id such as 0x2",
        ));
    }
    if !hex_str.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ArtifactError::precondition(format!(
            "invalid hex in object id `{id}`"
        )));
    }
    if hex_str.len() > 64 {
        return Err(ArtifactError::precondition(format!(
            "object id `{id}` is longer than 32 bytes"
        )));
    }

    Ok(format!("0x{:0>64}", hex_str.to_ascii_lowercase()))
}

/// Normalize an address to the full 64-char lowercase form.
///
/// Best-effort counterpart of [`parse_object_id`] for values that came from
/// the remote ledger rather than the caller; invalid input is returned
/// trimmed but otherwise untouched.
pub fn normalize_address(addr: &str) -> String {
    match parse_object_id(addr) {
        Ok(full) => full,
        Err(_) => addr.trim().to_string(),
    }
}

/// Format an address to short form (0x2 instead of 0x0000...0002).
///
/// This is the preferred format for display to users and in summaries.
pub fn short_address(addr: &str) -> String {
    let hex = addr.trim().strip_prefix("0x").unwrap_or(addr.trim());
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed.to_ascii_lowercase())
    }
}

/// Whether a string looks like a hex address (with or without `0x`).
pub fn is_hex_address(s: &str) -> bool {
    let hex = s.trim().strip_prefix("0x").unwrap_or(s.trim());
    !hex.is_empty() && hex.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
}
