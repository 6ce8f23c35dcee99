//! Shared types for the sui-artifacts workspace.
//!
//! This crate provides the foundational types used across the workspace:
//! - [`ObjectRef`] / [`SharedObjectRef`] - references to exact object states
//! - [`Owner`](owner::Owner) - closed tagged variant over object ownership
//! - [`ObjectArtifact`] / [`ArtifactLedger`] - the local snapshot model
//! - [`ArtifactError`] - the error taxonomy shared by every component
//!
//! ## Design Principles
//!
//! 1. **String IDs for JSON compatibility**: Object and package IDs use `String`
//!    rather than a fixed-width address type to simplify JSON serialization and
//!    avoid hex parsing at boundaries. The [`address`] module provides the
//!    normalization helpers; storage always uses the full 64-char form.
//!
//! 2. **Closed ownership variants**: the remote ledger reports ownership in
//!    several JSON shapes. They all collapse into the four-variant
//!    [`Owner`](owner::Owner) enum; an unrecognized shape is an error, never a
//!    stringified fallback.

pub mod address;
pub mod artifact;
pub mod error;
pub mod owner;

pub use artifact::{
    merge_artifact, package_id_of_type, ArtifactLedger, ObjectArtifact, ObjectRef,
    SharedObjectRef,
};
pub use error::ArtifactError;
pub use owner::Owner;

use std::time::Duration;

/// Configuration for retry behavior on network operations.
#[derive(Debug, Copy, Clone)]
pub struct RetryConfig {
    /// Number of retry attempts after the initial try.
    pub retries: usize,
    /// Initial backoff duration between retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl RetryConfig {
    /// Create a new RetryConfig with the specified parameters.
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(5000),
        }
    }
}
