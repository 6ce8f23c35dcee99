//! Shared-reference resolution.
//!
//! Before a transaction may reference a shared object, the ledger requires
//! the version at which the object became shared. The resolver fetches
//! current ownership metadata and produces a [`SharedObjectRef`], failing
//! when the object is not actually shared or its shared-version metadata is
//! missing.

use futures::stream::{self, StreamExt};

use sui_artifact_transport::{retry::with_retries, LedgerRpc};
use sui_artifact_types::{
    address::parse_object_id, ArtifactError, Owner, RetryConfig, SharedObjectRef,
};

/// Resolves object ids into shared-object transaction arguments.
pub struct SharedResolver<R: LedgerRpc> {
    rpc: R,
    retry: RetryConfig,
}

impl<R: LedgerRpc> SharedResolver<R> {
    pub fn new(rpc: R) -> Self {
        Self {
            rpc,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Resolve one object id into a [`SharedObjectRef`], declaring whether
    /// this transaction intends to write it.
    ///
    /// Re-resolving the same id before its shared status changes yields an
    /// identical reference value.
    ///
    /// # Errors
    /// - [`ArtifactError::PreconditionFailed`] for a malformed or unknown id
    ///   (raised before/without retrying)
    /// - [`ArtifactError::NotShared`] when the owner is any other variant
    /// - [`ArtifactError::MissingSharedVersion`] when the shared owner
    ///   carries no version metadata
    /// - [`ArtifactError::RpcTransient`] when the network keeps failing
    ///   after the retry budget
    pub async fn resolve(
        &self,
        object_id: &str,
        mutable: bool,
    ) -> Result<SharedObjectRef, ArtifactError> {
        let object_id = parse_object_id(object_id)?;

        let meta = with_retries(&self.retry, || {
            let id = object_id.clone();
            let rpc = &self.rpc;
            async move { rpc.get_object(&id).await }
        })
        .await?;

        let meta = meta.ok_or_else(|| {
            ArtifactError::precondition(format!(
                "object {object_id} not found on the ledger; check the id and network"
            ))
        })?;

        match meta.owner {
            Owner::Shared {
                initial_shared_version,
            } => {
                if initial_shared_version.trim().is_empty() {
                    return Err(ArtifactError::MissingSharedVersion { object_id });
                }
                tracing::debug!(%object_id, %initial_shared_version, mutable, "shared ref resolved");
                Ok(SharedObjectRef {
                    object_id,
                    initial_shared_version,
                    mutable,
                })
            }
            other => Err(ArtifactError::NotShared {
                object_id,
                owner: other.variant_name().to_string(),
            }),
        }
    }

    /// Resolve several ids concurrently, preserving input order. Each id
    /// resolves (or fails) independently.
    pub async fn resolve_many(
        &self,
        object_ids: &[String],
        mutable: bool,
        concurrency: usize,
    ) -> Vec<(String, Result<SharedObjectRef, ArtifactError>)> {
        stream::iter(object_ids.iter().cloned())
            .map(|id| async move {
                let resolved = self.resolve(&id, mutable).await;
                (id, resolved)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_artifact_transport::test_utils::{owned_meta, shared_meta, MockLedger};
    use sui_artifact_types::address::parse_object_id;

    #[tokio::test]
    async fn test_resolve_shared_object() {
        let mock = MockLedger::new().with_object(shared_meta("0x2", 12, "9"));
        let resolver = SharedResolver::new(mock);

        let resolved = resolver.resolve("0x2", true).await.unwrap();
        assert_eq!(resolved.object_id, parse_object_id("0x2").unwrap());
        assert_eq!(resolved.initial_shared_version, "9");
        assert!(resolved.mutable);

        // Mutability defaults are the caller's choice, not sticky state.
        let readonly = resolver.resolve("0x2", false).await.unwrap();
        assert!(!readonly.mutable);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let mock = MockLedger::new().with_object(shared_meta("0x2", 12, "9"));
        let resolver = SharedResolver::new(mock);

        let first = resolver.resolve("0x2", true).await.unwrap();
        let second = resolver.resolve("0x2", true).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_empty_shared_version_fails() {
        let mock = MockLedger::new().with_object(shared_meta("0x4", 3, ""));
        let resolver = SharedResolver::new(mock);

        match resolver.resolve("0x4", false).await.unwrap_err() {
            ArtifactError::MissingSharedVersion { object_id } => {
                assert_eq!(object_id, parse_object_id("0x4").unwrap());
            }
            other => panic!("expected MissingSharedVersion, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_address_owned_fails_not_shared() {
        let mock = MockLedger::new().with_object(owned_meta("0x5", 3, "0x9"));
        let resolver = SharedResolver::new(mock);

        match resolver.resolve("0x5", false).await.unwrap_err() {
            ArtifactError::NotShared { object_id, owner } => {
                assert_eq!(object_id, parse_object_id("0x5").unwrap());
                assert_eq!(owner, "Address");
            }
            other => panic!("expected NotShared, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_malformed_id_fails_without_rpc() {
        let mock = MockLedger::new();
        let resolver = SharedResolver::new(mock);

        let err = resolver.resolve("0xzz", false).await.unwrap_err();
        assert_eq!(err.kind(), "precondition_failed");
        assert_eq!(resolver.rpc.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_precondition() {
        let mock = MockLedger::new();
        let resolver = SharedResolver::new(mock);

        let err = resolver.resolve("0xdead", false).await.unwrap_err();
        assert_eq!(err.kind(), "precondition_failed");
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_resolve_retries_transient_failures() {
        let mock = MockLedger::new().with_object(shared_meta("0x2", 12, "9"));
        mock.fail_next_gets(2, "connection reset by peer");

        let resolver = SharedResolver::new(mock).with_retry(RetryConfig::new(3, 1, 5));
        let resolved = resolver.resolve("0x2", false).await.unwrap();
        assert_eq!(resolved.initial_shared_version, "9");
        assert_eq!(resolver.rpc.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_resolve_surfaces_rpc_transient_after_budget() {
        let mock = MockLedger::new().with_object(shared_meta("0x2", 12, "9"));
        mock.fail_next_gets(5, "request timed out");

        let resolver = SharedResolver::new(mock).with_retry(RetryConfig::new(1, 1, 2));
        match resolver.resolve("0x2", false).await.unwrap_err() {
            ArtifactError::RpcTransient { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected RpcTransient, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_many_preserves_order() {
        let mock = MockLedger::new()
            .with_object(shared_meta("0x2", 1, "2"))
            .with_object(shared_meta("0x6", 1, "4"));
        let resolver = SharedResolver::new(mock);

        let ids = vec!["0x2".to_string(), "0x5".to_string(), "0x6".to_string()];
        let results = resolver.resolve_many(&ids, false, 4).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "0x2");
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert_eq!(
            results[2].1.as_ref().unwrap().initial_shared_version,
            "4"
        );
    }
}
