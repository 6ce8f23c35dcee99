//! Error taxonomy for artifact resolution, execution, and persistence.
//!
//! Every failure a caller can observe maps to exactly one variant. Messages
//! carry whatever identifying context is available (object id, digest) so an
//! operator can inspect the remote ledger directly.

use thiserror::Error;

/// Failures surfaced by the resolver, assembler, executor, and store.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The object exists but its owner is not the shared variant.
    #[error("object {object_id} is not shared (owner is {owner}); pass it as an owned-object argument instead")]
    NotShared { object_id: String, owner: String },

    /// The object is shared but the ledger reported no initial shared version.
    #[error("shared object {object_id} has no initial shared version; concurrent access to it cannot be ordered")]
    MissingSharedVersion { object_id: String },

    /// A required artifact was not found in the local ledger.
    #[error("no live artifact matching `{query}` in the {network} ledger; run the transaction that creates it first")]
    MissingArtifact { query: String, network: String },

    /// The remote ledger executed the transaction and reported a non-success
    /// status. Carries the digest so the transaction can be inspected.
    #[error("transaction {digest} failed: {status}")]
    TransactionFailed { digest: String, status: String },

    /// A network-level RPC failure, surfaced after the retry budget is spent.
    #[error("rpc failed after {attempts} attempt(s): {source}")]
    RpcTransient {
        attempts: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Caller-supplied input was missing or malformed. Raised before any
    /// network I/O and never retried.
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// The remote ledger returned a response this client cannot interpret.
    #[error("malformed ledger response: {reason}")]
    MalformedResponse { reason: String },

    /// Artifact file I/O or serialization failure.
    #[error("artifact store error: {source}")]
    Store {
        #[source]
        source: anyhow::Error,
    },
}

impl ArtifactError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn store(source: impl Into<anyhow::Error>) -> Self {
        Self::Store {
            source: source.into(),
        }
    }

    /// Short stable name for the variant, for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotShared { .. } => "not_shared",
            Self::MissingSharedVersion { .. } => "missing_shared_version",
            Self::MissingArtifact { .. } => "missing_artifact",
            Self::TransactionFailed { .. } => "transaction_failed",
            Self::RpcTransient { .. } => "rpc_transient",
            Self::PreconditionFailed { .. } => "precondition_failed",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Store { .. } => "store",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ArtifactError::NotShared {
            object_id: "0x5".to_string(),
            owner: "Address".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0x5"));
        assert!(msg.contains("Address"));

        let err = ArtifactError::TransactionFailed {
            digest: "9V3xKM".to_string(),
            status: "InsufficientGas".to_string(),
        };
        assert!(err.to_string().contains("9V3xKM"));
    }

    #[test]
    fn test_rpc_transient_keeps_cause() {
        let err = ArtifactError::RpcTransient {
            attempts: 3,
            source: anyhow::anyhow!("connection refused"),
        };
        assert!(err.to_string().contains("3 attempt"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ArtifactError::precondition("x").kind(), "precondition_failed");
        assert_eq!(ArtifactError::malformed("x").kind(), "malformed_response");
    }
}
