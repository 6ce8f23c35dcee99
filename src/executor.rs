//! Transaction execution and artifact reconciliation.
//!
//! One execution moves through `Built -> Signed -> Submitted ->
//! {Finalized | Failed} -> Reconciled`:
//!
//! 1. the assembled payload is encoded and signed;
//! 2. the signed transaction is submitted and the node's finality wait
//!    produces either a success status (`Finalized`) or a terminal failure;
//! 3. on success, every reported object change is classified against the
//!    object's prior known state and the results are folded into the
//!    network's ledger in a single store commit.
//!
//! The ledger is only touched after confirmed finality, and then exactly
//! once: an interrupt anywhere before the commit leaves the file untouched,
//! and no partial application of a transaction's changes is ever
//! observable. A failed execution surfaces the digest and status without
//! mutating anything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sui_artifact_store::ArtifactStore;
use sui_artifact_transport::{
    retry::with_retries, ChangeKind, ExecutionResponse, ExecutionStatus, LedgerRpc, ObjectChange,
};
use sui_artifact_types::{
    address::{normalize_address, short_address},
    package_id_of_type, ArtifactError, ArtifactLedger, ObjectArtifact, Owner, RetryConfig,
};

use crate::ptb::TransactionPayload;
use crate::signer::Signer;

/// Executes signed transactions and reconciles their effects into the
/// artifact ledger for one network.
pub struct TransactionExecutor<R: LedgerRpc> {
    rpc: R,
    store: ArtifactStore,
    network: String,
    retry: RetryConfig,
}

/// Artifacts touched by one transaction, bucketed by change kind.
/// `mutated` and `transferred` changes both land in `updated`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactBuckets {
    pub created: Vec<ObjectArtifact>,
    pub updated: Vec<ObjectArtifact>,
    pub deleted: Vec<ObjectArtifact>,
    pub wrapped: Vec<ObjectArtifact>,
}

impl ArtifactBuckets {
    /// Total changes classified, across all buckets.
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len() + self.wrapped.len()
    }
}

/// What one executed transaction did, for callers to print.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    pub digest: String,
    pub status: String,
    pub artifacts: ArtifactBuckets,
}

impl ExecutionSummary {
    /// Human-readable multi-line rendering.
    pub fn render(&self) -> String {
        let mut out = format!("transaction {}: {}", self.digest, self.status);
        let sections = [
            ("created", &self.artifacts.created),
            ("updated", &self.artifacts.updated),
            ("deleted", &self.artifacts.deleted),
            ("wrapped", &self.artifacts.wrapped),
        ];
        for (label, artifacts) in sections {
            for artifact in artifacts {
                out.push_str(&format!(
                    "\n  {label} {} {} v{}",
                    short_address(&artifact.object_id),
                    artifact.object_type,
                    artifact.version
                ));
            }
        }
        out
    }
}

impl<R: LedgerRpc> TransactionExecutor<R> {
    pub fn new(rpc: R, store: ArtifactStore, network: impl Into<String>) -> Self {
        Self {
            rpc,
            store,
            network: network.into(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Sign, submit, await finality, and reconcile one payload.
    ///
    /// Submission is deliberately single-shot: re-sending after an ambiguous
    /// network failure could execute the transaction twice. A transport
    /// failure here surfaces as [`ArtifactError::RpcTransient`] with the
    /// ledger untouched; post-finality metadata fetches, which are safe to
    /// repeat, use the full retry budget.
    pub async fn execute(
        &self,
        payload: &TransactionPayload,
        signer: &dyn Signer,
    ) -> Result<ExecutionSummary, ArtifactError> {
        let tx_bytes = payload.encode_to_bytes()?;
        let signature = signer.sign(&tx_bytes).map_err(|e| {
            ArtifactError::precondition(format!("signing failed: {e:#}"))
        })?;

        tracing::info!(
            network = %self.network,
            sender = signer.address(),
            calls = payload.call_count(),
            "submitting transaction"
        );

        let response = self
            .rpc
            .execute_transaction(&tx_bytes, &signature)
            .await
            .map_err(|e| match e.downcast::<ArtifactError>() {
                Ok(typed) => typed,
                Err(raw) => ArtifactError::RpcTransient {
                    attempts: 1,
                    source: raw,
                },
            })?;

        if let ExecutionStatus::Failure { error } = &response.status {
            tracing::warn!(digest = %response.digest, %error, "transaction failed");
            return Err(ArtifactError::TransactionFailed {
                digest: response.digest.clone(),
                status: error.clone(),
            });
        }

        let (updates, buckets) = self.classify(&response).await?;
        self.store.commit(&self.network, updates)?;

        tracing::info!(
            digest = %response.digest,
            created = buckets.created.len(),
            updated = buckets.updated.len(),
            deleted = buckets.deleted.len(),
            wrapped = buckets.wrapped.len(),
            "transaction reconciled"
        );

        Ok(ExecutionSummary {
            digest: response.digest,
            status: "success".to_string(),
            artifacts: buckets,
        })
    }

    /// Classify every reported change against prior known state.
    ///
    /// Produces the ledger updates to commit and the per-kind buckets for
    /// the summary. Changes are processed in reported order as one logical
    /// unit; nothing is persisted here.
    async fn classify(
        &self,
        response: &ExecutionResponse,
    ) -> Result<(ArtifactLedger, ArtifactBuckets), ArtifactError> {
        detect_terminal_conflicts(response)?;

        let prior = self.store.read(&self.network)?;
        let now = Utc::now();
        let mut updates = ArtifactLedger::new();
        let mut buckets = ArtifactBuckets::default();

        for change in &response.object_changes {
            let object_id = normalize_address(&change.object_id);
            // A change earlier in this same transaction is newer state than
            // the persisted ledger.
            let known = updates.get(&object_id).or_else(|| prior.get(&object_id));

            match change.kind {
                ChangeKind::Created => {
                    let owner = self.owner_for(change).await?;
                    let artifact = self.artifact_from_change(change, owner, now, true);
                    buckets.created.push(artifact.clone());
                    updates.insert(object_id, artifact);
                }
                ChangeKind::Mutated | ChangeKind::Transferred => {
                    let owner = if change.kind == ChangeKind::Transferred {
                        // The recipient is authoritative for transfers, even
                        // over a previously different owner variant.
                        change.recipient.clone().ok_or_else(|| {
                            ArtifactError::malformed(format!(
                                "transferred change for {object_id} carries no recipient"
                            ))
                        })?
                    } else {
                        self.owner_for(change).await?
                    };

                    let mut artifact = match known {
                        Some(existing) => existing.clone(),
                        None => {
                            tracing::warn!(
                                object_id = %short_address(&object_id),
                                "mutated object unknown to the ledger; synthesizing artifact"
                            );
                            self.artifact_from_change(change, owner.clone(), now, false)
                        }
                    };

                    artifact.version = change.version;
                    artifact.owner = owner;
                    if let Some(digest) = &change.digest {
                        artifact.digest = digest.clone();
                    }
                    if let Some(object_type) = &change.object_type {
                        artifact.object_type = object_type.clone();
                        artifact.package_id =
                            package_id_of_type(object_type).unwrap_or_default();
                    }
                    artifact.mutated_at = Some(now);

                    buckets.updated.push(artifact.clone());
                    updates.insert(object_id, artifact);
                }
                ChangeKind::Deleted | ChangeKind::Wrapped => {
                    let mut artifact = match known {
                        Some(existing) => existing.clone(),
                        None => {
                            tracing::warn!(
                                object_id = %short_address(&object_id),
                                kind = ?change.kind,
                                "terminal change for an object unknown to the ledger; recording tombstone"
                            );
                            let owner = fallback_owner(change);
                            self.artifact_from_change(change, owner, now, false)
                        }
                    };

                    // The tombstone version from the node is the object's
                    // final word; prior fields are otherwise retained.
                    artifact.version = change.version;
                    match change.kind {
                        ChangeKind::Deleted => {
                            artifact.deleted_at = Some(now);
                            buckets.deleted.push(artifact.clone());
                        }
                        _ => {
                            artifact.wrapped_at = Some(now);
                            buckets.wrapped.push(artifact.clone());
                        }
                    }
                    updates.insert(object_id, artifact);
                }
            }
        }

        Ok((updates, buckets))
    }

    /// Owner for a created/mutated change: the change's own owner field
    /// when present, otherwise a post-transaction metadata fetch (retried;
    /// this is the transient path of the error taxonomy). If the object is
    /// already gone again, fall back to the sender.
    async fn owner_for(&self, change: &ObjectChange) -> Result<Owner, ArtifactError> {
        if let Some(owner) = &change.owner {
            return Ok(owner.clone());
        }

        let meta = with_retries(&self.retry, || {
            let id = change.object_id.clone();
            let rpc = &self.rpc;
            async move { rpc.get_object(&id).await }
        })
        .await?;

        match meta {
            Some(meta) => Ok(meta.owner),
            None => {
                tracing::warn!(
                    object_id = %short_address(&change.object_id),
                    "object vanished before its owner could be fetched; falling back to sender"
                );
                Ok(fallback_owner(change))
            }
        }
    }

    fn artifact_from_change(
        &self,
        change: &ObjectChange,
        owner: Owner,
        now: DateTime<Utc>,
        created: bool,
    ) -> ObjectArtifact {
        let mut artifact = ObjectArtifact::new(
            change.object_id.clone(),
            change.object_type.clone().unwrap_or_default(),
            owner,
            change.version,
            change.digest.clone().unwrap_or_default(),
        );
        if created {
            artifact.created_at = Some(now);
        }
        artifact
    }
}

/// One transaction reporting both `deleted` and `wrapped` for the same
/// object id violates the remote ledger's guarantees; treat it as an
/// execution anomaly rather than silently picking one marker.
fn detect_terminal_conflicts(response: &ExecutionResponse) -> Result<(), ArtifactError> {
    use std::collections::HashMap;

    let mut terminal: HashMap<String, ChangeKind> = HashMap::new();
    for change in &response.object_changes {
        if !matches!(change.kind, ChangeKind::Deleted | ChangeKind::Wrapped) {
            continue;
        }
        let id = normalize_address(&change.object_id);
        if let Some(previous) = terminal.insert(id.clone(), change.kind) {
            if previous != change.kind {
                return Err(ArtifactError::TransactionFailed {
                    digest: response.digest.clone(),
                    status: format!(
                        "conflicting terminal object changes for {}: {previous:?} and {:?}",
                        short_address(&id),
                        change.kind
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Last-resort owner for objects this ledger never saw: the change's own
/// owner, a transfer recipient, or the transaction sender.
fn fallback_owner(change: &ObjectChange) -> Owner {
    change
        .owner
        .clone()
        .or_else(|| change.recipient.clone())
        .unwrap_or_else(|| {
            Owner::Address(
                change
                    .sender
                    .as_deref()
                    .map(normalize_address)
                    .unwrap_or_default(),
            )
        })
}
