//! Test utilities for the RPC boundary.
//!
//! Provides a scripted in-memory [`LedgerRpc`] implementation and fixture
//! helpers for constructing object metadata and change records without
//! repetitive boilerplate. Shipped as a regular module so downstream crates
//! can drive their test suites against it.

use std::collections::{HashMap, VecDeque};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use sui_artifact_types::{address::normalize_address, Owner};

use crate::rpc::{
    ChangeKind, ExecutionResponse, ExecutionStatus, LedgerRpc, ObjectChange, ObjectMeta,
};

/// Scripted ledger: objects served from a map, executions popped from a
/// queue, with optional injected failures and call counting for retry
/// assertions.
#[derive(Default)]
pub struct MockLedger {
    objects: Mutex<HashMap<String, ObjectMeta>>,
    executions: Mutex<VecDeque<ExecutionResponse>>,
    get_failures: Mutex<VecDeque<String>>,
    execute_failures: Mutex<VecDeque<String>>,
    get_calls: Mutex<usize>,
    execute_calls: Mutex<usize>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: serve this object from `get_object`.
    pub fn with_object(self, meta: ObjectMeta) -> Self {
        self.insert_object(meta);
        self
    }

    /// Builder: answer the next `execute_transaction` with this response.
    pub fn with_execution(self, response: ExecutionResponse) -> Self {
        self.script_execution(response);
        self
    }

    pub fn insert_object(&self, meta: ObjectMeta) {
        let key = normalize_address(&meta.object_id);
        self.objects.lock().insert(key, meta);
    }

    pub fn remove_object(&self, object_id: &str) {
        self.objects.lock().remove(&normalize_address(object_id));
    }

    pub fn script_execution(&self, response: ExecutionResponse) {
        self.executions.lock().push_back(response);
    }

    /// Fail the next `count` `get_object` calls with the given message
    /// before serving real data again.
    pub fn fail_next_gets(&self, count: usize, message: &str) {
        let mut failures = self.get_failures.lock();
        for _ in 0..count {
            failures.push_back(message.to_string());
        }
    }

    /// Fail the next `execute_transaction` call with the given message.
    pub fn fail_next_execute(&self, message: &str) {
        self.execute_failures.lock().push_back(message.to_string());
    }

    pub fn get_call_count(&self) -> usize {
        *self.get_calls.lock()
    }

    pub fn execute_call_count(&self) -> usize {
        *self.execute_calls.lock()
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn get_object(&self, object_id: &str) -> Result<Option<ObjectMeta>> {
        *self.get_calls.lock() += 1;
        if let Some(message) = self.get_failures.lock().pop_front() {
            return Err(anyhow!("{message}"));
        }
        Ok(self
            .objects
            .lock()
            .get(&normalize_address(object_id))
            .cloned())
    }

    async fn execute_transaction(
        &self,
        _tx_bytes: &[u8],
        _signature: &str,
    ) -> Result<ExecutionResponse> {
        *self.execute_calls.lock() += 1;
        if let Some(message) = self.execute_failures.lock().pop_front() {
            return Err(anyhow!("{message}"));
        }
        self.executions
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted execution response"))
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Metadata for a shared object at the given version.
pub fn shared_meta(object_id: &str, version: u64, initial_shared_version: &str) -> ObjectMeta {
    ObjectMeta {
        object_id: object_id.to_string(),
        version,
        digest: format!("digest-{object_id}-{version}"),
        object_type: Some("0x2::test::Shared".to_string()),
        owner: Owner::Shared {
            initial_shared_version: initial_shared_version.to_string(),
        },
    }
}

/// Metadata for an address-owned object.
pub fn owned_meta(object_id: &str, version: u64, owner_address: &str) -> ObjectMeta {
    ObjectMeta {
        object_id: object_id.to_string(),
        version,
        digest: format!("digest-{object_id}-{version}"),
        object_type: Some("0x2::test::Owned".to_string()),
        owner: Owner::Address(normalize_address(owner_address)),
    }
}

/// A fully-populated object change of the given kind.
pub fn change(kind: ChangeKind, object_id: &str, object_type: &str, version: u64) -> ObjectChange {
    ObjectChange {
        kind,
        object_id: object_id.to_string(),
        object_type: Some(object_type.to_string()),
        version,
        digest: Some(format!("digest-{object_id}-{version}")),
        owner: Some(Owner::Address(normalize_address("0x9"))),
        recipient: None,
        sender: Some(normalize_address("0x9")),
    }
}

/// A successful execution response with the given changes.
pub fn success_response(digest: &str, object_changes: Vec<ObjectChange>) -> ExecutionResponse {
    ExecutionResponse {
        digest: digest.to_string(),
        status: ExecutionStatus::Success,
        object_changes,
    }
}

/// A failed execution response.
pub fn failure_response(digest: &str, error: &str) -> ExecutionResponse {
    ExecutionResponse {
        digest: digest.to_string(),
        status: ExecutionStatus::Failure {
            error: error.to_string(),
        },
        object_changes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_objects_by_normalized_id() {
        let mock = MockLedger::new().with_object(shared_meta("0x2", 9, "9"));

        let meta = mock.get_object("0x2").await.unwrap().unwrap();
        assert_eq!(meta.version, 9);

        // Long form finds the same object.
        let long = format!("0x{:0>64}", "2");
        assert!(mock.get_object(&long).await.unwrap().is_some());

        assert!(mock.get_object("0xdead").await.unwrap().is_none());
        assert_eq!(mock.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_scripted_failures_drain() {
        let mock = MockLedger::new().with_object(owned_meta("0x5", 1, "0x9"));
        mock.fail_next_gets(2, "connection reset");

        assert!(mock.get_object("0x5").await.is_err());
        assert!(mock.get_object("0x5").await.is_err());
        assert!(mock.get_object("0x5").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mock_executions_pop_in_order() {
        let mock = MockLedger::new()
            .with_execution(success_response("tx-1", vec![]))
            .with_execution(failure_response("tx-2", "MoveAbort(1)"));

        let first = mock.execute_transaction(b"payload", "sig").await.unwrap();
        assert_eq!(first.digest, "tx-1");
        let second = mock.execute_transaction(b"payload", "sig").await.unwrap();
        assert!(!second.status.is_success());

        // Queue exhausted.
        assert!(mock.execute_transaction(b"payload", "sig").await.is_err());
        assert_eq!(mock.execute_call_count(), 3);
    }
}
