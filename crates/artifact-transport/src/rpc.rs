//! JSON-RPC client for Sui fullnodes.
//!
//! Exposes the two operations the workspace needs behind the [`LedgerRpc`]
//! trait:
//! - `get_object` - current ownership metadata for one object
//! - `execute_transaction` - submit a signed payload and wait for finality
//!
//! ## Endpoints
//! - Mainnet: `https://fullnode.mainnet.sui.io:443`
//! - Testnet: `https://fullnode.testnet.sui.io:443`
//!
//! Responses are parsed into closed types here; nothing downstream touches
//! raw JSON. Unknown object-change kinds on the wire (e.g. package
//! publication records) are logged and skipped at this boundary, so the
//! classifier downstream is total over the kinds it receives.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use sui_artifact_types::{ArtifactError, Owner, RetryConfig};

use crate::network::resolve_rpc_endpoint;

/// Current metadata for one remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub object_id: String,
    pub version: u64,
    pub digest: String,
    pub object_type: Option<String>,
    pub owner: Owner,
}

/// Execution status reported by the node for a finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// Kind of a reported object change. Closed set; every change the transport
/// hands out is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Mutated,
    Transferred,
    Deleted,
    Wrapped,
}

/// One reported effect of a transaction on one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectChange {
    pub kind: ChangeKind,
    pub object_id: String,
    pub object_type: Option<String>,
    pub version: u64,
    pub digest: Option<String>,
    /// Owner after the change, when the wire reports it.
    pub owner: Option<Owner>,
    /// New owner for `transferred` changes.
    pub recipient: Option<Owner>,
    /// Transaction sender, used as a last-resort owner for tombstones of
    /// objects this ledger never saw.
    pub sender: Option<String>,
}

/// Result of submitting a signed transaction.
#[derive(Debug, Clone)]
pub struct ExecutionResponse {
    pub digest: String,
    pub status: ExecutionStatus,
    pub object_changes: Vec<ObjectChange>,
}

/// The opaque RPC boundary to the remote ledger.
///
/// Errors are `anyhow` at this level; retry wrapping and classification into
/// the workspace taxonomy happen in the callers (see
/// [`with_retries`](crate::retry::with_retries)).
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch current metadata for an object. `Ok(None)` means the ledger
    /// does not know the object (never existed, or deleted).
    async fn get_object(&self, object_id: &str) -> Result<Option<ObjectMeta>>;

    /// Submit a signed transaction and wait for finality.
    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signature: &str,
    ) -> Result<ExecutionResponse>;
}

#[async_trait]
impl<T: LedgerRpc + ?Sized> LedgerRpc for Arc<T> {
    async fn get_object(&self, object_id: &str) -> Result<Option<ObjectMeta>> {
        (**self).get_object(object_id).await
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signature: &str,
    ) -> Result<ExecutionResponse> {
        (**self).execute_transaction(tx_bytes, signature).await
    }
}

/// Transport configuration, resolved eagerly at construction. Environment
/// overrides are read exactly once, here; the value is then passed around
/// explicitly.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
}

impl TransportConfig {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 60;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Configuration for a named network (`mainnet`, `testnet`, `devnet`,
    /// `localnet`), honoring `SUI_RPC_ENDPOINT` / `SUI_RPC_TIMEOUT_SECS` /
    /// `SUI_RPC_CONNECT_TIMEOUT_SECS` overrides.
    pub fn for_network(network: &str) -> Self {
        let timeout_secs = std::env::var("SUI_RPC_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);
        let connect_secs = std::env::var("SUI_RPC_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_CONNECT_TIMEOUT_SECS);

        Self {
            endpoint: resolve_rpc_endpoint(network),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_secs),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// JSON-RPC 2.0 client for a Sui fullnode.
#[derive(Clone)]
pub struct JsonRpcClient {
    endpoint: String,
    http: reqwest::Client,
}

impl JsonRpcClient {
    /// Create a client from explicit configuration.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            http,
        })
    }

    /// Create a client for a named network with default timeouts.
    pub fn for_network(network: &str) -> Result<Self> {
        Self::new(&TransportConfig::for_network(network))
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one JSON-RPC call and return the `result` value.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, endpoint = %self.endpoint, "rpc call");

        let response: Value = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("rpc request failed: {e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("rpc http error: {e}"))?
            .json()
            .await
            .map_err(|e| anyhow!("failed to parse rpc response: {e}"))?;

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(anyhow!("rpc error from {method}: {message}"));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("no result in rpc response for {method}"))
    }
}

#[async_trait]
impl LedgerRpc for JsonRpcClient {
    async fn get_object(&self, object_id: &str) -> Result<Option<ObjectMeta>> {
        let params = json!([
            object_id,
            { "showType": true, "showOwner": true }
        ]);
        let result = self.call("sui_getObject", params).await?;

        // The node reports unknown/deleted objects inside `result.error`
        // rather than as an rpc-level error.
        if let Some(error) = result.get("error") {
            let code = error.get("code").and_then(Value::as_str).unwrap_or("");
            if code == "notExists" || code == "deleted" {
                return Ok(None);
            }
            return Err(anyhow!("object query error: {code}"));
        }

        let data = result
            .get("data")
            .ok_or_else(|| anyhow!("object response missing data for {object_id}"))?;
        parse_object_meta(data).map(Some)
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signature: &str,
    ) -> Result<ExecutionResponse> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(tx_bytes);
        let params = json!([
            encoded,
            [signature],
            { "showEffects": true, "showObjectChanges": true },
            "WaitForLocalExecution"
        ]);
        let result = self.call("sui_executeTransactionBlock", params).await?;

        let digest = result
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("execution response missing digest"))?
            .to_string();

        let status = parse_execution_status(&result)?;
        let object_changes = parse_object_changes(&result)?;

        tracing::debug!(
            %digest,
            changes = object_changes.len(),
            success = status.is_success(),
            "transaction finalized"
        );

        Ok(ExecutionResponse {
            digest,
            status,
            object_changes,
        })
    }
}

// =============================================================================
// Wire parsing
// =============================================================================

/// Versions arrive as JSON numbers or decimal strings depending on the node.
fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_object_meta(data: &Value) -> Result<ObjectMeta> {
    let object_id = data
        .get("objectId")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("object data missing objectId"))?
        .to_string();
    let version = data
        .get("version")
        .and_then(value_as_u64)
        .ok_or_else(|| anyhow!("object {object_id} missing version"))?;
    let digest = data
        .get("digest")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let object_type = data
        .get("type")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let owner_value = data
        .get("owner")
        .ok_or_else(|| anyhow!("object {object_id} missing owner"))?;
    let owner = Owner::from_wire(owner_value).map_err(anyhow::Error::new)?;

    Ok(ObjectMeta {
        object_id,
        version,
        digest,
        object_type,
        owner,
    })
}

fn parse_execution_status(result: &Value) -> Result<ExecutionStatus> {
    let status = result
        .get("effects")
        .and_then(|e| e.get("status"))
        .ok_or_else(|| anyhow!("execution response missing effects.status"))?;

    match status.get("status").and_then(Value::as_str) {
        Some("success") => Ok(ExecutionStatus::Success),
        Some("failure") => Ok(ExecutionStatus::Failure {
            error: status
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unspecified execution failure")
                .to_string(),
        }),
        other => Err(anyhow!("unrecognized execution status: {other:?}")),
    }
}

fn parse_object_changes(result: &Value) -> Result<Vec<ObjectChange>> {
    let Some(raw_changes) = result.get("objectChanges").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut changes = Vec::with_capacity(raw_changes.len());
    for raw in raw_changes {
        let kind = match raw.get("type").and_then(Value::as_str) {
            Some("created") => ChangeKind::Created,
            Some("mutated") => ChangeKind::Mutated,
            Some("transferred") => ChangeKind::Transferred,
            Some("deleted") => ChangeKind::Deleted,
            Some("wrapped") => ChangeKind::Wrapped,
            Some(other) => {
                tracing::warn!(kind = other, "skipping unrecognized object change kind");
                continue;
            }
            None => return Err(anyhow!("object change missing type: {raw}")),
        };

        let object_id = raw
            .get("objectId")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("object change missing objectId: {raw}"))?
            .to_string();
        let version = raw
            .get("version")
            .and_then(value_as_u64)
            .ok_or_else(|| anyhow!("object change for {object_id} missing version"))?;

        let owner = raw
            .get("owner")
            .map(|v| Owner::from_wire(v).map_err(anyhow::Error::new))
            .transpose()?;
        let recipient = raw
            .get("recipient")
            .map(|v| Owner::from_wire(v).map_err(anyhow::Error::new))
            .transpose()?;

        changes.push(ObjectChange {
            kind,
            object_id,
            object_type: raw
                .get("objectType")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            version,
            digest: raw
                .get("digest")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
            owner,
            recipient,
            sender: raw
                .get("sender")
                .and_then(Value::as_str)
                .map(|s| s.to_string()),
        });
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_as_u64_both_shapes() {
        assert_eq!(value_as_u64(&json!(9)), Some(9));
        assert_eq!(value_as_u64(&json!("9")), Some(9));
        assert_eq!(value_as_u64(&json!("x")), None);
        assert_eq!(value_as_u64(&json!(null)), None);
    }

    #[test]
    fn test_parse_object_meta() {
        let data = json!({
            "objectId": "0x2",
            "version": "9",
            "digest": "D1g3st",
            "type": "0x2::clock::Clock",
            "owner": { "Shared": { "initial_shared_version": "9" } }
        });
        let meta = parse_object_meta(&data).unwrap();
        assert_eq!(meta.object_id, "0x2");
        assert_eq!(meta.version, 9);
        assert_eq!(meta.digest, "D1g3st");
        assert!(meta.owner.is_shared());
    }

    #[test]
    fn test_parse_object_meta_rejects_missing_owner() {
        let data = json!({ "objectId": "0x2", "version": 1 });
        assert!(parse_object_meta(&data).is_err());
    }

    #[test]
    fn test_parse_execution_status() {
        let ok = json!({ "effects": { "status": { "status": "success" } } });
        assert!(parse_execution_status(&ok).unwrap().is_success());

        let failed = json!({
            "effects": { "status": { "status": "failure", "error": "MoveAbort(7)" } }
        });
        match parse_execution_status(&failed).unwrap() {
            ExecutionStatus::Failure { error } => assert_eq!(error, "MoveAbort(7)"),
            _ => panic!("expected failure"),
        }

        let odd = json!({ "effects": { "status": { "status": "pending" } } });
        assert!(parse_execution_status(&odd).is_err());
    }

    #[test]
    fn test_parse_object_changes_all_kinds() {
        let result = json!({ "objectChanges": [
            { "type": "created", "objectId": "0x10", "objectType": "0xa::m::T",
              "version": 3, "digest": "d1",
              "owner": { "AddressOwner": "0x9" }, "sender": "0x9" },
            { "type": "mutated", "objectId": "0x11", "objectType": "0xa::m::T",
              "version": "4", "digest": "d2",
              "owner": { "Shared": { "initial_shared_version": 2 } } },
            { "type": "transferred", "objectId": "0x12", "version": 5, "digest": "d3",
              "recipient": { "AddressOwner": "0xb" } },
            { "type": "deleted", "objectId": "0x13", "version": 6, "sender": "0x9" },
            { "type": "wrapped", "objectId": "0x14", "version": 7 },
            { "type": "published", "packageId": "0xp", "version": 1 }
        ]});

        let changes = parse_object_changes(&result).unwrap();
        // The published record has no objectId and an unknown kind; it is
        // skipped at this boundary.
        assert_eq!(changes.len(), 5);
        assert_eq!(changes[0].kind, ChangeKind::Created);
        assert_eq!(changes[1].version, 4);
        assert!(changes[2].recipient.is_some());
        assert!(changes[3].digest.is_none());
        assert_eq!(changes[4].kind, ChangeKind::Wrapped);
    }

    #[test]
    fn test_parse_object_changes_missing_fields_are_errors() {
        let no_id = json!({ "objectChanges": [ { "type": "created", "version": 1 } ] });
        assert!(parse_object_changes(&no_id).is_err());

        let no_kind = json!({ "objectChanges": [ { "objectId": "0x1", "version": 1 } ] });
        assert!(parse_object_changes(&no_kind).is_err());
    }

    #[test]
    fn test_transport_config_for_network() {
        let config = TransportConfig::for_network("testnet");
        assert!(config.endpoint.contains("sui.io") || !config.endpoint.is_empty());
        assert!(config.timeout >= config.connect_timeout);
    }
}
