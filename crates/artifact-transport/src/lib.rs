//! Remote ledger RPC boundary.
//!
//! The ledger node is an opaque collaborator: this crate exposes exactly the
//! two operations the rest of the workspace needs — fetch one object's
//! current metadata, and submit a signed transaction and wait for finality —
//! behind the [`LedgerRpc`] trait, plus the JSON-RPC implementation of it.
//!
//! Transient network failures are retried with bounded exponential backoff
//! (see [`retry`]); everything the wire reports is parsed into closed types
//! before it leaves this crate.

pub mod network;
pub mod retry;
pub mod rpc;
pub mod test_utils;

pub use network::{default_rpc_endpoint, infer_network_from_url, resolve_rpc_endpoint};
pub use retry::{is_transient_error, with_retries};
pub use rpc::{
    ChangeKind, ExecutionResponse, ExecutionStatus, JsonRpcClient, LedgerRpc, ObjectChange,
    ObjectMeta, TransportConfig,
};
