//! sui-artifacts: transaction issuance with a persisted artifact ledger.
//!
//! This crate issues transactions against a Sui network and keeps a local,
//! network-scoped record of every object those transactions created,
//! mutated, deleted, or wrapped, so later runs can resolve object references
//! without re-querying history.
//!
//! ## Components
//!
//! - **[`SharedResolver`]**: fetch ownership metadata for an object and turn
//!   it into a [`SharedObjectRef`] transaction argument, failing if the
//!   object is not actually shared.
//! - **[`PtbBuilder`]**: compose one or more Move calls into a single inert
//!   [`TransactionPayload`], binding arguments in exact declaration order
//!   and chaining results between calls.
//! - **[`TransactionExecutor`]**: sign, submit, wait for finality, classify
//!   every reported object change, and fold the result into the persisted
//!   ledger in one atomic commit.
//! - **[`ArtifactStore`]**: the per-network ledger files, with
//!   latest-of-type queries.
//!
//! ## Example
//!
//! ```ignore
//! use sui_artifacts::{
//!     ArtifactStore, Ed25519Signer, JsonRpcClient, MoveCallSpec, PtbBuilder,
//!     SharedResolver, TransactionExecutor,
//! };
//!
//! let rpc = std::sync::Arc::new(JsonRpcClient::for_network("testnet")?);
//! let resolver = SharedResolver::new(rpc.clone());
//! let pool = resolver.resolve("0x6a8...", true).await?;
//!
//! let payload = PtbBuilder::new()
//!     .call(
//!         MoveCallSpec::new("0xabc::pool::swap")
//!             .argument(CallArg::SharedObject(pool))
//!             .argument(CallArg::Pure(PureValue::U64(1_000_000))),
//!     )
//!     .build()?;
//!
//! let store = ArtifactStore::open_default()?;
//! let executor = TransactionExecutor::new(rpc, store, "testnet");
//! let summary = executor.execute(&payload, &signer).await?;
//! println!("{}", summary.render());
//! ```

pub mod executor;
pub mod ptb;
pub mod resolver;
pub mod signer;

pub use executor::{ArtifactBuckets, ExecutionSummary, TransactionExecutor};
pub use ptb::{CallArg, MoveCallSpec, PtbBuilder, PureValue, TransactionPayload};
pub use resolver::SharedResolver;
pub use signer::{Ed25519Signer, Signer};

// Re-export the workspace surface so callers need a single dependency.
pub use sui_artifact_store::{ArtifactStore, LedgerStats};
pub use sui_artifact_transport::{
    ChangeKind, ExecutionResponse, ExecutionStatus, JsonRpcClient, LedgerRpc, ObjectChange,
    ObjectMeta, TransportConfig,
};
pub use sui_artifact_types::{
    ArtifactError, ArtifactLedger, ObjectArtifact, ObjectRef, Owner, RetryConfig, SharedObjectRef,
};
