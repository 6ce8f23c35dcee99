//! Integration tests for the JSON-RPC client.
//!
//! These tests require network access and are marked with #[ignore].
//! Run with: cargo test -p sui-artifact-transport --test network_tests -- --ignored

use sui_artifact_transport::{JsonRpcClient, LedgerRpc};

/// The system clock object: shared on every Sui network.
const CLOCK_OBJECT: &str = "0x6";

/// The Move stdlib package: immutable on every Sui network.
const STDLIB_PACKAGE: &str = "0x1";

#[tokio::test]
#[ignore = "requires network access to Sui mainnet"]
async fn test_get_object_shared_clock() {
    let client = JsonRpcClient::for_network("mainnet").expect("build client");

    let meta = client
        .get_object(CLOCK_OBJECT)
        .await
        .expect("fetch clock object")
        .expect("clock object exists");

    assert!(meta.owner.is_shared(), "clock should be shared");
    assert!(meta.version > 0);
    assert!(!meta.digest.is_empty());
}

#[tokio::test]
#[ignore = "requires network access to Sui mainnet"]
async fn test_get_object_unknown_id_is_none() {
    let client = JsonRpcClient::for_network("mainnet").expect("build client");

    let meta = client
        .get_object("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef")
        .await
        .expect("query should succeed");
    assert!(meta.is_none());
}

#[tokio::test]
#[ignore = "requires network access to Sui mainnet"]
async fn test_get_object_immutable_package() {
    let client = JsonRpcClient::for_network("mainnet").expect("build client");

    let meta = client
        .get_object(STDLIB_PACKAGE)
        .await
        .expect("fetch stdlib package")
        .expect("stdlib package exists");

    assert!(!meta.owner.is_shared());
}
