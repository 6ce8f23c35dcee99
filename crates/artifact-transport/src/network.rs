const MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";
const TESTNET_RPC: &str = "https://fullnode.testnet.sui.io:443";
const DEVNET_RPC: &str = "https://fullnode.devnet.sui.io:443";
const LOCALNET_RPC: &str = "http://127.0.0.1:9000";

pub fn infer_network_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("devnet") {
        Some("devnet")
    } else if lower.contains("mainnet") {
        Some("mainnet")
    } else if lower.contains("127.0.0.1") || lower.contains("localhost") {
        Some("localnet")
    } else {
        None
    }
}

pub fn default_rpc_endpoint(network: &str) -> String {
    match network {
        "testnet" => TESTNET_RPC.to_string(),
        "devnet" => DEVNET_RPC.to_string(),
        "localnet" => LOCALNET_RPC.to_string(),
        _ => MAINNET_RPC.to_string(),
    }
}

/// Endpoint for a network, honoring a `SUI_RPC_ENDPOINT` override.
///
/// The override is read once here, at configuration time; nothing else in
/// the workspace consults the environment.
pub fn resolve_rpc_endpoint(network: &str) -> String {
    if let Ok(value) = std::env::var("SUI_RPC_ENDPOINT") {
        if !value.trim().is_empty() {
            return value;
        }
    }
    default_rpc_endpoint(network)
}
