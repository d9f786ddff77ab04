use serde::{Deserialize, Serialize};

/// An EVM chain the vaults live on.
///
/// Presets carry a public RPC endpoint; `VAULT_RPC_URL` or `--rpc-url`
/// replaces it for real deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chain {
    /// Human-readable chain name (e.g. "ethereum", "base").
    pub name: String,
    pub chain_id: u64,
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
}

// ── Convenience constructors ─────────────────────────────────────────

impl Chain {
    pub fn ethereum() -> Self {
        Chain::custom("ethereum", 1, "https://eth.llamarpc.com")
    }
    pub fn arbitrum() -> Self {
        Chain::custom("arbitrum", 42161, "https://arb1.arbitrum.io/rpc")
    }
    pub fn optimism() -> Self {
        Chain::custom("optimism", 10, "https://mainnet.optimism.io")
    }
    pub fn base() -> Self {
        Chain::custom("base", 8453, "https://mainnet.base.org")
    }
    pub fn mantle() -> Self {
        Chain::custom("mantle", 5000, "https://rpc.mantle.xyz")
    }
    pub fn hyperevm() -> Self {
        Chain::custom("hyperevm", 999, "https://rpc.hyperliquid.xyz/evm")
    }

    /// Look up a preset by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Some(Self::ethereum()),
            "arbitrum" => Some(Self::arbitrum()),
            "optimism" => Some(Self::optimism()),
            "base" => Some(Self::base()),
            "mantle" => Some(Self::mantle()),
            "hyperevm" => Some(Self::hyperevm()),
            _ => None,
        }
    }

    pub fn custom(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Chain {
            name: name.into(),
            chain_id,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Chain::from_name("Base").unwrap().chain_id, 8453);
        assert_eq!(Chain::from_name("mainnet").unwrap().chain_id, 1);
        assert!(Chain::from_name("solana").is_none());
    }

    #[test]
    fn test_rpc_override() {
        let chain = Chain::mantle().with_rpc_url("http://localhost:8545");
        assert_eq!(chain.chain_id, 5000);
        assert_eq!(chain.rpc_url, "http://localhost:8545");
    }
}
