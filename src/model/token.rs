use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::amount::decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Vault,
    Strategy,
}

/// One token held by a vault, either directly or through its strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token_address: Address,
    pub symbol: Option<String>,
    pub decimals: u8,
    #[serde(with = "decimal")]
    pub balance_raw: U256,
    pub source: TokenSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_name: Option<String>,
}

/// A yield strategy attached to a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub address: Address,
    pub name: Option<String>,
    pub asset_address: Option<Address>,
    #[serde(with = "decimal")]
    pub deployed_raw: U256,
}

/// A token that is always listed in a vault's token view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownToken {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

/// Token and strategy view of one vault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTokens {
    pub tokens: Vec<TokenBalance>,
    pub strategies: Vec<StrategyInfo>,
}
