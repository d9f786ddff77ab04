use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::model::{Membership, VaultTokens};

// ── Request types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    pub vault_address: String,
    pub user_address: String,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub is_member: bool,
    pub membership: Option<Membership>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTokensResponse {
    pub vault: Address,
    #[serde(flatten)]
    pub view: VaultTokens,
}
