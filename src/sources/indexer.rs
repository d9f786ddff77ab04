use std::time::Duration;

use alloy::primitives::{Address, U256};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::model::address::lower_hex;
use crate::model::amount::parse_raw;
use crate::model::{Allowlist, SourceId, VaultFields, parse_address};

use super::{AdapterError, PartialMembership, SourceAdapter};

// ── API response types ───────────────────────────────────────────────

/// Rows stay raw so a single mistyped row is dropped rather than failing
/// the whole body.
#[derive(Debug, Deserialize)]
struct MembershipsResponse {
    #[serde(default)]
    memberships: Vec<serde_json::Value>,
}

/// One pre-joined membership row. Numeric fields are base-unit integer
/// strings; any field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexedMembership {
    vault_address: Option<String>,
    vault_name: Option<String>,
    vault_symbol: Option<String>,
    role: Option<String>,
    user_balance: Option<String>,
    total_assets: Option<String>,
    total_supply: Option<String>,
    is_paused: Option<bool>,
    allowlist_enabled: Option<bool>,
    is_on_allowlist: Option<bool>,
}

/// Answer of the single-vault check endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipCheck {
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_owner: bool,
    pub user_balance: Option<String>,
    pub is_on_allowlist: Option<bool>,
    pub vault_name: Option<String>,
    pub vault_symbol: Option<String>,
    pub total_assets: Option<String>,
    pub total_supply: Option<String>,
    pub is_paused: Option<bool>,
    pub allowlist_enabled: Option<bool>,
}

// ── Conversion ───────────────────────────────────────────────────────

fn amount(field: &str, value: Option<&str>) -> Option<U256> {
    let raw = value?;
    let parsed = parse_raw(raw);
    if parsed.is_none() {
        debug!(field, value = raw, "ignoring unparseable amount");
    }
    parsed
}

fn allowlist(enabled: Option<bool>, flag: Option<bool>) -> Allowlist {
    match (enabled, flag) {
        (Some(false), _) => Allowlist::Unknown,
        (_, Some(flag)) => Allowlist::from_flag(flag),
        _ => Allowlist::Unknown,
    }
}

/// Rows that do not decode become records without a vault, which the merge
/// counts as malformed.
fn decode_rows(rows: Vec<serde_json::Value>, user: Address) -> Vec<PartialMembership> {
    rows.into_iter()
        .map(|row| match serde_json::from_value::<IndexedMembership>(row) {
            Ok(row) => row.into_partial(user),
            Err(e) => {
                debug!(error = %e, "skipping undecodable membership row");
                PartialMembership::default()
            }
        })
        .collect()
}

impl IndexedMembership {
    fn into_partial(self, user: Address) -> PartialMembership {
        let vault = self
            .vault_address
            .as_deref()
            .and_then(|s| parse_address(s).ok());
        // The indexed shape carries no owner; an admin row means the user owns it.
        let owner_address = self
            .role
            .as_deref()
            .filter(|r| r.eq_ignore_ascii_case("admin"))
            .map(|_| user);

        PartialMembership {
            vault,
            fields: VaultFields {
                owner_address,
                name: self.vault_name,
                symbol: self.vault_symbol,
                total_assets: amount("totalAssets", self.total_assets.as_deref()),
                total_supply: amount("totalSupply", self.total_supply.as_deref()),
                allowlist_enabled: self.allowlist_enabled,
                is_paused: self.is_paused,
                ..Default::default()
            },
            user_balance: amount("userBalance", self.user_balance.as_deref()),
            allowlist: allowlist(self.allowlist_enabled, self.is_on_allowlist),
        }
    }
}

impl MembershipCheck {
    /// `isMember` stands in for the allowlist flag when the check gave no
    /// allowlist answer, so a member without a balance still qualifies.
    pub fn into_partial(self, vault: Address, user: Address) -> PartialMembership {
        let allowlist = match allowlist(self.allowlist_enabled, self.is_on_allowlist) {
            Allowlist::Unknown if self.is_member => Allowlist::Allowed,
            other => other,
        };
        PartialMembership {
            vault: Some(vault),
            fields: VaultFields {
                owner_address: self.is_owner.then_some(user),
                name: self.vault_name,
                symbol: self.vault_symbol,
                total_assets: amount("totalAssets", self.total_assets.as_deref()),
                total_supply: amount("totalSupply", self.total_supply.as_deref()),
                allowlist_enabled: self.allowlist_enabled,
                is_paused: self.is_paused,
                ..Default::default()
            },
            user_balance: amount("userBalance", self.user_balance.as_deref()),
            allowlist,
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client for the membership indexing service.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    client: reqwest::Client,
    base_url: String,
}

impl IndexerClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("vault-discovery/0.1")
            .build()
            .context("creating HTTP client")?;
        Ok(IndexerClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /memberships?user=`: every vault the indexer links to `user`.
    pub async fn memberships(&self, user: Address) -> Result<Vec<PartialMembership>, AdapterError> {
        let url = format!("{}/memberships?user={}", self.base_url, lower_hex(&user));
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AdapterError::Status(response.status().as_u16()));
        }
        let body: MembershipsResponse = response.json().await?;
        Ok(decode_rows(body.memberships, user))
    }

    /// `GET /check-membership?vaultAddress=&userAddress=`
    pub async fn check_membership(
        &self,
        vault: Address,
        user: Address,
    ) -> Result<MembershipCheck, AdapterError> {
        let url = format!(
            "{}/check-membership?vaultAddress={}&userAddress={}",
            self.base_url,
            lower_hex(&vault),
            lower_hex(&user),
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AdapterError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

// ── Adapter ──────────────────────────────────────────────────────────

/// The preferred source: one batched call instead of per-vault reads.
pub struct IndexedApiAdapter {
    client: IndexerClient,
}

impl IndexedApiAdapter {
    pub fn new(client: IndexerClient) -> Self {
        IndexedApiAdapter { client }
    }
}

#[async_trait]
impl SourceAdapter for IndexedApiAdapter {
    fn id(&self) -> SourceId {
        SourceId::IndexedApi
    }

    async fn fetch(&self, user: Address) -> Result<Vec<PartialMembership>, AdapterError> {
        self.client.memberships(user).await
    }
}
