use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::amount::decimal_opt;

/// Vault metadata as one source saw it. Every field is optional because
/// no single source reports all of them; records from different sources
/// are folded together with [`VaultFields::or`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, with = "decimal_opt", skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<U256>,
    #[serde(default, with = "decimal_opt", skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<U256>,
    #[serde(default, with = "decimal_opt", skip_serializing_if = "Option::is_none")]
    pub deposit_cap: Option<U256>,
    #[serde(default, with = "decimal_opt", skip_serializing_if = "Option::is_none")]
    pub min_deposit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
}

impl VaultFields {
    /// Keep every field `self` has, fill the gaps from `fallback`.
    pub fn or(self, fallback: &VaultFields) -> VaultFields {
        VaultFields {
            owner_address: self.owner_address.or(fallback.owner_address),
            asset_address: self.asset_address.or(fallback.asset_address),
            name: self.name.or_else(|| fallback.name.clone()),
            symbol: self.symbol.or_else(|| fallback.symbol.clone()),
            total_assets: self.total_assets.or(fallback.total_assets),
            total_supply: self.total_supply.or(fallback.total_supply),
            deposit_cap: self.deposit_cap.or(fallback.deposit_cap),
            min_deposit: self.min_deposit.or(fallback.min_deposit),
            allowlist_enabled: self.allowlist_enabled.or(fallback.allowlist_enabled),
            is_paused: self.is_paused.or(fallback.is_paused),
        }
    }
}

/// One distinct vault contract after merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub address: Address,
    #[serde(flatten)]
    pub fields: VaultFields,
}

impl VaultRecord {
    pub fn owned_by(&self, account: Address) -> bool {
        self.fields.owner_address == Some(account)
    }

    /// Display name, falling back to the symbol and then to nothing.
    pub fn label(&self) -> &str {
        self.fields
            .name
            .as_deref()
            .or(self.fields.symbol.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_prefers_self_and_fills_gaps() {
        let high = VaultFields {
            name: Some("B".into()),
            total_assets: Some(U256::from(100u64)),
            ..Default::default()
        };
        let low = VaultFields {
            name: Some("A".into()),
            symbol: Some("gvA".into()),
            total_assets: Some(U256::from(7u64)),
            is_paused: Some(false),
            ..Default::default()
        };
        let merged = high.or(&low);
        assert_eq!(merged.name.as_deref(), Some("B"));
        assert_eq!(merged.symbol.as_deref(), Some("gvA"));
        assert_eq!(merged.total_assets, Some(U256::from(100u64)));
        assert_eq!(merged.is_paused, Some(false));
        assert_eq!(merged.owner_address, None);
    }

    #[test]
    fn test_serializes_integers_as_strings() {
        let record = VaultRecord {
            address: Address::repeat_byte(0x11),
            fields: VaultFields {
                total_assets: Some(U256::from(2_000_000_000u64)),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalAssets"], "2000000000");
        assert!(json.get("totalSupply").is_none());
    }
}
