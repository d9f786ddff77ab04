use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::model::amount::{decimal, to_display};
use crate::model::{Membership, Role};

/// Raw units per display unit (USDC-style 6 decimals).
pub const DEFAULT_BASE_UNIT_DIVISOR: u64 = 1_000_000;

/// Portfolio statistics over one merged membership set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_vaults: usize,
    pub admin_vault_count: usize,
    pub member_vault_count: usize,
    /// Sum of `totalAssets` over the user's vaults, in display units.
    pub total_value_locked: f64,
    #[serde(with = "decimal")]
    pub total_value_locked_raw: U256,
    /// Sum of the user's own balances, in display units.
    pub user_position_value: f64,
    #[serde(with = "decimal")]
    pub user_position_raw: U256,
}

impl PortfolioSummary {
    pub fn empty() -> Self {
        summarize(&[], U256::from(DEFAULT_BASE_UNIT_DIVISOR))
    }
}

/// Pure and deterministic; integer sums saturate instead of wrapping.
pub fn summarize(memberships: &[Membership], divisor: U256) -> PortfolioSummary {
    let mut admin_vault_count = 0;
    let mut member_vault_count = 0;
    let mut tvl = U256::ZERO;
    let mut position = U256::ZERO;

    for m in memberships {
        match m.role {
            Role::Admin => admin_vault_count += 1,
            Role::Member => member_vault_count += 1,
        }
        tvl = tvl.saturating_add(m.vault.fields.total_assets.unwrap_or(U256::ZERO));
        position = position.saturating_add(m.user_balance);
    }

    PortfolioSummary {
        total_vaults: memberships.len(),
        admin_vault_count,
        member_vault_count,
        total_value_locked: to_display(tvl, divisor),
        total_value_locked_raw: tvl,
        user_position_value: to_display(position, divisor),
        user_position_raw: position,
    }
}
