//! Best-effort per-vault on-chain reads shared by the factory adapter,
//! the fallback chain and single-vault lookups.

use alloy::primitives::Address;
use tracing::debug;

use crate::evm::{self, ContractField, ContractReader, ReadError};
use crate::model::{Allowlist, VaultFields};

use super::PartialMembership;

/// Read every metadata field concurrently. A failed field is left empty;
/// it never fails the others.
pub async fn read_vault_fields(reader: &dyn ContractReader, vault: Address) -> VaultFields {
    let (
        owner,
        asset,
        name,
        symbol,
        total_assets,
        total_supply,
        deposit_cap,
        min_deposit,
        allowlist_enabled,
        paused,
    ) = tokio::join!(
        evm::read_address(reader, vault, ContractField::Owner),
        evm::read_address(reader, vault, ContractField::Asset),
        evm::read_text(reader, vault, ContractField::Name),
        evm::read_text(reader, vault, ContractField::Symbol),
        evm::read_uint(reader, vault, ContractField::TotalAssets),
        evm::read_uint(reader, vault, ContractField::TotalSupply),
        evm::read_uint(reader, vault, ContractField::DepositCap),
        evm::read_uint(reader, vault, ContractField::MinDeposit),
        evm::read_bool(reader, vault, ContractField::AllowlistEnabled),
        evm::read_bool(reader, vault, ContractField::Paused),
    );

    VaultFields {
        owner_address: keep(owner),
        asset_address: keep(asset),
        name: keep(name),
        symbol: keep(symbol),
        total_assets: keep(total_assets),
        total_supply: keep(total_supply),
        deposit_cap: keep(deposit_cap),
        min_deposit: keep(min_deposit),
        allowlist_enabled: keep(allowlist_enabled),
        is_paused: keep(paused),
    }
}

/// Metadata plus the user's share balance and allowlist flag.
///
/// The allowlist flag is only a definite answer when the vault has its
/// allowlist switched on; otherwise it is reported as unknown.
pub async fn read_partial(
    reader: &dyn ContractReader,
    vault: Address,
    user: Address,
) -> PartialMembership {
    let (fields, balance, allowed) = tokio::join!(
        read_vault_fields(reader, vault),
        evm::read_uint(reader, vault, ContractField::BalanceOf(user)),
        evm::read_bool(reader, vault, ContractField::IsAllowed(user)),
    );

    let allowlist = match (fields.allowlist_enabled, keep(allowed)) {
        (Some(true), Some(flag)) => Allowlist::from_flag(flag),
        _ => Allowlist::Unknown,
    };

    PartialMembership {
        vault: Some(vault),
        fields,
        user_balance: keep(balance),
        allowlist,
    }
}

fn keep<T>(result: Result<T, ReadError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(error = %e, "field read failed");
            None
        }
    }
}
