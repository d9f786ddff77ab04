//! Chain access seams.
//!
//! Everything the core needs from a node goes through [`ContractReader`]
//! and [`LogReader`]. [`rpc::RpcChain`] implements both over JSON-RPC;
//! tests plug in in-memory tables.

pub mod registry;
pub mod rpc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

pub use rpc::RpcChain;

// ── Contract reads ───────────────────────────────────────────────────

/// A single view call on some contract. Vault, factory, strategy and
/// ERC-20 fields share one namespace; the caller picks the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractField {
    /// Factory: vaults deployed by `creator`.
    VaultsByCreator(Address),
    Owner,
    Asset,
    Name,
    Symbol,
    TotalAssets,
    TotalSupply,
    DepositCap,
    MinDeposit,
    AllowlistEnabled,
    IsAllowed(Address),
    /// Works on vault shares and on plain ERC-20 tokens alike.
    BalanceOf(Address),
    Paused,
    Strategies,
    /// Vault: every non-asset token it tracks, with balances.
    TokenBalances,
    StrategyName,
    StrategyAsset,
    StrategyTotalAssets,
    Decimals,
}

/// Decoded return value of a [`ContractField`] read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Address(Address),
    Addresses(Vec<Address>),
    Uint(U256),
    Bool(bool),
    Text(String),
    Small(u8),
    Balances(Vec<(Address, U256)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("rpc error reading {field:?} on {contract}: {message}")]
    Rpc {
        contract: Address,
        field: ContractField,
        message: String,
    },

    #[error("{field:?} on {contract} returned an unexpected value")]
    UnexpectedValue {
        contract: Address,
        field: ContractField,
    },

    #[error("log query failed: {0}")]
    Logs(String),
}

#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn read(&self, contract: Address, field: ContractField) -> Result<FieldValue, ReadError>;
}

// ── Event logs ───────────────────────────────────────────────────────

/// Allowlist-change events addressed to `account` in `from_block..=to_block`.
/// A non-empty `contracts` narrows the scan to those emitters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub contracts: Vec<Address>,
    pub account: Address,
    pub from_block: u64,
    pub to_block: u64,
}

/// One decoded `AllowlistUpdated(account, allowed)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistLog {
    pub vault: Address,
    pub account: Address,
    pub allowed: bool,
    pub block_number: u64,
    pub log_index: u64,
}

#[async_trait]
pub trait LogReader: Send + Sync {
    async fn latest_block(&self) -> Result<u64, ReadError>;
    async fn allowlist_logs(&self, query: &LogQuery) -> Result<Vec<AllowlistLog>, ReadError>;
}

// ── Typed helpers ────────────────────────────────────────────────────

fn unexpected(contract: Address, field: ContractField) -> ReadError {
    ReadError::UnexpectedValue { contract, field }
}

pub async fn read_address(
    reader: &dyn ContractReader,
    contract: Address,
    field: ContractField,
) -> Result<Address, ReadError> {
    match reader.read(contract, field.clone()).await? {
        FieldValue::Address(a) => Ok(a),
        _ => Err(unexpected(contract, field)),
    }
}

pub async fn read_addresses(
    reader: &dyn ContractReader,
    contract: Address,
    field: ContractField,
) -> Result<Vec<Address>, ReadError> {
    match reader.read(contract, field.clone()).await? {
        FieldValue::Addresses(a) => Ok(a),
        _ => Err(unexpected(contract, field)),
    }
}

pub async fn read_uint(
    reader: &dyn ContractReader,
    contract: Address,
    field: ContractField,
) -> Result<U256, ReadError> {
    match reader.read(contract, field.clone()).await? {
        FieldValue::Uint(v) => Ok(v),
        _ => Err(unexpected(contract, field)),
    }
}

pub async fn read_bool(
    reader: &dyn ContractReader,
    contract: Address,
    field: ContractField,
) -> Result<bool, ReadError> {
    match reader.read(contract, field.clone()).await? {
        FieldValue::Bool(v) => Ok(v),
        _ => Err(unexpected(contract, field)),
    }
}

pub async fn read_text(
    reader: &dyn ContractReader,
    contract: Address,
    field: ContractField,
) -> Result<String, ReadError> {
    match reader.read(contract, field.clone()).await? {
        FieldValue::Text(v) => Ok(v),
        _ => Err(unexpected(contract, field)),
    }
}

pub async fn read_decimals(reader: &dyn ContractReader, token: Address) -> Result<u8, ReadError> {
    match reader.read(token, ContractField::Decimals).await? {
        FieldValue::Small(v) => Ok(v),
        _ => Err(unexpected(token, ContractField::Decimals)),
    }
}

pub async fn read_balances(
    reader: &dyn ContractReader,
    vault: Address,
) -> Result<Vec<(Address, U256)>, ReadError> {
    match reader.read(vault, ContractField::TokenBalances).await? {
        FieldValue::Balances(v) => Ok(v),
        _ => Err(unexpected(vault, ContractField::TokenBalances)),
    }
}
