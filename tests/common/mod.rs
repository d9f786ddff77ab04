#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use vault_discovery::evm::{
    AllowlistLog, ContractField, ContractReader, FieldValue, LogQuery, LogReader, ReadError,
};
use vault_discovery::model::{Allowlist, SourceId, VaultFields};
use vault_discovery::sources::{AdapterError, PartialMembership, SourceAdapter};

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn units(n: u64) -> U256 {
    U256::from(n)
}

// ── In-memory chain ──────────────────────────────────────────────────

/// Contract fields and allowlist logs held in memory. Unset fields revert.
#[derive(Default)]
pub struct MockChain {
    fields: Mutex<HashMap<(Address, ContractField), FieldValue>>,
    broken: Mutex<HashSet<Address>>,
    logs: Mutex<Vec<AllowlistLog>>,
    queries: Mutex<Vec<LogQuery>>,
    head: AtomicU64,
    logs_down: AtomicBool,
    reads: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(MockChain::default())
    }

    pub fn set(&self, contract: Address, field: ContractField, value: FieldValue) {
        self.fields.lock().unwrap().insert((contract, field), value);
    }

    /// A vault with the usual metadata set.
    pub fn vault(&self, vault: Address, owner: Address, name: &str, total_assets: u64) {
        self.set(vault, ContractField::Owner, FieldValue::Address(owner));
        self.set(vault, ContractField::Name, FieldValue::Text(name.to_string()));
        self.set(vault, ContractField::TotalAssets, FieldValue::Uint(units(total_assets)));
        self.set(vault, ContractField::AllowlistEnabled, FieldValue::Bool(true));
        self.set(vault, ContractField::Paused, FieldValue::Bool(false));
    }

    pub fn balance(&self, token: Address, holder: Address, amount: u64) {
        self.set(token, ContractField::BalanceOf(holder), FieldValue::Uint(units(amount)));
    }

    /// Every read against `contract` fails.
    pub fn break_contract(&self, contract: Address) {
        self.broken.lock().unwrap().insert(contract);
    }

    pub fn set_head(&self, block: u64) {
        self.head.store(block, Ordering::SeqCst);
    }

    pub fn push_log(&self, vault: Address, account: Address, allowed: bool, block_number: u64, log_index: u64) {
        self.logs.lock().unwrap().push(AllowlistLog {
            vault,
            account,
            allowed,
            block_number,
            log_index,
        });
    }

    pub fn set_logs_down(&self, down: bool) {
        self.logs_down.store(down, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractReader for MockChain {
    async fn read(&self, contract: Address, field: ContractField) -> Result<FieldValue, ReadError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.broken.lock().unwrap().contains(&contract) {
            return Err(ReadError::Rpc {
                contract,
                field,
                message: "connection reset".into(),
            });
        }
        let value = self.fields.lock().unwrap().get(&(contract, field.clone())).cloned();
        value.ok_or(ReadError::Rpc {
            contract,
            field,
            message: "execution reverted".into(),
        })
    }
}

#[async_trait]
impl LogReader for MockChain {
    async fn latest_block(&self) -> Result<u64, ReadError> {
        if self.logs_down.load(Ordering::SeqCst) {
            return Err(ReadError::Logs("node unavailable".into()));
        }
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn allowlist_logs(&self, query: &LogQuery) -> Result<Vec<AllowlistLog>, ReadError> {
        if self.logs_down.load(Ordering::SeqCst) {
            return Err(ReadError::Logs("node unavailable".into()));
        }
        self.queries.lock().unwrap().push(query.clone());
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.account == query.account)
            .filter(|l| l.block_number >= query.from_block && l.block_number <= query.to_block)
            .filter(|l| query.contracts.is_empty() || query.contracts.contains(&l.vault))
            .cloned()
            .collect())
    }
}

// ── Scripted sources ─────────────────────────────────────────────────

/// A source that answers with fixed records (or fails) after an optional
/// delay, counting its calls.
pub struct ScriptedSource {
    id: SourceId,
    answer: Result<Vec<PartialMembership>, AdapterError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn ok(id: SourceId, records: Vec<PartialMembership>) -> Self {
        ScriptedSource {
            id,
            answer: Ok(records),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(id: SourceId) -> Self {
        ScriptedSource {
            id,
            answer: Err(AdapterError::Http("connection refused".into())),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn fetch(&self, _user: Address) -> Result<Vec<PartialMembership>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answer.clone()
    }
}

// ── Record builders ──────────────────────────────────────────────────

pub fn owned(vault: Address, owner: Address, name: &str) -> PartialMembership {
    PartialMembership {
        vault: Some(vault),
        fields: VaultFields {
            owner_address: Some(owner),
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn holding(vault: Address, balance: u64, total_assets: u64) -> PartialMembership {
    PartialMembership {
        vault: Some(vault),
        fields: VaultFields {
            total_assets: Some(units(total_assets)),
            ..Default::default()
        },
        user_balance: Some(units(balance)),
        ..Default::default()
    }
}

pub fn allowlisted(vault: Address, allowed: bool) -> PartialMembership {
    PartialMembership {
        vault: Some(vault),
        allowlist: Allowlist::from_flag(allowed),
        ..Default::default()
    }
}
