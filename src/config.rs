use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result, anyhow, bail};

use crate::evm::registry::base_tokens;
use crate::evm::{ContractReader, LogReader, RpcChain};
use crate::model::amount::parse_raw;
use crate::model::{Chain, KnownToken, parse_address};
use crate::portfolio::DEFAULT_BASE_UNIT_DIVISOR;
use crate::reconcile::ReconciliationController;
use crate::sources::{
    BoundedRecentWindow, CheckpointedIncremental, EventLogAdapter, FactoryAdminAdapter,
    IndexedApiAdapter, IndexerClient, LogRangeStrategy,
};
use crate::tokens::TokenStrategyResolver;

const DEFAULT_CHAIN: &str = "base";
const DEFAULT_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_POLL_SECS: u64 = 30;
const DEFAULT_RECENT_WINDOW: u64 = 50_000;
const DEFAULT_CHUNK_SIZE: u64 = 10_000;

/// How far back the allowlist event scan looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRangePolicy {
    Recent(u64),
    Checkpoint(u64),
}

impl LogRangePolicy {
    /// `recent:<blocks>` or `checkpoint:<start_block>`.
    pub fn parse(s: &str) -> Result<Self> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("invalid log range policy '{s}'. Use 'recent:<blocks>' or 'checkpoint:<block>'."))?;
        let n: u64 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid block number in log range policy '{s}'"))?;
        match kind.trim().to_lowercase().as_str() {
            "recent" if n == 0 => bail!("recent window must be at least one block"),
            "recent" => Ok(LogRangePolicy::Recent(n)),
            "checkpoint" => Ok(LogRangePolicy::Checkpoint(n)),
            other => bail!("unknown log range policy '{other}'. Use 'recent' or 'checkpoint'."),
        }
    }

    pub fn strategy(&self) -> Arc<dyn LogRangeStrategy> {
        match *self {
            LogRangePolicy::Recent(window) => Arc::new(BoundedRecentWindow::new(window)),
            LogRangePolicy::Checkpoint(start) => Arc::new(CheckpointedIncremental::new(start)),
        }
    }
}

/// `SYMBOL:0xaddr:decimals` entries separated by commas.
pub fn parse_known_tokens(s: &str) -> Result<Vec<KnownToken>> {
    s.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [symbol, address, decimals] = parts.as_slice() else {
                bail!("invalid known token '{entry}'. Expected SYMBOL:0xaddress:decimals.");
            };
            let address = parse_address(address).with_context(|| format!("known token '{symbol}'"))?;
            let decimals: u8 = decimals
                .parse()
                .with_context(|| format!("invalid decimals for known token '{symbol}'"))?;
            Ok(KnownToken {
                symbol: symbol.to_uppercase(),
                address,
                decimals,
            })
        })
        .collect()
}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chain: Chain,
    pub factory: Option<Address>,
    pub indexer_url: Option<String>,
    pub adapter_timeout: Duration,
    pub poll_interval: Duration,
    pub log_range: LogRangePolicy,
    pub log_chunk_size: u64,
    pub base_unit_divisor: U256,
    pub known_tokens: Vec<KnownToken>,
    /// Emitters trusted for allowlist events. Empty accepts any contract.
    pub allowlist_contracts: Vec<Address>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and empty values take defaults;
    /// set but invalid values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chain_name = get("VAULT_CHAIN").unwrap_or_else(|| DEFAULT_CHAIN.to_string());
        let mut chain = Chain::from_name(&chain_name).ok_or_else(|| {
            anyhow!("unknown chain '{chain_name}'. Use ethereum, base, arbitrum, optimism, mantle or hyperevm.")
        })?;
        if let Some(url) = get("VAULT_RPC_URL") {
            chain = chain.with_rpc_url(url);
        }

        let factory = get("VAULT_FACTORY_ADDRESS")
            .map(|s| parse_address(&s).context("VAULT_FACTORY_ADDRESS"))
            .transpose()?;

        let adapter_timeout = Duration::from_millis(number(&get, "ADAPTER_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?);
        let poll_interval = Duration::from_secs(number(&get, "POLL_INTERVAL_SECS", DEFAULT_POLL_SECS)?);
        if adapter_timeout.is_zero() || poll_interval.is_zero() {
            bail!("ADAPTER_TIMEOUT_MS and POLL_INTERVAL_SECS must be greater than zero");
        }

        let log_range = match get("LOG_RANGE_POLICY") {
            Some(s) => LogRangePolicy::parse(&s).context("LOG_RANGE_POLICY")?,
            None => LogRangePolicy::Recent(DEFAULT_RECENT_WINDOW),
        };
        let log_chunk_size = number(&get, "LOG_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?.max(1);

        let base_unit_divisor = match get("BASE_UNIT_DIVISOR") {
            Some(s) => parse_raw(s.trim())
                .filter(|d| !d.is_zero())
                .ok_or_else(|| anyhow!("BASE_UNIT_DIVISOR must be a positive integer, got '{s}'"))?,
            None => U256::from(DEFAULT_BASE_UNIT_DIVISOR),
        };

        let known_tokens = match get("KNOWN_TOKENS") {
            Some(s) => parse_known_tokens(&s).context("KNOWN_TOKENS")?,
            None => base_tokens(chain.chain_id),
        };

        let allowlist_contracts = match get("ALLOWLIST_CONTRACTS") {
            Some(s) => parse_addresses(&s).context("ALLOWLIST_CONTRACTS")?,
            None => Vec::new(),
        };

        Ok(AppConfig {
            chain,
            factory,
            indexer_url: get("VAULT_INDEXER_URL"),
            adapter_timeout,
            poll_interval,
            log_range,
            log_chunk_size,
            base_unit_divisor,
            known_tokens,
            allowlist_contracts,
        })
    }

    /// Wire the controller and token resolver against live endpoints.
    pub fn build(&self) -> Result<Services> {
        let rpc = Arc::new(RpcChain::connect(&self.chain.rpc_url)?);
        let reader: Arc<dyn ContractReader> = rpc.clone();
        let logs: Arc<dyn LogReader> = rpc;

        let mut builder = ReconciliationController::builder()
            .adapter_timeout(self.adapter_timeout)
            .base_unit_divisor(self.base_unit_divisor)
            .fallback_reader(reader.clone());

        if let Some(url) = &self.indexer_url {
            let client = IndexerClient::new(url, self.adapter_timeout)?;
            builder = builder
                .source(Arc::new(IndexedApiAdapter::new(client.clone())))
                .indexer(client);
        }
        if let Some(factory) = self.factory {
            builder = builder.source(Arc::new(FactoryAdminAdapter::new(reader.clone(), factory)));
        }
        let events = EventLogAdapter::new(logs, self.log_range.strategy(), self.log_chunk_size)
            .with_contracts(self.allowlist_contracts.clone());
        builder = builder.source(Arc::new(events));

        Ok(Services {
            controller: builder.build(),
            resolver: TokenStrategyResolver::new(reader, self.known_tokens.clone()),
        })
    }
}

/// Comma-separated addresses.
pub fn parse_addresses(s: &str) -> Result<Vec<Address>> {
    s.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_address(entry).with_context(|| format!("invalid address '{entry}'")))
        .collect()
}

fn number(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match get(key) {
        Some(s) => s
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer, got '{s}'")),
        None => Ok(default),
    }
}

/// Everything the commands and the server need at runtime.
pub struct Services {
    pub controller: ReconciliationController,
    pub resolver: TokenStrategyResolver,
}
