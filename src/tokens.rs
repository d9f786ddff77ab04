//! Token and strategy view of a single vault.
//!
//! Token balances come from four places: the vault's asset, the chain's
//! always-shown base tokens, the vault's own token-balance table, and the
//! assets deployed into attached strategies. They are keyed by token
//! address and summed across vault and strategies, so a token that sits in
//! the vault and is mid-harvest in a strategy shows up once.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::evm::{self, ContractField, ContractReader};
use crate::model::{KnownToken, StrategyInfo, TokenBalance, TokenSource, VaultTokens};

const DEFAULT_DECIMALS: u8 = 18;

pub struct TokenStrategyResolver {
    reader: Arc<dyn ContractReader>,
    known: Vec<KnownToken>,
}

impl TokenStrategyResolver {
    pub fn new(reader: Arc<dyn ContractReader>, known: Vec<KnownToken>) -> Self {
        TokenStrategyResolver { reader, known }
    }

    /// Best-effort: every read is independent and a failed one only leaves
    /// its piece out. Known tokens are always listed.
    pub async fn resolve(&self, vault: Address) -> VaultTokens {
        let reader = self.reader.as_ref();

        let (asset, table, strategy_addrs) = tokio::join!(
            evm::read_address(reader, vault, ContractField::Asset),
            evm::read_balances(reader, vault),
            evm::read_addresses(reader, vault, ContractField::Strategies),
        );
        let asset = asset
            .map_err(|e| debug!(%vault, error = %e, "no asset"))
            .ok();
        let table = table.unwrap_or_else(|e| {
            debug!(%vault, error = %e, "no token balance table");
            Vec::new()
        });
        let strategy_addrs = strategy_addrs.unwrap_or_else(|e| {
            debug!(%vault, error = %e, "no strategies");
            Vec::new()
        });

        let strategies = join_all(strategy_addrs.into_iter().map(|s| self.read_strategy(s))).await;

        // Vault-held balances: the balance table first, then direct reads for
        // the asset and known tokens it did not cover.
        let mut held: HashMap<Address, U256> = HashMap::new();
        for (token, balance) in table {
            held.entry(token).or_insert(balance);
        }
        let mut direct: BTreeSet<Address> = self.known.iter().map(|t| t.address).collect();
        direct.extend(asset);
        direct.retain(|t| !held.contains_key(t));
        let reads = join_all(direct.into_iter().map(|token| async move {
            let balance = evm::read_uint(reader, token, ContractField::BalanceOf(vault)).await;
            (token, balance)
        }))
        .await;
        for (token, balance) in reads {
            match balance {
                Ok(balance) => {
                    held.insert(token, balance);
                }
                Err(e) => debug!(%token, error = %e, "balance read failed"),
            }
        }

        // Strategy-held balances, summed per asset.
        let mut deployed: HashMap<Address, (U256, Option<String>)> = HashMap::new();
        for s in &strategies {
            let Some(token) = s.asset_address else {
                continue;
            };
            let entry = deployed.entry(token).or_insert((U256::ZERO, None));
            entry.0 = entry.0.saturating_add(s.deployed_raw);
            if entry.1.is_none() {
                entry.1 = s.name.clone();
            }
        }

        let mut keys: BTreeSet<Address> = held.keys().copied().collect();
        keys.extend(deployed.keys().copied());
        keys.extend(self.known.iter().map(|t| t.address));
        keys.extend(asset);

        let metadata = join_all(keys.iter().map(|t| self.metadata(*t))).await;
        let mut by_token: BTreeMap<Address, TokenBalance> = BTreeMap::new();
        for (token, (symbol, decimals)) in keys.into_iter().zip(metadata) {
            let vault_part = held.get(&token).copied().unwrap_or(U256::ZERO);
            let (strategy_part, strategy_name) = deployed
                .get(&token)
                .cloned()
                .unwrap_or((U256::ZERO, None));
            let source = if vault_part.is_zero() && !strategy_part.is_zero() {
                TokenSource::Strategy
            } else {
                TokenSource::Vault
            };
            by_token.insert(
                token,
                TokenBalance {
                    token_address: token,
                    symbol,
                    decimals,
                    balance_raw: vault_part.saturating_add(strategy_part),
                    source,
                    strategy_name: strategy_name.filter(|_| !strategy_part.is_zero()),
                },
            );
        }

        let mut tokens = Vec::with_capacity(by_token.len());
        if let Some(first) = asset.and_then(|a| by_token.remove(&a)) {
            tokens.push(first);
        }
        tokens.extend(by_token.into_values());

        if tokens.is_empty() && strategies.is_empty() {
            warn!(%vault, "no token data for vault");
        }
        VaultTokens { tokens, strategies }
    }

    async fn read_strategy(&self, address: Address) -> StrategyInfo {
        let reader = self.reader.as_ref();
        let (name, asset, deployed) = tokio::join!(
            evm::read_text(reader, address, ContractField::StrategyName),
            evm::read_address(reader, address, ContractField::StrategyAsset),
            evm::read_uint(reader, address, ContractField::StrategyTotalAssets),
        );
        StrategyInfo {
            address,
            name: name.ok(),
            asset_address: asset.ok(),
            deployed_raw: deployed.unwrap_or(U256::ZERO),
        }
    }

    /// Symbol and decimals: known table first, then the token itself.
    async fn metadata(&self, token: Address) -> (Option<String>, u8) {
        if let Some(known) = self.known.iter().find(|t| t.address == token) {
            return (Some(known.symbol.clone()), known.decimals);
        }
        let reader = self.reader.as_ref();
        let (symbol, decimals) = tokio::join!(
            evm::read_text(reader, token, ContractField::Symbol),
            evm::read_decimals(reader, token),
        );
        (symbol.ok(), decimals.unwrap_or(DEFAULT_DECIMALS))
    }
}
