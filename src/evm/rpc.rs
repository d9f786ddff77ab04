use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use alloy::sol;
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{AllowlistLog, ContractField, ContractReader, FieldValue, LogQuery, LogReader, ReadError};

// ── Vault system interfaces ──────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IVaultFactory {
        function getVaultsByCreator(address creator) external view returns (address[] memory);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IGroupVault {
        event AllowlistUpdated(address indexed account, bool allowed);

        function owner() external view returns (address);
        function asset() external view returns (address);
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function totalAssets() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function depositCap() external view returns (uint256);
        function minDeposit() external view returns (uint256);
        function allowlistEnabled() external view returns (bool);
        function isAllowed(address account) external view returns (bool);
        function paused() external view returns (bool);
        function getStrategies() external view returns (address[] memory);
        function getTokenBalances() external view returns (address[] memory tokens, uint256[] memory balances);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IStrategy {
        function name() external view returns (string memory);
        function asset() external view returns (address);
        function totalAssets() external view returns (uint256);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20Meta {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

// ── JSON-RPC implementation ──────────────────────────────────────────

/// Read-only JSON-RPC access for contract fields and allowlist logs.
#[derive(Clone)]
pub struct RpcChain {
    provider: DynProvider,
}

impl RpcChain {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL `{rpc_url}`"))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(RpcChain { provider })
    }
}

#[async_trait]
impl ContractReader for RpcChain {
    async fn read(&self, contract: Address, field: ContractField) -> Result<FieldValue, ReadError> {
        let p = &self.provider;
        let factory = IVaultFactory::new(contract, p);
        let vault = IGroupVault::new(contract, p);
        let strategy = IStrategy::new(contract, p);
        let token = IERC20Meta::new(contract, p);

        let result = match &field {
            ContractField::VaultsByCreator(creator) => factory
                .getVaultsByCreator(*creator)
                .call()
                .await
                .map(FieldValue::Addresses),
            ContractField::Owner => vault.owner().call().await.map(FieldValue::Address),
            ContractField::Asset => vault.asset().call().await.map(FieldValue::Address),
            ContractField::Name => vault.name().call().await.map(FieldValue::Text),
            ContractField::Symbol => vault.symbol().call().await.map(FieldValue::Text),
            ContractField::TotalAssets => vault.totalAssets().call().await.map(FieldValue::Uint),
            ContractField::TotalSupply => vault.totalSupply().call().await.map(FieldValue::Uint),
            ContractField::DepositCap => vault.depositCap().call().await.map(FieldValue::Uint),
            ContractField::MinDeposit => vault.minDeposit().call().await.map(FieldValue::Uint),
            ContractField::AllowlistEnabled => {
                vault.allowlistEnabled().call().await.map(FieldValue::Bool)
            }
            ContractField::IsAllowed(account) => {
                vault.isAllowed(*account).call().await.map(FieldValue::Bool)
            }
            ContractField::BalanceOf(holder) => {
                token.balanceOf(*holder).call().await.map(FieldValue::Uint)
            }
            ContractField::Paused => vault.paused().call().await.map(FieldValue::Bool),
            ContractField::Strategies => {
                vault.getStrategies().call().await.map(FieldValue::Addresses)
            }
            ContractField::TokenBalances => vault.getTokenBalances().call().await.map(|r| {
                FieldValue::Balances(r.tokens.into_iter().zip(r.balances).collect())
            }),
            ContractField::StrategyName => strategy.name().call().await.map(FieldValue::Text),
            ContractField::StrategyAsset => {
                strategy.asset().call().await.map(FieldValue::Address)
            }
            ContractField::StrategyTotalAssets => {
                strategy.totalAssets().call().await.map(FieldValue::Uint)
            }
            ContractField::Decimals => token.decimals().call().await.map(FieldValue::Small),
        };

        result.map_err(|e| ReadError::Rpc {
            contract,
            field,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl LogReader for RpcChain {
    async fn latest_block(&self) -> Result<u64, ReadError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ReadError::Logs(e.to_string()))
    }

    async fn allowlist_logs(&self, query: &LogQuery) -> Result<Vec<AllowlistLog>, ReadError> {
        let mut filter = Filter::new()
            .event_signature(IGroupVault::AllowlistUpdated::SIGNATURE_HASH)
            .topic1(query.account.into_word())
            .from_block(query.from_block)
            .to_block(query.to_block);
        if !query.contracts.is_empty() {
            filter = filter.address(query.contracts.clone());
        }

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ReadError::Logs(e.to_string()))?;

        let mut out = Vec::with_capacity(logs.len());
        for log in logs {
            // Pending logs have no position yet and cannot be ordered.
            let (Some(block_number), Some(log_index)) = (log.block_number, log.log_index) else {
                continue;
            };
            let decoded = match log.log_decode::<IGroupVault::AllowlistUpdated>() {
                Ok(d) => d,
                Err(e) => {
                    debug!(block_number, log_index, error = %e, "skipping undecodable allowlist log");
                    continue;
                }
            };
            out.push(AllowlistLog {
                vault: decoded.inner.address,
                account: decoded.inner.data.account,
                allowed: decoded.inner.data.allowed,
                block_number,
                log_index,
            });
        }
        Ok(out)
    }
}
