use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use crate::evm::{AllowlistLog, LogQuery, LogReader};
use crate::model::{Allowlist, SourceId};

use super::log_range::{AllowlistState, LogRangeStrategy};
use super::{AdapterError, PartialMembership, SourceAdapter};

/// Vaults where the user was ever granted (or stripped of) allowlist
/// access, from `AllowlistUpdated` events.
///
/// With no trusted contracts configured, any emitter of the event counts as
/// a vault.
pub struct EventLogAdapter {
    logs: Arc<dyn LogReader>,
    range: Arc<dyn LogRangeStrategy>,
    chunk_size: u64,
    contracts: Vec<Address>,
}

impl EventLogAdapter {
    pub fn new(logs: Arc<dyn LogReader>, range: Arc<dyn LogRangeStrategy>, chunk_size: u64) -> Self {
        EventLogAdapter {
            logs,
            range,
            chunk_size: chunk_size.max(1),
            contracts: Vec::new(),
        }
    }

    /// Only accept events emitted by these contracts.
    pub fn with_contracts(mut self, contracts: Vec<Address>) -> Self {
        self.contracts = contracts;
        self
    }
}

#[async_trait]
impl SourceAdapter for EventLogAdapter {
    fn id(&self) -> SourceId {
        SourceId::EventLog
    }

    async fn fetch(&self, user: Address) -> Result<Vec<PartialMembership>, AdapterError> {
        let head = self.logs.latest_block().await?;
        let plan = self.range.plan(user, head);

        let mut entries = Vec::new();
        if let Some(range) = plan {
            let queries: Vec<LogQuery> = range
                .chunks(self.chunk_size)
                .into_iter()
                .map(|chunk| LogQuery {
                    contracts: self.contracts.clone(),
                    account: user,
                    from_block: chunk.from,
                    to_block: chunk.to,
                })
                .collect();
            debug!(
                policy = self.range.name(),
                from = range.from,
                to = range.to,
                chunks = queries.len(),
                "scanning allowlist events"
            );

            let results = join_all(queries.iter().map(|q| self.logs.allowlist_logs(q))).await;
            for result in results {
                entries.extend(result?);
            }
            if !self.contracts.is_empty() {
                entries.retain(|e| self.contracts.contains(&e.vault));
            }
        }

        let state = self.range.settle(user, plan, latest_per_vault(user, entries));
        Ok(state
            .into_iter()
            .map(|(vault, allowed)| PartialMembership {
                vault: Some(vault),
                allowlist: Allowlist::from_flag(allowed),
                ..Default::default()
            })
            .collect())
    }
}

/// Fold events into the final flag per vault: the event with the highest
/// (block number, log index) wins regardless of the order they arrived in.
pub fn latest_per_vault(user: Address, mut entries: Vec<AllowlistLog>) -> AllowlistState {
    entries.retain(|e| e.account == user);
    entries.sort_by_key(|e| (e.block_number, e.log_index));

    let mut state = AllowlistState::new();
    for entry in entries {
        state.insert(entry.vault, entry.allowed);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(vault: u8, allowed: bool, block_number: u64, log_index: u64) -> AllowlistLog {
        AllowlistLog {
            vault: Address::repeat_byte(vault),
            account: Address::repeat_byte(1),
            allowed,
            block_number,
            log_index,
        }
    }

    #[test]
    fn test_last_event_wins_by_block_then_index() {
        let user = Address::repeat_byte(1);
        let entries = vec![
            log(0xa, false, 20, 3),
            log(0xa, true, 20, 1),
            log(0xb, true, 30, 0),
            log(0xb, false, 12, 9),
            log(0xa, true, 15, 7),
        ];
        let state = latest_per_vault(user, entries);
        assert_eq!(state.get(&Address::repeat_byte(0xa)), Some(&false));
        assert_eq!(state.get(&Address::repeat_byte(0xb)), Some(&true));
    }

    #[test]
    fn test_ignores_other_accounts() {
        let user = Address::repeat_byte(1);
        let mut stray = log(0xc, true, 5, 0);
        stray.account = Address::repeat_byte(2);
        assert!(latest_per_vault(user, vec![stray]).is_empty());
    }
}
