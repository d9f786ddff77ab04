mod common;

use std::sync::Arc;

use common::*;

use vault_discovery::evm::{ContractField, FieldValue};
use vault_discovery::model::{Allowlist, SourceId};
use vault_discovery::sources::{
    BoundedRecentWindow, CheckpointedIncremental, EventLogAdapter, FactoryAdminAdapter, SourceAdapter,
};

const USER: u8 = 0x42;

#[tokio::test]
async fn test_factory_reads_each_vault_independently() {
    let user = addr(USER);
    let factory = addr(0xfa);
    let chain = MockChain::new();
    chain.set(
        factory,
        ContractField::VaultsByCreator(user),
        FieldValue::Addresses(vec![addr(0xb2), addr(0xa1), addr(0xb2)]),
    );
    chain.vault(addr(0xa1), user, "Healthy", 500);
    chain.break_contract(addr(0xb2));

    let adapter = FactoryAdminAdapter::new(chain.clone(), factory);
    assert_eq!(adapter.id(), SourceId::FactoryAdmin);
    let records = adapter.fetch(user).await.unwrap();

    assert_eq!(records.len(), 2);
    let healthy = records.iter().find(|r| r.vault == Some(addr(0xa1))).unwrap();
    assert_eq!(healthy.fields.name.as_deref(), Some("Healthy"));
    let broken = records.iter().find(|r| r.vault == Some(addr(0xb2))).unwrap();
    assert_eq!(broken.fields.name, None);
    assert_eq!(broken.fields.owner_address, Some(user));
}

#[tokio::test]
async fn test_factory_fails_without_creator_list() {
    let chain = MockChain::new();
    let adapter = FactoryAdminAdapter::new(chain.clone(), addr(0xfa));
    assert!(adapter.fetch(addr(USER)).await.is_err());
}

#[tokio::test]
async fn test_recent_window_scans_in_chunks() {
    let user = addr(USER);
    let chain = MockChain::new();
    chain.set_head(1_000);
    chain.push_log(addr(0xa1), user, true, 850, 0);
    chain.push_log(addr(0xb2), user, true, 950, 0);
    chain.push_log(addr(0xb2), user, false, 990, 1);
    chain.push_log(addr(0xc3), user, true, 999, 4);
    chain.push_log(addr(0xd4), addr(0x01), true, 999, 5);

    let adapter = EventLogAdapter::new(chain.clone(), Arc::new(BoundedRecentWindow::new(100)), 30);
    let mut records = adapter.fetch(user).await.unwrap();
    records.sort_by_key(|r| r.vault);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].vault, Some(addr(0xb2)));
    assert_eq!(records[0].allowlist, Allowlist::Denied);
    assert_eq!(records[1].vault, Some(addr(0xc3)));
    assert_eq!(records[1].allowlist, Allowlist::Allowed);

    let queries = chain.queries();
    assert_eq!(queries.len(), 4);
    assert_eq!(queries.iter().map(|q| q.from_block).min(), Some(901));
    assert_eq!(queries.iter().map(|q| q.to_block).max(), Some(1_000));
}

#[tokio::test]
async fn test_checkpointed_scan_is_incremental() {
    let user = addr(USER);
    let chain = MockChain::new();
    chain.set_head(500);
    chain.push_log(addr(0xa1), user, true, 120, 0);

    let policy = Arc::new(CheckpointedIncremental::new(100));
    let adapter = EventLogAdapter::new(chain.clone(), policy.clone(), 10_000);

    let first = adapter.fetch(user).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(policy.checkpoint(user), Some(500));

    chain.set_head(600);
    chain.push_log(addr(0xb2), user, true, 550, 0);
    let second = adapter.fetch(user).await.unwrap();
    assert_eq!(second.len(), 2);

    let last = chain.queries().last().cloned().unwrap();
    assert_eq!((last.from_block, last.to_block), (501, 600));
}

#[tokio::test]
async fn test_events_from_untrusted_contracts_are_ignored() {
    let user = addr(USER);
    let chain = MockChain::new();
    chain.set_head(1_000);
    chain.push_log(addr(0xa1), user, true, 950, 0);
    chain.push_log(addr(0xee), user, true, 960, 0);

    let adapter = EventLogAdapter::new(chain.clone(), Arc::new(BoundedRecentWindow::new(100)), 100)
        .with_contracts(vec![addr(0xa1)]);
    let records = adapter.fetch(user).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vault, Some(addr(0xa1)));
    assert!(chain.queries().iter().all(|q| q.contracts == vec![addr(0xa1)]));
}

#[tokio::test]
async fn test_event_adapter_fails_when_node_is_down() {
    let chain = MockChain::new();
    chain.set_logs_down(true);
    let adapter = EventLogAdapter::new(chain.clone(), Arc::new(BoundedRecentWindow::new(100)), 10);
    assert!(adapter.fetch(addr(USER)).await.is_err());
}
