mod common;

use std::collections::HashMap;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};

use common::*;

use vault_discovery::merge::merge;
use vault_discovery::model::{Allowlist, SourceId};
use vault_discovery::sources::{AdapterError, IndexedApiAdapter, IndexerClient, SourceAdapter, SourceReport};

const USER: &str = "0x4242424242424242424242424242424242424242";

async fn memberships(Query(q): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    if q.get("user").map(String::as_str) != Some(USER) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "memberships": [
            {
                "vaultAddress": "0xA1A1A1A1A1A1A1A1A1A1A1A1A1A1A1A1A1A1A1A1",
                "vaultName": "Alpha",
                "role": "member",
                "userBalance": "2500000",
                "totalAssets": "1000000000",
                "allowlistEnabled": true,
                "isOnAllowlist": true
            },
            { "vaultName": "no address" }
        ]
    })))
}

async fn check(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let owner = q.get("vaultAddress").map(String::as_str) == Some("0xb2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2");
    Json(json!({
        "isMember": owner,
        "isOwner": owner,
        "vaultName": "Beta",
    }))
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_memberships_are_mapped() {
    let base = spawn(
        Router::new()
            .route("/memberships", get(memberships))
            .route("/check-membership", get(check)),
    )
    .await;
    let client = IndexerClient::new(&format!("{base}/"), Duration::from_secs(5)).unwrap();
    assert_eq!(client.base_url(), base);

    let adapter = IndexedApiAdapter::new(client.clone());
    assert_eq!(adapter.id(), SourceId::IndexedApi);
    let records = adapter.fetch(addr(0x42)).await.unwrap();

    assert_eq!(records.len(), 2);
    let alpha = &records[0];
    assert_eq!(alpha.vault, Some(addr(0xa1)));
    assert_eq!(alpha.user_balance, Some(units(2_500_000)));
    assert_eq!(alpha.fields.total_assets, Some(units(1_000_000_000)));
    assert_eq!(alpha.allowlist, Allowlist::Allowed);
    assert_eq!(records[1].vault, None);

    let owned = client.check_membership(addr(0xb2), addr(0x42)).await.unwrap();
    assert!(owned.is_owner);
    let partial = owned.into_partial(addr(0xb2), addr(0x42));
    assert_eq!(partial.fields.owner_address, Some(addr(0x42)));
}

#[tokio::test]
async fn test_mistyped_row_does_not_sink_the_body() {
    let base = spawn(Router::new().route(
        "/memberships",
        get(|| async {
            Json(json!({
                "memberships": [
                    { "vaultAddress": "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1", "userBalance": "10" },
                    { "vaultAddress": 123, "userBalance": 7 }
                ]
            }))
        }),
    ))
    .await;
    let adapter = IndexedApiAdapter::new(IndexerClient::new(&base, Duration::from_secs(5)).unwrap());
    let records = adapter.fetch(addr(0x42)).await.unwrap();
    assert_eq!(records.len(), 2);

    let merged = merge(addr(0x42), &[SourceReport::ok(SourceId::IndexedApi, records)]);
    assert_eq!(merged.memberships.len(), 1);
    assert_eq!(merged.memberships[0].vault.address, addr(0xa1));
    assert_eq!(merged.malformed, 1);
}

#[tokio::test]
async fn test_check_member_flag_qualifies_without_balance() {
    let base = spawn(Router::new().route(
        "/check-membership",
        get(|| async { Json(json!({ "isMember": true, "isOwner": false, "userBalance": "0" })) }),
    ))
    .await;
    let client = IndexerClient::new(&base, Duration::from_secs(5)).unwrap();
    let partial = client
        .check_membership(addr(0xc3), addr(0x42))
        .await
        .unwrap()
        .into_partial(addr(0xc3), addr(0x42));

    let merged = merge(addr(0x42), &[SourceReport::ok(SourceId::IndexedApi, vec![partial])]);
    assert_eq!(merged.memberships.len(), 1);
    assert!(merged.memberships[0].is_on_allowlist);
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let base = spawn(Router::new().route(
        "/memberships",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;
    let adapter = IndexedApiAdapter::new(IndexerClient::new(&base, Duration::from_secs(5)).unwrap());
    let err = adapter.fetch(addr(0x42)).await.unwrap_err();
    assert!(matches!(err, AdapterError::Status(500)));
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let base = spawn(Router::new().route("/memberships", get(|| async { "not json" }))).await;
    let adapter = IndexedApiAdapter::new(IndexerClient::new(&base, Duration::from_secs(5)).unwrap());
    let err = adapter.fetch(addr(0x42)).await.unwrap_err();
    assert!(matches!(err, AdapterError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_indexer_is_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let adapter = IndexedApiAdapter::new(IndexerClient::new(&base, Duration::from_secs(2)).unwrap());
    assert!(matches!(adapter.fetch(addr(0x42)).await, Err(AdapterError::Http(_))));
}
