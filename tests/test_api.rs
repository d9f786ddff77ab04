mod common;

use std::sync::Arc;

use serde_json::Value;

use common::*;

use vault_discovery::api::router;
use vault_discovery::api::state::AppState;
use vault_discovery::config::Services;
use vault_discovery::evm::{ContractField, FieldValue};
use vault_discovery::model::{KnownToken, SourceId};
use vault_discovery::reconcile::ReconciliationController;
use vault_discovery::tokens::TokenStrategyResolver;

const USER: &str = "0x4242424242424242424242424242424242424242";

async fn spawn(controller: ReconciliationController) -> String {
    let chain = MockChain::new();
    chain.set(addr(0xa1), ContractField::TokenBalances, FieldValue::Balances(vec![(addr(0x0c), units(7))]));
    let resolver = TokenStrategyResolver::new(
        chain,
        vec![KnownToken {
            symbol: "USDC".into(),
            address: addr(0x0c),
            decimals: 6,
        }],
    );
    let app = router(AppState::new(Services { controller, resolver }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_memberships_endpoint() {
    let controller = ReconciliationController::builder()
        .source(Arc::new(ScriptedSource::ok(
            SourceId::IndexedApi,
            vec![holding(addr(0xa1), 1_000_000, 5_000_000)],
        )))
        .build();
    let base = spawn(controller).await;
    let http = reqwest::Client::new();

    let health = http.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(health.status(), 200);

    let res = http
        .get(format!("{base}/api/memberships?user={USER}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["summary"]["totalVaults"], 1);
    assert_eq!(body["summary"]["totalValueLocked"], 5.0);
    assert_eq!(body["memberships"][0]["role"], "member");
    assert_eq!(body["memberships"][0]["userBalance"], "1000000");

    let refreshed = http
        .post(format!("{base}/api/refresh?user={USER}"))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status(), 200);
}

#[tokio::test]
async fn test_bad_address_is_400_and_outage_is_503() {
    let controller = ReconciliationController::builder()
        .source(Arc::new(ScriptedSource::failing(SourceId::IndexedApi)))
        .build();
    let base = spawn(controller).await;
    let http = reqwest::Client::new();

    let bad = http
        .get(format!("{base}/api/memberships?user=0x1234"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), 400);

    let down = http
        .get(format!("{base}/api/memberships?user={USER}"))
        .send()
        .await
        .unwrap();
    assert_eq!(down.status(), 503);
    let body: Value = down.json().await.unwrap();
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_vault_tokens_endpoint() {
    let base = spawn(ReconciliationController::builder().build()).await;
    let res = reqwest::get(format!("{base}/api/vaults/0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1/tokens"))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tokens"][0]["symbol"], "USDC");
    assert_eq!(body["tokens"][0]["balanceRaw"], "7");
    assert_eq!(body["strategies"].as_array().map(|s| s.len()), Some(0));
}
