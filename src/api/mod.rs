pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Services;
use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(handlers::health::health))
        // Memberships
        .route("/api/memberships", get(handlers::memberships::list))
        .route("/api/refresh", post(handlers::memberships::refresh))
        .route("/api/check-membership", get(handlers::memberships::check))
        // Vault view
        .route("/api/vaults/{address}/tokens", get(handlers::vaults::tokens))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(host: &str, port: u16, services: Services) -> Result<()> {
    let app = router(AppState::new(services));

    let addr = format!("{host}:{port}");
    println!("vault-discovery API server listening on {addr}");
    println!("  Health:      GET  http://{addr}/health");
    println!("  Memberships: GET  http://{addr}/api/memberships?user=0x...");
    println!("  Refresh:     POST http://{addr}/api/refresh?user=0x...");
    println!("  Check:       GET  http://{addr}/api/check-membership?vaultAddress=0x...&userAddress=0x...");
    println!("  Tokens:      GET  http://{addr}/api/vaults/0x.../tokens");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("running server")?;

    Ok(())
}
