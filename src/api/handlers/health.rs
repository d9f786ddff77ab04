use axum::Json;
use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::HealthResponse;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = chrono::Utc::now().timestamp() as u64;
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: now.saturating_sub(state.inner.started_at),
    })
}
