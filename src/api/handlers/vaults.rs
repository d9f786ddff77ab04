use axum::Json;
use axum::extract::{Path, State};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::VaultTokensResponse;
use crate::model::parse_address;

pub async fn tokens(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<VaultTokensResponse>, ApiError> {
    let vault = parse_address(&address)?;
    let view = state.inner.resolver.resolve(vault).await;
    Ok(Json(VaultTokensResponse { vault, view }))
}
