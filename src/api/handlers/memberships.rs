use axum::Json;
use axum::extract::{Query, State};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{CheckQuery, CheckResponse, UserQuery};
use crate::model::parse_address;
use crate::reconcile::MembershipSnapshot;

/// Run a pass for `user` (or join the one in flight) and return it.
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<MembershipSnapshot>, ApiError> {
    let user = parse_address(&q.user)?;
    let snapshot = state.inner.controller.refresh(user).await?;
    Ok(Json(snapshot.as_ref().clone()))
}

pub async fn refresh(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<MembershipSnapshot>, ApiError> {
    let user = parse_address(&q.user)?;
    tracing::info!(%user, "refresh requested");
    let snapshot = state.inner.controller.refresh(user).await?;
    Ok(Json(snapshot.as_ref().clone()))
}

pub async fn check(
    State(state): State<AppState>,
    Query(q): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    let vault = parse_address(&q.vault_address)?;
    let user = parse_address(&q.user_address)?;
    let membership = state.inner.controller.lookup_vault(vault, user).await?;
    Ok(Json(CheckResponse {
        is_member: membership.is_some(),
        membership,
    }))
}
