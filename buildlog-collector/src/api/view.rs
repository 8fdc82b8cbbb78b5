//! View & Relay API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use buildlog_core::dto::view::{PublishOutcome, RelayStats, ViewName};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::view_service;

/// POST /api/views/{view}/publish
/// Compute a named view and publish it to the event bus
pub async fn publish_view(
    State(state): State<AppState>,
    Path(view): Path<String>,
) -> ApiResult<Json<PublishOutcome>> {
    let view: ViewName = view
        .parse()
        .map_err(|e: buildlog_core::dto::view::UnknownView| ApiError::NotFound(e.to_string()))?;

    tracing::info!("Publishing view: {}", view);

    let outcome = view_service::publish_view(state.store.as_ref(), &state.relay, view).await?;
    Ok(Json(outcome))
}

/// GET /api/relay/stats
pub async fn relay_stats(State(state): State<AppState>) -> Json<RelayStats> {
    Json(state.relay.stats())
}
