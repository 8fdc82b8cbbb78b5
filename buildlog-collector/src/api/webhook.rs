//! Webhook API Handler
//!
//! Entry point for CI build notifications.

use axum::{
    Json,
    extract::{Query, State},
};
use buildlog_core::dto::build::{BuildProjection, CollectTrigger};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::collect_service;

/// POST /api/webhook?jobName=&buildNumber=&buildStatus=&token=
/// Collect a finished build and return its full projection
pub async fn collect_build(
    State(state): State<AppState>,
    Query(trigger): Query<CollectTrigger>,
) -> ApiResult<Json<BuildProjection>> {
    let authorized = match state.webhook_token.as_deref() {
        Some(expected) => trigger.token.as_deref() == Some(expected),
        None => true,
    };
    if !authorized {
        tracing::warn!("Rejected webhook for {}: bad token", trigger.job_name);
        return Err(ApiError::Forbidden("Invalid webhook token".to_string()));
    }

    tracing::info!(
        "Webhook received: {} #{} (status: {:?})",
        trigger.job_name,
        trigger.build_number,
        trigger.build_status
    );

    let build = collect_service::collect(
        state.store.as_ref(),
        state.source.as_ref(),
        &state.relay,
        &trigger.job_name,
        trigger.build_number,
        trigger.build_status.as_deref(),
    )
    .await?;

    Ok(Json(build))
}
