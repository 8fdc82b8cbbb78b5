//! Batch Ingestion API Handler

use axum::{Json, extract::State};
use buildlog_core::dto::batch::{BatchReport, BuildBatch};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::batch_service;

/// POST /api/ingest/builds
/// Persist pre-structured builds from another collector
pub async fn ingest_builds(
    State(state): State<AppState>,
    Json(batch): Json<BuildBatch>,
) -> ApiResult<Json<BatchReport>> {
    tracing::info!("Batch received with {} build(s)", batch.data.len());

    let report = batch_service::ingest_batch(state.store.as_ref(), batch).await?;

    Ok(Json(report))
}
