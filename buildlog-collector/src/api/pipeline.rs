//! Pipeline API Handlers
//!
//! Read endpoints over pipelines.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use buildlog_core::dto::build::BuildProjection;
use buildlog_core::dto::pipeline::{PipelineProjection, PipelineShape};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::query_service;

#[derive(Debug, Deserialize)]
pub struct ShapeQuery {
    pub shape: Option<String>,
}

impl ShapeQuery {
    fn pipeline_shape(&self) -> ApiResult<PipelineShape> {
        PipelineShape::parse(self.shape.as_deref()).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "unknown pipeline shape: {}",
                self.shape.as_deref().unwrap_or_default()
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

/// GET /api/pipelines
/// List all pipelines with build counts
pub async fn list_pipelines(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PipelineProjection>>> {
    tracing::debug!("Listing all pipelines");

    let pipelines = query_service::list_pipelines(state.store.as_ref()).await?;
    Ok(Json(pipelines))
}

/// GET /api/pipelines/search?name=
pub async fn find_pipeline(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PipelineProjection>> {
    tracing::debug!("Searching pipeline: {}", query.name);

    let pipeline = query_service::pipeline_by_name(state.store.as_ref(), &query.name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pipeline {} not found", query.name)))?;

    Ok(Json(pipeline))
}

/// GET /api/pipelines/{id}
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PipelineProjection>> {
    tracing::debug!("Getting pipeline: {}", id);

    let pipeline = query_service::pipeline_by_id(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pipeline {} not found", id)))?;

    Ok(Json(pipeline))
}

/// GET /api/pipelines/{id}/builds
/// Builds of a pipeline with their logs, newest first
pub async fn list_pipeline_builds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<BuildProjection>>> {
    tracing::debug!("Listing builds for pipeline: {}", id);

    let builds = query_service::builds_for_pipeline(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pipeline {} not found", id)))?;

    Ok(Json(builds))
}

/// GET /api/pipelines/last?shape=
pub async fn last_pipeline(
    State(state): State<AppState>,
    Query(query): Query<ShapeQuery>,
) -> ApiResult<Json<PipelineProjection>> {
    let shape = query.pipeline_shape()?;

    let pipeline = query_service::last_pipeline(state.store.as_ref(), shape)
        .await?
        .ok_or_else(|| ApiError::NotFound("No pipeline recorded yet".to_string()))?;

    Ok(Json(pipeline))
}

/// GET /api/pipelines/all?shape=
pub async fn all_pipelines(
    State(state): State<AppState>,
    Query(query): Query<ShapeQuery>,
) -> ApiResult<Json<Vec<PipelineProjection>>> {
    let shape = query.pipeline_shape()?;

    let pipelines = query_service::all_pipelines(state.store.as_ref(), shape).await?;
    Ok(Json(pipelines))
}
