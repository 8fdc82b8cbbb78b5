//! Build API Handlers
//!
//! Read endpoints over builds and their log lines.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use buildlog_core::domain::log::LogLevel;
use buildlog_core::dto::build::{BuildProjection, BuildShape, ImportantBuildView, LogLineView};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::query_service;

#[derive(Debug, Deserialize)]
pub struct BuildShapeQuery {
    pub shape: Option<String>,
    pub limit: Option<usize>,
}

impl BuildShapeQuery {
    fn build_shape(&self) -> ApiResult<BuildShape> {
        Ok(BuildShape::parse(self.shape.as_deref(), self.limit)?)
    }
}

/// GET /api/builds/{id}?shape=&limit=
pub async fn get_build(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<BuildShapeQuery>,
) -> ApiResult<Json<BuildProjection>> {
    let shape = query.build_shape()?;
    tracing::debug!("Getting build: {} ({:?})", id, shape);

    let build = query_service::build_by_id(state.store.as_ref(), id, shape)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Build {} not found", id)))?;

    Ok(Json(build))
}

/// GET /api/builds/{id}/logs
pub async fn get_build_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<LogLineView>>> {
    let logs = query_service::build_logs(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Build {} not found", id)))?;

    Ok(Json(logs))
}

/// GET /api/builds/{id}/errors
pub async fn get_build_errors(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<LogLineView>>> {
    let logs = query_service::build_logs_by_level(state.store.as_ref(), id, LogLevel::Error)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Build {} not found", id)))?;

    Ok(Json(logs))
}

/// GET /api/builds/last?shape=&limit=
pub async fn last_build(
    State(state): State<AppState>,
    Query(query): Query<BuildShapeQuery>,
) -> ApiResult<Json<BuildProjection>> {
    let shape = query.build_shape()?;

    let build = query_service::last_build(state.store.as_ref(), shape)
        .await?
        .ok_or_else(|| ApiError::NotFound("No build recorded yet".to_string()))?;

    Ok(Json(build))
}

/// GET /api/builds/last/important
pub async fn last_build_important(
    State(state): State<AppState>,
) -> ApiResult<Json<ImportantBuildView>> {
    let view = query_service::last_build_important(state.store.as_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("No build recorded yet".to_string()))?;

    Ok(Json(view))
}

/// GET /api/builds/all?shape=
pub async fn all_builds(
    State(state): State<AppState>,
    Query(query): Query<BuildShapeQuery>,
) -> ApiResult<Json<Vec<BuildProjection>>> {
    let shape = query.build_shape()?;

    let builds = query_service::all_builds(state.store.as_ref(), shape).await?;
    Ok(Json(builds))
}
