//! Query Service
//!
//! Read-only views over the store. Absence is `None`, never an error.

use buildlog_core::domain::log::LogLevel;
use buildlog_core::dto::build::{
    BuildProjection, BuildShape, ImportantBuildView, LogLineView, PipelineInfo,
};
use buildlog_core::dto::pipeline::{PipelineProjection, PipelineShape};
use uuid::Uuid;

use super::projection;
use crate::store::{EntityStore, StoreResult};

// =============================================================================
// Pipelines
// =============================================================================

/// All pipelines with their build counts, newest first
pub async fn list_pipelines(store: &dyn EntityStore) -> StoreResult<Vec<PipelineProjection>> {
    all_pipelines(store, PipelineShape::Bare).await
}

pub async fn pipeline_by_name(
    store: &dyn EntityStore,
    name: &str,
) -> StoreResult<Option<PipelineProjection>> {
    match store.pipeline_by_name(name).await? {
        Some(pipeline) => Ok(Some(
            projection::load_pipeline(store, pipeline, PipelineShape::Bare).await?,
        )),
        None => Ok(None),
    }
}

pub async fn pipeline_by_id(
    store: &dyn EntityStore,
    id: Uuid,
) -> StoreResult<Option<PipelineProjection>> {
    match store.pipeline_by_id(id).await? {
        Some(pipeline) => Ok(Some(
            projection::load_pipeline(store, pipeline, PipelineShape::Bare).await?,
        )),
        None => Ok(None),
    }
}

/// Builds of one pipeline with all of their lines, newest first
pub async fn builds_for_pipeline(
    store: &dyn EntityStore,
    pipeline_id: Uuid,
) -> StoreResult<Option<Vec<BuildProjection>>> {
    if store.pipeline_by_id(pipeline_id).await?.is_none() {
        return Ok(None);
    }

    let summaries = store.build_summaries(Some(pipeline_id)).await?;
    Ok(Some(
        projection::load_builds(store, summaries, BuildShape::Full).await?,
    ))
}

/// The most recently created pipeline
pub async fn last_pipeline(
    store: &dyn EntityStore,
    shape: PipelineShape,
) -> StoreResult<Option<PipelineProjection>> {
    match store.last_pipeline().await? {
        Some(pipeline) => Ok(Some(projection::load_pipeline(store, pipeline, shape).await?)),
        None => Ok(None),
    }
}

pub async fn all_pipelines(
    store: &dyn EntityStore,
    shape: PipelineShape,
) -> StoreResult<Vec<PipelineProjection>> {
    let pipelines = store.list_pipelines().await?;

    let mut projections = Vec::with_capacity(pipelines.len());
    for pipeline in pipelines {
        projections.push(projection::load_pipeline(store, pipeline, shape).await?);
    }
    Ok(projections)
}

// =============================================================================
// Builds
// =============================================================================

pub async fn build_by_id(
    store: &dyn EntityStore,
    id: Uuid,
    shape: BuildShape,
) -> StoreResult<Option<BuildProjection>> {
    match store.build_by_id(id).await? {
        Some(named) => Ok(Some(projection::load_build(store, named, shape).await?)),
        None => Ok(None),
    }
}

/// Every stored line of a build
pub async fn build_logs(
    store: &dyn EntityStore,
    id: Uuid,
) -> StoreResult<Option<Vec<LogLineView>>> {
    if store.build_by_id(id).await?.is_none() {
        return Ok(None);
    }

    let logs = store.logs_for_build(id).await?;
    Ok(Some(logs.iter().map(LogLineView::from).collect()))
}

/// Lines of a build at one level
pub async fn build_logs_by_level(
    store: &dyn EntityStore,
    id: Uuid,
    level: LogLevel,
) -> StoreResult<Option<Vec<LogLineView>>> {
    if store.build_by_id(id).await?.is_none() {
        return Ok(None);
    }

    let logs = store.logs_by_level(id, level).await?;
    Ok(Some(logs.iter().map(LogLineView::from).collect()))
}

/// The most recently created build across all pipelines
pub async fn last_build(
    store: &dyn EntityStore,
    shape: BuildShape,
) -> StoreResult<Option<BuildProjection>> {
    match store.last_build().await? {
        Some(named) => Ok(Some(projection::load_build(store, named, shape).await?)),
        None => Ok(None),
    }
}

/// The last build's ERROR and WARN lines, with its pipeline's identity
pub async fn last_build_important(
    store: &dyn EntityStore,
) -> StoreResult<Option<ImportantBuildView>> {
    let Some(named) = store.last_build().await? else {
        return Ok(None);
    };

    let pipeline_id = named.0.pipeline_id;
    let pipeline = PipelineInfo {
        id: pipeline_id,
        name: named.1.clone(),
        total_builds: store.count_builds(pipeline_id).await?,
    };
    let build = projection::load_build(store, named, BuildShape::ErrorsAndWarnOnly).await?;

    Ok(Some(ImportantBuildView { pipeline, build }))
}

/// Every build, newest first
pub async fn all_builds(
    store: &dyn EntityStore,
    shape: BuildShape,
) -> StoreResult<Vec<BuildProjection>> {
    let summaries = store.build_summaries(None).await?;
    projection::load_builds(store, summaries, shape).await
}
