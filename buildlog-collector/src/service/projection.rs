//! Projection builder
//!
//! Renders stored builds and pipelines into their read-shapes. Everything
//! is computed from persisted rows at projection time; `log_count` always
//! describes the lines the shape selects, except for `NoLogs`, where it is
//! the stored total.

use buildlog_core::domain::build::{Build, BuildSummary, BuildWithLogs};
use buildlog_core::domain::log::LogLine;
use buildlog_core::domain::pipeline::Pipeline;
use buildlog_core::dto::build::{BuildProjection, BuildShape, LogLineView};
use buildlog_core::dto::pipeline::{PipelineProjection, PipelineShape};

use crate::store::{EntityStore, NamedBuild, StoreResult};

/// Select the lines a shape carries. `logs` must be in stored order.
pub fn select_lines(logs: &[LogLine], shape: BuildShape) -> Option<Vec<&LogLine>> {
    match shape {
        BuildShape::Full => Some(logs.iter().collect()),
        BuildShape::NoLogs => None,
        BuildShape::LastN(n) => Some(logs[logs.len().saturating_sub(n)..].iter().collect()),
        BuildShape::ErrorsAndWarnOnly => {
            Some(logs.iter().filter(|l| l.level.is_important()).collect())
        }
    }
}

/// Project a build whose lines are already loaded
pub fn project_build(
    build: &Build,
    pipeline_name: &str,
    logs: &[LogLine],
    shape: BuildShape,
) -> BuildProjection {
    let selected = select_lines(logs, shape);
    let log_count = selected.as_ref().map_or(logs.len(), Vec::len);

    BuildProjection {
        id: build.id,
        pipeline_id: build.pipeline_id,
        pipeline_name: pipeline_name.to_string(),
        build_number: build.build_number,
        status: build.status,
        start_time: build.start_time,
        end_time: build.end_time,
        duration: build.duration_seconds,
        triggered_by: build.triggered_by.clone(),
        created_at: build.created_at,
        updated_at: build.updated_at,
        log_count,
        logs: selected.map(|lines| lines.into_iter().map(LogLineView::from).collect()),
    }
}

/// FULL projection of a freshly stored build
pub fn project_stored(stored: &BuildWithLogs) -> BuildProjection {
    project_build(
        &stored.build,
        &stored.pipeline_name,
        &stored.logs,
        BuildShape::Full,
    )
}

/// NO_LOGS projection from a summary row
pub fn project_summary(summary: &BuildSummary) -> BuildProjection {
    let mut projection = project_build(
        &summary.build,
        &summary.pipeline_name,
        &[],
        BuildShape::NoLogs,
    );
    projection.log_count = summary.log_count;
    projection
}

/// Load a build's lines and project it
pub async fn load_build(
    store: &dyn EntityStore,
    (build, pipeline_name): NamedBuild,
    shape: BuildShape,
) -> StoreResult<BuildProjection> {
    let logs = store.logs_for_build(build.id).await?;
    Ok(project_build(&build, &pipeline_name, &logs, shape))
}

/// Project every build in `summaries`, loading lines unless the shape omits them
pub async fn load_builds(
    store: &dyn EntityStore,
    summaries: Vec<BuildSummary>,
    shape: BuildShape,
) -> StoreResult<Vec<BuildProjection>> {
    if shape == BuildShape::NoLogs {
        return Ok(summaries.iter().map(project_summary).collect());
    }

    let mut projections = Vec::with_capacity(summaries.len());
    for summary in summaries {
        projections.push(load_build(store, (summary.build, summary.pipeline_name), shape).await?);
    }
    Ok(projections)
}

/// Project a pipeline with as much of its build history as the shape asks for
pub async fn load_pipeline(
    store: &dyn EntityStore,
    pipeline: Pipeline,
    shape: PipelineShape,
) -> StoreResult<PipelineProjection> {
    let (build_count, builds) = match shape {
        PipelineShape::Bare => (store.count_builds(pipeline.id).await?, None),
        PipelineShape::NoLogs | PipelineShape::Full => {
            let summaries = store.build_summaries(Some(pipeline.id)).await?;
            let build_shape = if shape == PipelineShape::Full {
                BuildShape::Full
            } else {
                BuildShape::NoLogs
            };
            let builds = load_builds(store, summaries, build_shape).await?;
            (builds.len(), Some(builds))
        }
    };

    Ok(PipelineProjection {
        id: pipeline.id,
        name: pipeline.name,
        display_name: pipeline.display_name,
        source_url: pipeline.source_url,
        build_count,
        created_at: pipeline.created_at,
        updated_at: pipeline.updated_at,
        builds,
    })
}
