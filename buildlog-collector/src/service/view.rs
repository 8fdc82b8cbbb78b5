//! View publishing
//!
//! Computes a named view and publishes it to the event bus under its name.

use buildlog_core::dto::build::BuildShape;
use buildlog_core::dto::pipeline::PipelineShape;
use buildlog_core::dto::view::{PublishOutcome, ViewName};
use serde::Serialize;

use super::query;
use crate::relay::Relay;
use crate::store::{EntityStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("view serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, ViewError> {
    Ok(serde_json::to_value(value)?)
}

/// Compute the JSON payload of a view. Empty "last" views render as `null`.
pub async fn render_view(
    store: &dyn EntityStore,
    view: ViewName,
) -> Result<serde_json::Value, ViewError> {
    match view {
        ViewName::LastBuild => to_value(&query::last_build(store, BuildShape::Full).await?),
        ViewName::LastBuildImportant => to_value(&query::last_build_important(store).await?),
        ViewName::LastPipeline => to_value(&query::last_pipeline(store, PipelineShape::Full).await?),
        ViewName::LastPipelineSummary => {
            to_value(&query::last_pipeline(store, PipelineShape::NoLogs).await?)
        }
        ViewName::AllPipelines => to_value(&query::all_pipelines(store, PipelineShape::Full).await?),
        ViewName::AllPipelinesSummary => {
            to_value(&query::all_pipelines(store, PipelineShape::NoLogs).await?)
        }
        ViewName::AllBuilds => to_value(&query::all_builds(store, BuildShape::Full).await?),
        ViewName::AllBuildsNoLogs => to_value(&query::all_builds(store, BuildShape::NoLogs).await?),
    }
}

/// Render `view` and publish it keyed by its name.
///
/// A publish failure is reported in the outcome, not as an error.
pub async fn publish_view(
    store: &dyn EntityStore,
    relay: &Relay,
    view: ViewName,
) -> Result<PublishOutcome, ViewError> {
    let data = render_view(store, view).await?;

    let outcome = match relay.publish(view.as_str(), data).await {
        Some(Ok(())) => PublishOutcome {
            view,
            published: true,
            error: None,
        },
        Some(Err(err)) => {
            tracing::warn!("Publishing view {} failed: {}", view, err);
            PublishOutcome {
                view,
                published: false,
                error: Some(err.to_string()),
            }
        }
        None => PublishOutcome {
            view,
            published: false,
            error: Some("event bus not configured".to_string()),
        },
    };

    Ok(outcome)
}
