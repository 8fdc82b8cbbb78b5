//! Shared ingestion steps
//!
//! Status resolution, line construction and idempotent persistence, used by
//! both the webhook collection path and batch ingestion.

use buildlog_core::classify;
use buildlog_core::domain::build::{BuildDraft, BuildStatus, BuildWithLogs, InvalidStatus};
use buildlog_core::domain::log::{LogLevel, NewLogLine};
use buildlog_core::domain::pipeline::{NewPipeline, Pipeline};
use buildlog_core::dto::batch::LogMessage;

use crate::store::{EntityStore, NamedBuild, StoreError, StoreResult};

/// Result of an idempotent persist
#[derive(Debug)]
pub enum Persisted {
    /// This call stored the build
    Created(BuildWithLogs),
    /// The key was already taken; this is the build that holds it
    Existing(NamedBuild),
}

/// Find or create the pipeline called `name`
pub async fn ensure_pipeline(
    store: &dyn EntityStore,
    name: &str,
    source_url: Option<String>,
) -> StoreResult<Pipeline> {
    store.upsert_pipeline(NewPipeline::named(name, source_url)).await
}

/// Status to persist: the explicit one when present, otherwise inferred from
/// the console text. Without console text an absent status is UNKNOWN.
pub fn resolve_status(
    explicit: Option<&str>,
    console: Option<&str>,
) -> Result<BuildStatus, InvalidStatus> {
    let explicit = classify::explicit_status(explicit)?;

    Ok(match console {
        Some(text) => classify::resolve_status(explicit, text),
        None => explicit.unwrap_or(BuildStatus::Unknown),
    })
}

/// Lines carried by a batch message.
///
/// Blank messages are skipped. A missing or unrecognised level falls back to
/// classifying the message text.
pub fn carried_lines(logs: &[LogMessage]) -> Vec<NewLogLine> {
    logs.iter()
        .enumerate()
        .filter_map(|(idx, log)| {
            let message = log.message.as_deref()?;
            if message.trim().is_empty() {
                return None;
            }

            let level = log
                .log_level
                .as_deref()
                .and_then(|level| level.parse::<LogLevel>().ok())
                .unwrap_or_else(|| classify::classify(message));

            Some(NewLogLine {
                line_no: idx as i32 + 1,
                level,
                message: message.to_string(),
                stack_trace: log.stack_trace.clone(),
            })
        })
        .collect()
}

/// Store a build unless its `(pipeline, build_number)` key is taken.
///
/// A lost insert race comes back as [`Persisted::Existing`] with the winner.
pub async fn persist(
    store: &dyn EntityStore,
    draft: BuildDraft,
    pipeline_name: &str,
) -> StoreResult<Persisted> {
    match store.insert_build(draft, pipeline_name).await {
        Ok(stored) => Ok(Persisted::Created(stored)),
        Err(StoreError::Conflict {
            pipeline_id,
            build_number,
        }) => {
            tracing::debug!(
                "Build #{} of {} already stored, using existing row",
                build_number,
                pipeline_name
            );
            store
                .build_by_number(pipeline_id, build_number)
                .await?
                .map(Persisted::Existing)
                .ok_or(StoreError::Conflict {
                    pipeline_id,
                    build_number,
                })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use buildlog_core::domain::build::NewBuild;

    fn message(level: Option<&str>, text: Option<&str>) -> LogMessage {
        LogMessage {
            id: None,
            log_level: level.map(str::to_string),
            message: text.map(str::to_string),
            stack_trace: None,
            created_at: None,
        }
    }

    #[test]
    fn test_resolve_status_prefers_explicit() {
        assert_eq!(
            resolve_status(Some("SUCCESS"), Some("Finished: FAILURE")),
            Ok(BuildStatus::Success)
        );
        assert_eq!(
            resolve_status(Some("null"), Some("Finished: FAILURE")),
            Ok(BuildStatus::Failure)
        );
        assert_eq!(resolve_status(None, None), Ok(BuildStatus::Unknown));
        assert!(resolve_status(Some("BROKEN"), Some("")).is_err());
    }

    #[test]
    fn test_carried_lines_skip_blank_and_classify_missing_level() {
        let lines = carried_lines(&[
            message(Some("INFO"), Some("start")),
            message(Some("ERROR"), Some("   ")),
            message(None, Some("[WARN] slow test")),
            message(Some("warning"), Some("deprecated")),
            message(Some("ERROR"), None),
        ]);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].level, LogLevel::Info);
        assert_eq!(lines[1].level, LogLevel::Warn);
        assert_eq!(lines[1].line_no, 3);
        assert_eq!(lines[2].level, LogLevel::Warn);
    }

    #[tokio::test]
    async fn test_persist_returns_existing_on_duplicate() {
        let store = MemoryStore::new();
        let pipeline = ensure_pipeline(&store, "demo", None).await.unwrap();
        let draft = || BuildDraft {
            build: NewBuild {
                pipeline_id: pipeline.id,
                build_number: 5,
                status: BuildStatus::Success,
                start_time: None,
                end_time: None,
                triggered_by: None,
            },
            logs: Vec::new(),
        };

        let first = match persist(&store, draft(), "demo").await.unwrap() {
            Persisted::Created(stored) => stored,
            other => panic!("expected a new build, got {:?}", other),
        };
        match persist(&store, draft(), "demo").await.unwrap() {
            Persisted::Existing((build, name)) => {
                assert_eq!(build.id, first.build.id);
                assert_eq!(name, "demo");
            }
            other => panic!("expected the existing build, got {:?}", other),
        }
    }
}
