//! Build collection
//!
//! Turns a CI trigger into a stored build: resolve the pipeline, skip
//! builds already stored, fetch and classify the console, persist the build
//! with its lines in one transaction, then relay it downstream.

use buildlog_core::classify;
use buildlog_core::domain::build::{BuildDraft, InvalidStatus, NewBuild};
use buildlog_core::dto::build::{BuildProjection, BuildShape};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::ingest::{self, Persisted};
use super::projection;
use crate::relay::{Relay, RelayReport};
use crate::source::{ConsoleSource, FetchError};
use crate::store::{EntityStore, StoreError};

/// Recorded as `triggered_by` on collected builds
pub const WEBHOOK_TRIGGER: &str = "Jenkins Webhook";

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("job name cannot be empty")]
    EmptyJobName,

    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Collect build `build_number` of `pipeline_name`.
///
/// Idempotent on `(pipeline, build_number)`: an already stored build is
/// returned as-is without fetching or relaying. Nothing is written until the
/// console fetch succeeds. The relay runs in the background and its outcome
/// never fails the collection.
pub async fn collect(
    store: &dyn EntityStore,
    source: &dyn ConsoleSource,
    relay: &Arc<Relay>,
    pipeline_name: &str,
    build_number: i32,
    explicit_status: Option<&str>,
) -> Result<BuildProjection, CollectError> {
    let (projection, _relay) =
        collect_and_relay(store, source, relay, pipeline_name, build_number, explicit_status)
            .await?;
    Ok(projection)
}

/// [`collect`], also handing back the background relay of a new build
async fn collect_and_relay(
    store: &dyn EntityStore,
    source: &dyn ConsoleSource,
    relay: &Arc<Relay>,
    pipeline_name: &str,
    build_number: i32,
    explicit_status: Option<&str>,
) -> Result<(BuildProjection, Option<JoinHandle<RelayReport>>), CollectError> {
    let pipeline_name = pipeline_name.trim();
    if pipeline_name.is_empty() {
        return Err(CollectError::EmptyJobName);
    }

    // Reject a bad trigger before spending a fetch on it
    let explicit = classify::explicit_status(explicit_status)?;

    // An unknown pipeline cannot hold the build yet
    let existing = match store.pipeline_by_name(pipeline_name).await? {
        Some(known) => store.build_by_number(known.id, build_number).await?,
        None => None,
    };
    if let Some(existing) = existing {
        tracing::info!(
            "Build #{} of {} already collected, skipping fetch",
            build_number,
            pipeline_name
        );
        let projection = projection::load_build(store, existing, BuildShape::Full).await?;
        return Ok((projection, None));
    }

    let console = source
        .fetch_console_text(pipeline_name, build_number)
        .await?;
    tracing::debug!(
        "Fetched {} bytes of console for {} #{}",
        console.len(),
        pipeline_name,
        build_number
    );

    let pipeline =
        ingest::ensure_pipeline(store, pipeline_name, source.pipeline_url(pipeline_name)).await?;

    let draft = BuildDraft {
        build: NewBuild {
            pipeline_id: pipeline.id,
            build_number,
            status: classify::resolve_status(explicit, &console),
            start_time: None,
            end_time: None,
            triggered_by: Some(WEBHOOK_TRIGGER.to_string()),
        },
        logs: classify::classify_console(&console),
    };

    let stored = match ingest::persist(store, draft, &pipeline.name).await? {
        Persisted::Created(stored) => stored,
        Persisted::Existing(winner) => {
            tracing::info!(
                "Build #{} of {} was stored concurrently, returning winner",
                build_number,
                pipeline_name
            );
            let projection = projection::load_build(store, winner, BuildShape::Full).await?;
            return Ok((projection, None));
        }
    };

    tracing::info!(
        "Collected {} #{}: {} with {} lines",
        pipeline_name,
        build_number,
        stored.build.status,
        stored.logs.len()
    );

    let projection = projection::project_stored(&stored);
    let handle = relay
        .is_enabled()
        .then(|| relay.spawn_relay(projection.clone()));

    Ok((projection, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::tests::RecordingTarget;
    use crate::service::testing::StaticSource;
    use crate::store::MemoryStore;
    use crate::relay::{BatchSink, RelayError};
    use async_trait::async_trait;
    use buildlog_core::domain::build::BuildStatus;
    use buildlog_core::domain::log::LogLevel;
    use buildlog_core::dto::batch::BuildBatch;
    use std::time::Duration;

    /// Sink that never answers
    struct StalledSink;

    #[async_trait]
    impl BatchSink for StalledSink {
        async fn send(&self, _batch: &BuildBatch) -> Result<(), RelayError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn disabled() -> Arc<Relay> {
        Arc::new(Relay::disabled())
    }

    const FAILING_CONSOLE: &str = "Building...\n[ERROR] compile failed\nFinished: FAILURE\n";

    #[tokio::test]
    async fn test_collect_classifies_and_infers_status() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 1, FAILING_CONSOLE);

        let build = collect(&store, &source, &disabled(), "demo", 1, None)
            .await
            .unwrap();

        assert_eq!(build.status, BuildStatus::Failure);
        assert_eq!(build.triggered_by.as_deref(), Some(WEBHOOK_TRIGGER));
        let logs = build.logs.unwrap();
        let levels: Vec<LogLevel> = logs.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Error, LogLevel::Error]);
        assert_eq!(logs[0].message, "Building...");
        assert_eq!(build.log_count, 3);
    }

    #[tokio::test]
    async fn test_collect_is_idempotent() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 2, FAILING_CONSOLE);
        let relay = disabled();

        let first = collect(&store, &source, &relay, "demo", 2, None).await.unwrap();
        let second = collect(&store, &source, &relay, "demo", 2, None).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.log_count, second.log_count);
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(store.build_summaries(None).await.unwrap().len(), 1);
        assert_eq!(store.logs_for_build(first.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_second_status_does_not_overwrite_first() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 5, "Finished: FAILURE");
        let relay = disabled();

        let first = collect(&store, &source, &relay, "demo", 5, Some("SUCCESS"))
            .await
            .unwrap();
        let second = collect(&store, &source, &relay, "demo", 5, Some("FAILURE"))
            .await
            .unwrap();

        assert_eq!(first.status, BuildStatus::Success);
        assert_eq!(second.status, BuildStatus::Success);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_failing_relay_does_not_fail_collect() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 3, "Finished: SUCCESS");
        let target = Arc::new(RecordingTarget::failing());
        let relay = Arc::new(Relay::new(Some(target.clone()), Some(target), "jenkins-logs"));

        let (build, handle) = collect_and_relay(&store, &source, &relay, "demo", 3, None)
            .await
            .unwrap();
        let report = handle.unwrap().await.unwrap();

        assert!(!report.is_clean());
        assert_eq!(build.status, BuildStatus::Success);
        assert!(store.build_by_id(build.id).await.unwrap().is_some());
        assert_eq!(relay.stats().batches_failed, 1);
        assert_eq!(relay.stats().events_failed, 1);
    }

    #[tokio::test]
    async fn test_relay_only_for_new_builds() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 4, "ok");
        let target = Arc::new(RecordingTarget::default());
        let relay = Arc::new(Relay::new(
            Some(target.clone()),
            Some(target.clone()),
            "jenkins-logs",
        ));

        let (_, first) = collect_and_relay(&store, &source, &relay, "demo", 4, None)
            .await
            .unwrap();
        first.unwrap().await.unwrap();
        let (_, repeat) = collect_and_relay(&store, &source, &relay, "demo", 4, None)
            .await
            .unwrap();

        assert!(repeat.is_none());
        assert_eq!(target.batches.lock().unwrap().len(), 1);
        assert_eq!(target.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_persists_nothing() {
        let store = MemoryStore::new();
        let source = StaticSource::default();

        let err = collect(&store, &source, &disabled(), "demo", 9, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CollectError::Fetch(_)));
        assert!(store.build_summaries(None).await.unwrap().is_empty());
        assert!(store.list_pipelines().await.unwrap().is_empty());
        assert!(store.last_pipeline().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stalled_relay_does_not_hold_collect() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 7, "Finished: SUCCESS");
        let relay = Arc::new(Relay::new(Some(Arc::new(StalledSink)), None, "jenkins-logs"));

        let build = tokio::time::timeout(
            Duration::from_secs(5),
            collect(&store, &source, &relay, "demo", 7, None),
        )
        .await
        .expect("collect waited on the relay")
        .unwrap();

        assert_eq!(build.status, BuildStatus::Success);
        assert!(store.build_by_id(build.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_status_rejected_before_fetch() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 1, "Finished: SUCCESS");

        let err = collect(&store, &source, &disabled(), "demo", 1, Some("success"))
            .await
            .unwrap_err();

        assert!(matches!(err, CollectError::InvalidStatus(_)));
        assert_eq!(source.fetch_count(), 0);
        assert!(store.build_summaries(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_null_status_falls_back_to_inference() {
        let store = MemoryStore::new();
        let source = StaticSource::default().with("demo", 6, "Finished: UNSTABLE");

        let build = collect(&store, &source, &disabled(), "demo", 6, Some("null"))
            .await
            .unwrap();

        assert_eq!(build.status, BuildStatus::Unstable);
    }

    #[tokio::test]
    async fn test_concurrent_collects_store_one_build() {
        let store = Arc::new(MemoryStore::new());
        // Both fetches are in flight before either build is persisted
        let source = Arc::new(
            StaticSource::default()
                .with("demo", 8, FAILING_CONSOLE)
                .gated(2),
        );
        let relay = disabled();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let (store, source, relay) = (store.clone(), source.clone(), relay.clone());
            handles.push(tokio::spawn(async move {
                collect(store.as_ref(), source.as_ref(), &relay, "demo", 8, None)
                    .await
                    .unwrap()
            }));
        }

        let mut builds = Vec::new();
        for handle in handles {
            builds.push(handle.await.unwrap());
        }

        assert_eq!(source.fetch_count(), 2);
        assert_eq!(builds[0].id, builds[1].id);
        assert_eq!(builds[0].log_count, 3);
        assert_eq!(builds[1].log_count, 3);

        let summaries = store.build_summaries(None).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].log_count, 3);
        assert_eq!(store.list_pipelines().await.unwrap().len(), 1);
    }
}
