//! Downstream relay
//!
//! Best-effort forwarding of collected builds:
//! - a [`BatchSink`] posts them to the second ingestion stage
//! - an [`EventPublisher`] publishes them to the event bus
//!
//! Neither outcome is ever surfaced to the caller of `collect`; both are
//! logged and counted.

pub mod publisher;
pub mod sink;

use async_trait::async_trait;
use buildlog_core::dto::batch::{BuildBatch, BuildMessage};
use buildlog_core::dto::build::BuildProjection;
use buildlog_core::dto::view::{EventEnvelope, RelayStats};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;

pub use publisher::RestEventPublisher;
pub use sink::AnalyzerSink;

/// Event key used for freshly collected builds
pub const LAST_BUILD_EVENT: &str = "last_build";

#[derive(Debug, Clone, thiserror::Error)]
pub enum RelayError {
    #[error("batch relay failed: {0}")]
    Batch(String),

    #[error("event publish failed: {0}")]
    Publish(String),

    #[error("payload serialization failed: {0}")]
    Serialize(String),
}

/// Second ingestion stage
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn send(&self, batch: &BuildBatch) -> Result<(), RelayError>;
}

/// Event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one keyed record to `topic`
    async fn publish(&self, topic: &str, key: &str, payload: &EventEnvelope)
    -> Result<(), RelayError>;
}

/// Outcome of one relay. `None` means the target is not configured.
#[derive(Debug, Default)]
pub struct RelayReport {
    pub batch: Option<Result<(), RelayError>>,
    pub publish: Option<Result<(), RelayError>>,
}

impl RelayReport {
    pub fn is_clean(&self) -> bool {
        !matches!(self.batch, Some(Err(_))) && !matches!(self.publish, Some(Err(_)))
    }
}

#[derive(Default)]
struct Counters {
    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
    events_published: AtomicU64,
    events_failed: AtomicU64,
}

/// Relay front-end shared by the collection and view services
pub struct Relay {
    sink: Option<Arc<dyn BatchSink>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    topic: String,
    counters: Counters,
}

impl Relay {
    pub fn new(
        sink: Option<Arc<dyn BatchSink>>,
        publisher: Option<Arc<dyn EventPublisher>>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            publisher,
            topic: topic.into(),
            counters: Counters::default(),
        }
    }

    /// A relay with no targets; every send is skipped
    pub fn disabled() -> Self {
        Self::new(None, None, "jenkins-logs")
    }

    /// Whether any target is configured
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some() || self.publisher.is_some()
    }

    /// Run [`Relay::relay_build`] as a detached task
    pub fn spawn_relay(self: &Arc<Self>, projection: BuildProjection) -> JoinHandle<RelayReport> {
        let relay = Arc::clone(self);
        tokio::spawn(async move { relay.relay_build(&projection).await })
    }

    /// Forward a collected build to both targets concurrently
    pub async fn relay_build(&self, projection: &BuildProjection) -> RelayReport {
        let message = BuildMessage::from(projection);
        let batch = BuildBatch::single(message.clone());

        let send_batch = async {
            match &self.sink {
                Some(sink) => Some(self.count_batch(sink.send(&batch).await)),
                None => None,
            }
        };
        let publish = async {
            match serde_json::to_value(&message) {
                Ok(data) => self.publish(LAST_BUILD_EVENT, data).await,
                Err(e) => Some(self.count_event(Err(RelayError::Serialize(e.to_string())))),
            }
        };

        let (batch, publish) = tokio::join!(send_batch, publish);
        let report = RelayReport { batch, publish };

        if report.is_clean() {
            tracing::debug!(
                "Relayed {} #{}",
                projection.pipeline_name,
                projection.build_number
            );
        } else {
            tracing::warn!(
                "Relay of {} #{} incomplete: {:?}",
                projection.pipeline_name,
                projection.build_number,
                report
            );
        }

        report
    }

    /// Publish a payload under `key`; `None` when no event bus is configured
    pub async fn publish(
        &self,
        key: &str,
        data: serde_json::Value,
    ) -> Option<Result<(), RelayError>> {
        let publisher = self.publisher.as_ref()?;
        let envelope = EventEnvelope {
            event: key.to_string(),
            generated_at: chrono::Utc::now(),
            data,
        };

        let result = publisher.publish(&self.topic, key, &envelope).await;
        Some(self.count_event(result))
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            batches_sent: self.counters.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.counters.batches_failed.load(Ordering::Relaxed),
            events_published: self.counters.events_published.load(Ordering::Relaxed),
            events_failed: self.counters.events_failed.load(Ordering::Relaxed),
        }
    }

    fn count_batch(&self, result: Result<(), RelayError>) -> Result<(), RelayError> {
        let counter = match &result {
            Ok(()) => &self.counters.batches_sent,
            Err(_) => &self.counters.batches_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }

    fn count_event(&self, result: Result<(), RelayError>) -> Result<(), RelayError> {
        let counter = match &result {
            Ok(()) => &self.counters.events_published,
            Err(_) => &self.counters.events_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use buildlog_core::domain::build::BuildStatus;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Sink/publisher double that records what it receives
    #[derive(Default)]
    pub(crate) struct RecordingTarget {
        pub fail: bool,
        pub batches: Mutex<Vec<BuildBatch>>,
        pub events: Mutex<Vec<(String, String, EventEnvelope)>>,
    }

    impl RecordingTarget {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl BatchSink for RecordingTarget {
        async fn send(&self, batch: &BuildBatch) -> Result<(), RelayError> {
            if self.fail {
                return Err(RelayError::Batch("connection refused".to_string()));
            }
            self.batches.lock().unwrap().push(batch.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingTarget {
        async fn publish(
            &self,
            topic: &str,
            key: &str,
            payload: &EventEnvelope,
        ) -> Result<(), RelayError> {
            if self.fail {
                return Err(RelayError::Publish("broker unavailable".to_string()));
            }
            self.events
                .lock()
                .unwrap()
                .push((topic.to_string(), key.to_string(), payload.clone()));
            Ok(())
        }
    }

    fn projection() -> BuildProjection {
        BuildProjection {
            id: Uuid::new_v4(),
            pipeline_id: Uuid::new_v4(),
            pipeline_name: "demo".to_string(),
            build_number: 3,
            status: BuildStatus::Success,
            start_time: None,
            end_time: None,
            duration: None,
            triggered_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            log_count: 0,
            logs: Some(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_relay_sends_batch_and_event() {
        let target = Arc::new(RecordingTarget::default());
        let relay = Relay::new(Some(target.clone()), Some(target.clone()), "jenkins-logs");

        let report = relay.relay_build(&projection()).await;

        assert!(report.is_clean());
        assert_eq!(target.batches.lock().unwrap().len(), 1);
        let events = target.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "jenkins-logs");
        assert_eq!(events[0].1, LAST_BUILD_EVENT);
        assert_eq!(events[0].2.data["buildNumber"], 3);

        let stats = relay.stats();
        assert_eq!(stats.batches_sent, 1);
        assert_eq!(stats.events_published, 1);
    }

    #[tokio::test]
    async fn test_relay_failures_are_counted_not_raised() {
        let target = Arc::new(RecordingTarget::failing());
        let relay = Relay::new(Some(target.clone()), Some(target), "jenkins-logs");

        let report = relay.relay_build(&projection()).await;

        assert!(!report.is_clean());
        assert!(matches!(report.batch, Some(Err(RelayError::Batch(_)))));
        assert!(matches!(report.publish, Some(Err(RelayError::Publish(_)))));
        assert_eq!(
            relay.stats(),
            RelayStats {
                batches_sent: 0,
                batches_failed: 1,
                events_published: 0,
                events_failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_disabled_relay_skips_everything() {
        let relay = Relay::disabled();

        let report = relay.relay_build(&projection()).await;

        assert!(report.batch.is_none());
        assert!(report.publish.is_none());
        assert_eq!(relay.stats(), RelayStats::default());
    }

    #[tokio::test]
    async fn test_spawned_relay_reports_through_handle() {
        let target = Arc::new(RecordingTarget::default());
        let relay = Arc::new(Relay::new(Some(target.clone()), None, "jenkins-logs"));

        assert!(relay.is_enabled());
        assert!(!Relay::disabled().is_enabled());

        let report = relay.spawn_relay(projection()).await.unwrap();

        assert!(report.is_clean());
        assert!(report.publish.is_none());
        assert_eq!(target.batches.lock().unwrap().len(), 1);
        assert_eq!(relay.stats().batches_sent, 1);
    }
}
