//! Ingestion, view publishing and relay endpoints

use crate::CollectorClient;
use crate::error::Result;
use buildlog_core::dto::batch::{BatchReport, BuildBatch};
use buildlog_core::dto::build::{BuildProjection, CollectTrigger};
use buildlog_core::dto::view::{PublishOutcome, RelayStats, ViewName};

impl CollectorClient {
    // =============================================================================
    // Ingestion
    // =============================================================================

    /// Trigger collection of a build, as the CI webhook does
    ///
    /// # Returns
    /// The full projection of the stored build (new or already present)
    pub async fn trigger_collect(&self, trigger: &CollectTrigger) -> Result<BuildProjection> {
        let url = format!("{}/api/webhook", self.base_url);
        let response = self.client.post(&url).query(trigger).send().await?;

        self.handle_response(response).await
    }

    /// Submit pre-structured builds to the batch ingestion endpoint
    pub async fn ingest_builds(&self, batch: &BuildBatch) -> Result<BatchReport> {
        let url = format!("{}/api/ingest/builds", self.base_url);
        let response = self.client.post(&url).json(batch).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Views & Relay
    // =============================================================================

    /// Compute a named view and publish it to the event bus
    pub async fn publish_view(&self, view: ViewName) -> Result<PublishOutcome> {
        let url = format!("{}/api/views/{}/publish", self.base_url, view);
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }

    /// Relay counters since the collector started
    pub async fn relay_stats(&self) -> Result<RelayStats> {
        let url = format!("{}/api/relay/stats", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
