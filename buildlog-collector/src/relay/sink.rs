//! Batch sink posting to a second collector's ingestion endpoint

use async_trait::async_trait;
use buildlog_client::CollectorClient;
use buildlog_core::dto::batch::BuildBatch;

use super::{BatchSink, RelayError};

pub struct AnalyzerSink {
    client: CollectorClient,
}

impl AnalyzerSink {
    pub fn new(client: CollectorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BatchSink for AnalyzerSink {
    async fn send(&self, batch: &BuildBatch) -> Result<(), RelayError> {
        let report = self
            .client
            .ingest_builds(batch)
            .await
            .map_err(|e| RelayError::Batch(e.to_string()))?;

        tracing::debug!(
            "Analyzer at {} accepted batch: {} saved, {} duplicate, {} rejected",
            self.client.base_url(),
            report.saved.len(),
            report.duplicates.len(),
            report.rejected.len()
        );
        Ok(())
    }
}
