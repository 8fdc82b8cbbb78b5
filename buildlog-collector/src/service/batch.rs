//! Batch ingestion
//!
//! Persists pre-structured builds relayed by another collector. Nothing is
//! fetched or inferred, and nothing ingested here is relayed again.

use buildlog_core::domain::build::{BuildDraft, NewBuild};
use buildlog_core::dto::batch::{BatchReport, BuildBatch, BuildMessage};

use super::ingest::{self, Persisted};
use crate::store::{EntityStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("batch contains no builds")]
    EmptyBatch,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Name under which a message's pipeline is stored
fn pipeline_name(message: &BuildMessage) -> Option<String> {
    match message.pipeline_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            let id = message.pipeline_id.trim();
            (!id.is_empty()).then(|| format!("pipeline-{}", id))
        }
    }
}

/// Ingest every build of a batch.
///
/// Invalid items are reported as rejected and do not stop the batch; a
/// store failure does.
pub async fn ingest_batch(
    store: &dyn EntityStore,
    batch: BuildBatch,
) -> Result<BatchReport, IngestError> {
    if batch.data.is_empty() {
        return Err(IngestError::EmptyBatch);
    }

    let mut report = BatchReport::default();

    for message in batch.data {
        let Some(name) = pipeline_name(&message) else {
            report.rejected.push(format!(
                "build #{}: missing pipeline id and name",
                message.build_number
            ));
            continue;
        };
        let label = format!("{} #{}", name, message.build_number);

        let status = match ingest::resolve_status(message.status.as_deref(), None) {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!("Rejecting {}: {}", label, err);
                report.rejected.push(format!("{}: {}", label, err));
                continue;
            }
        };

        let pipeline = ingest::ensure_pipeline(store, &name, None).await?;
        let draft = BuildDraft {
            build: NewBuild {
                pipeline_id: pipeline.id,
                build_number: message.build_number,
                status,
                start_time: message.start_time,
                end_time: message.end_time,
                triggered_by: message.triggered_by,
            },
            logs: ingest::carried_lines(&message.logs),
        };

        match ingest::persist(store, draft, &pipeline.name).await? {
            Persisted::Created(stored) => {
                tracing::info!("Ingested {} with {} lines", label, stored.logs.len());
                report.saved.push(label);
            }
            Persisted::Existing(_) => {
                tracing::debug!("Skipping {}, already ingested", label);
                report.duplicates.push(label);
            }
        }
    }

    tracing::info!(
        "Batch ingested: {} saved, {} duplicate, {} rejected",
        report.saved.len(),
        report.duplicates.len(),
        report.rejected.len()
    );

    Ok(report)
}
