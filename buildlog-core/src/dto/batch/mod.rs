//! Batch DTOs
//!
//! Pre-structured builds relayed from one collector to a second ingestion
//! stage. The receiver persists them as-is: no console fetch and no status
//! inference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::build::BuildProjection;

/// Envelope posted to the batch ingestion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildBatch {
    pub data: Vec<BuildMessage>,
}

impl BuildBatch {
    pub fn single(message: BuildMessage) -> Self {
        Self {
            data: vec![message],
        }
    }
}

/// One build in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMessage {
    /// Pipeline id on the sending side
    pub pipeline_id: String,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    pub build_number: i32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub triggered_by: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logs: Vec<LogMessage>,
}

/// One log line in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&BuildProjection> for BuildMessage {
    fn from(build: &BuildProjection) -> Self {
        let logs = build
            .logs
            .iter()
            .flatten()
            .map(|line| LogMessage {
                id: Some(line.id),
                log_level: Some(line.level.as_str().to_string()),
                message: Some(line.message.clone()),
                stack_trace: line.stack_trace.clone(),
                created_at: Some(line.created_at),
            })
            .collect();

        BuildMessage {
            pipeline_id: build.pipeline_id.to_string(),
            pipeline_name: Some(build.pipeline_name.clone()),
            build_number: build.build_number,
            status: Some(build.status.as_str().to_string()),
            triggered_by: build.triggered_by.clone(),
            start_time: build.start_time,
            end_time: build.end_time,
            logs,
        }
    }
}

/// Outcome of a batch ingestion, one entry per build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub saved: Vec<String>,
    pub duplicates: Vec<String>,
    pub rejected: Vec<String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.saved.len() + self.duplicates.len() + self.rejected.len()
    }
}
