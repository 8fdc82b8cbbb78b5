//! Build DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::build::BuildStatus;
use crate::domain::log::{LogLevel, LogLine};

/// Read-shape of a build, rendered from persisted records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProjection {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    pub pipeline_name: String,
    pub build_number: i32,
    pub status: BuildStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    pub triggered_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub log_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogLineView>>,
}

/// A log line as exposed to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLineView {
    pub id: i64,
    pub line_no: i32,
    #[serde(rename = "logLevel")]
    pub level: LogLevel,
    pub message: String,
    pub stack_trace: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&LogLine> for LogLineView {
    fn from(line: &LogLine) -> Self {
        LogLineView {
            id: line.id,
            line_no: line.line_no,
            level: line.level,
            message: line.message.clone(),
            stack_trace: line.stack_trace.clone(),
            created_at: line.created_at,
        }
    }
}

/// Which subset of a build's logs a projection carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildShape {
    /// Every stored line
    #[default]
    Full,
    /// No lines; `log_count` still reports the stored total
    NoLogs,
    /// The final `n` lines of the console output
    LastN(usize),
    /// ERROR and WARN lines only
    ErrorsAndWarnOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidShape {
    #[error("unknown shape: {0}")]
    Unknown(String),
    #[error("shape 'last' requires a positive limit")]
    MissingLimit,
}

impl BuildShape {
    /// Parse the `shape` / `limit` query pair used by the HTTP API.
    ///
    /// A bare `limit` implies `last`.
    pub fn parse(shape: Option<&str>, limit: Option<usize>) -> Result<Self, InvalidShape> {
        match (shape.map(str::trim), limit) {
            (None | Some(""), None) => Ok(BuildShape::Full),
            (None | Some("") | Some("last"), Some(n)) if n > 0 => Ok(BuildShape::LastN(n)),
            (Some("last"), _) | (None | Some(""), Some(_)) => Err(InvalidShape::MissingLimit),
            (Some("full"), _) => Ok(BuildShape::Full),
            (Some("no_logs") | Some("summary"), _) => Ok(BuildShape::NoLogs),
            (Some("important"), _) => Ok(BuildShape::ErrorsAndWarnOnly),
            (Some(other), _) => Err(InvalidShape::Unknown(other.to_string())),
        }
    }
}

/// Query parameters of a collection trigger (webhook)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectTrigger {
    pub job_name: String,
    pub build_number: i32,
    #[serde(default)]
    pub build_status: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Pipeline identity attached to the "last important build" view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInfo {
    pub id: Uuid,
    pub name: String,
    pub total_builds: usize,
}

/// Last build restricted to its ERROR/WARN lines, with its pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportantBuildView {
    pub pipeline: PipelineInfo,
    pub build: BuildProjection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_defaults_to_full() {
        assert_eq!(BuildShape::parse(None, None), Ok(BuildShape::Full));
        assert_eq!(BuildShape::parse(Some(""), None), Ok(BuildShape::Full));
    }

    #[test]
    fn test_shape_named_variants() {
        assert_eq!(BuildShape::parse(Some("full"), None), Ok(BuildShape::Full));
        assert_eq!(BuildShape::parse(Some("no_logs"), None), Ok(BuildShape::NoLogs));
        assert_eq!(BuildShape::parse(Some("summary"), None), Ok(BuildShape::NoLogs));
        assert_eq!(
            BuildShape::parse(Some("important"), None),
            Ok(BuildShape::ErrorsAndWarnOnly)
        );
    }

    #[test]
    fn test_shape_last_needs_limit() {
        assert_eq!(BuildShape::parse(Some("last"), Some(20)), Ok(BuildShape::LastN(20)));
        assert_eq!(BuildShape::parse(None, Some(5)), Ok(BuildShape::LastN(5)));
        assert_eq!(
            BuildShape::parse(Some("last"), None),
            Err(InvalidShape::MissingLimit)
        );
        assert_eq!(
            BuildShape::parse(Some("last"), Some(0)),
            Err(InvalidShape::MissingLimit)
        );
    }

    #[test]
    fn test_shape_unknown() {
        assert!(matches!(
            BuildShape::parse(Some("everything"), None),
            Err(InvalidShape::Unknown(_))
        ));
    }

    #[test]
    fn test_projection_omits_absent_logs() {
        let projection = BuildProjection {
            id: Uuid::new_v4(),
            pipeline_id: Uuid::new_v4(),
            pipeline_name: "demo".to_string(),
            build_number: 1,
            status: BuildStatus::Success,
            start_time: None,
            end_time: None,
            duration: None,
            triggered_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            log_count: 3,
            logs: None,
        };

        let json = serde_json::to_value(&projection).unwrap();
        assert!(json.get("logs").is_none());
        assert_eq!(json["logCount"], 3);
        assert_eq!(json["status"], "SUCCESS");
    }
}
