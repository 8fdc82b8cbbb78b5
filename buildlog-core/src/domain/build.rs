//! Build domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::log::{LogLine, NewLogLine};

/// One execution of a pipeline.
///
/// `(pipeline_id, build_number)` is unique and serves as the idempotency key
/// for ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    pub build_number: i32,
    pub status: BuildStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub triggered_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Build execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    Success,
    Failure,
    Unstable,
    Unknown,
    Running,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
            BuildStatus::Unstable => "UNSTABLE",
            BuildStatus::Unknown => "UNKNOWN",
            BuildStatus::Running => "RUNNING",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that does not name a [`BuildStatus`] variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid build status: {0:?}")]
pub struct InvalidStatus(pub String);

impl FromStr for BuildStatus {
    type Err = InvalidStatus;

    /// Exact, case-sensitive match on the upstream spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SUCCESS" => Ok(BuildStatus::Success),
            "FAILURE" => Ok(BuildStatus::Failure),
            "UNSTABLE" => Ok(BuildStatus::Unstable),
            "UNKNOWN" => Ok(BuildStatus::Unknown),
            "RUNNING" => Ok(BuildStatus::Running),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

/// Fields needed to create a build row
#[derive(Debug, Clone)]
pub struct NewBuild {
    pub pipeline_id: Uuid,
    pub build_number: i32,
    pub status: BuildStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub triggered_by: Option<String>,
}

impl NewBuild {
    pub fn duration_seconds(&self) -> Option<i64> {
        derive_duration(self.start_time, self.end_time)
    }
}

/// Elapsed seconds between start and end.
///
/// `None` unless both ends are known and the end does not precede the start.
pub fn derive_duration(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<i64> {
    match (start, end) {
        (Some(start), Some(end)) if end >= start => Some((end - start).num_seconds()),
        _ => None,
    }
}

/// A build together with all of its log lines, already materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildWithLogs {
    pub build: Build,
    pub pipeline_name: String,
    pub logs: Vec<LogLine>,
}

/// Scalar build fields plus the number of stored log lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub build: Build,
    pub pipeline_name: String,
    pub log_count: usize,
}

/// Build plus the lines to insert with it in one transaction
#[derive(Debug, Clone)]
pub struct BuildDraft {
    pub build: NewBuild,
    pub logs: Vec<NewLogLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!("SUCCESS".parse::<BuildStatus>(), Ok(BuildStatus::Success));
        assert_eq!("RUNNING".parse::<BuildStatus>(), Ok(BuildStatus::Running));
        assert!("success".parse::<BuildStatus>().is_err());
        assert!("ABORTED".parse::<BuildStatus>().is_err());
    }

    #[test]
    fn test_status_roundtrips_through_as_str() {
        for status in [
            BuildStatus::Success,
            BuildStatus::Failure,
            BuildStatus::Unstable,
            BuildStatus::Unknown,
            BuildStatus::Running,
        ] {
            assert_eq!(status.as_str().parse::<BuildStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_duration_requires_both_ends() {
        let start = Utc::now();
        let end = start + Duration::seconds(42);

        assert_eq!(derive_duration(Some(start), Some(end)), Some(42));
        assert_eq!(derive_duration(Some(start), None), None);
        assert_eq!(derive_duration(None, Some(end)), None);
    }

    #[test]
    fn test_duration_never_negative() {
        let start = Utc::now();
        let end = start - Duration::seconds(5);

        assert_eq!(derive_duration(Some(start), Some(end)), None);
    }
}
