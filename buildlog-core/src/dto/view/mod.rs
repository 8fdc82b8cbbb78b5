//! View DTOs
//!
//! Named views that can be published to the event bus, and the envelope
//! they travel in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named, publishable read-shape. The name doubles as the event key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewName {
    LastBuild,
    LastBuildImportant,
    LastPipeline,
    LastPipelineSummary,
    AllPipelines,
    AllPipelinesSummary,
    AllBuilds,
    AllBuildsNoLogs,
}

impl ViewName {
    pub const ALL: [ViewName; 8] = [
        ViewName::LastBuild,
        ViewName::LastBuildImportant,
        ViewName::LastPipeline,
        ViewName::LastPipelineSummary,
        ViewName::AllPipelines,
        ViewName::AllPipelinesSummary,
        ViewName::AllBuilds,
        ViewName::AllBuildsNoLogs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::LastBuild => "last_build",
            ViewName::LastBuildImportant => "last_build_important",
            ViewName::LastPipeline => "last_pipeline",
            ViewName::LastPipelineSummary => "last_pipeline_summary",
            ViewName::AllPipelines => "all_pipelines",
            ViewName::AllPipelinesSummary => "all_pipelines_summary",
            ViewName::AllBuilds => "all_builds",
            ViewName::AllBuildsNoLogs => "all_builds_no_logs",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

impl FromStr for ViewName {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewName::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

/// Payload published to the event bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event: String,
    pub generated_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

/// Counters describing relay outcomes since process start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStats {
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub events_published: u64,
    pub events_failed: u64,
}

/// Response of an explicit view publish
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub view: ViewName,
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_name_roundtrip() {
        for view in ViewName::ALL {
            assert_eq!(view.as_str().parse::<ViewName>(), Ok(view));
        }
    }

    #[test]
    fn test_view_name_serde_matches_as_str() {
        let json = serde_json::to_string(&ViewName::AllPipelinesSummary).unwrap();
        assert_eq!(json, "\"all_pipelines_summary\"");
    }

    #[test]
    fn test_unknown_view() {
        assert!("everything".parse::<ViewName>().is_err());
    }
}
