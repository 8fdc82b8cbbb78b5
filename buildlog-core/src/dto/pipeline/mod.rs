//! Pipeline DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::build::BuildProjection;

/// Read-shape of a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineProjection {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub source_url: Option<String>,
    pub build_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builds: Option<Vec<BuildProjection>>,
}

/// How much of a pipeline's build history a projection carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineShape {
    /// Every build, each with all of its log lines
    #[default]
    Full,
    /// Every build, without log lines
    NoLogs,
    /// Pipeline fields and build count only
    Bare,
}

impl PipelineShape {
    pub fn parse(shape: Option<&str>) -> Option<Self> {
        match shape.map(str::trim) {
            None | Some("") | Some("full") => Some(PipelineShape::Full),
            Some("no_logs") | Some("summary") => Some(PipelineShape::NoLogs),
            Some("bare") => Some(PipelineShape::Bare),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_shape_parse() {
        assert_eq!(PipelineShape::parse(None), Some(PipelineShape::Full));
        assert_eq!(PipelineShape::parse(Some("summary")), Some(PipelineShape::NoLogs));
        assert_eq!(PipelineShape::parse(Some("bare")), Some(PipelineShape::Bare));
        assert_eq!(PipelineShape::parse(Some("important")), None);
    }
}
