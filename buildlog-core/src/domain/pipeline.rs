//! Pipeline domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named CI job producing a sequence of builds.
///
/// `name` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a pipeline on first sighting
#[derive(Debug, Clone)]
pub struct NewPipeline {
    pub name: String,
    pub display_name: String,
    pub source_url: Option<String>,
}

impl NewPipeline {
    /// A pipeline whose display name is its unique name
    pub fn named(name: impl Into<String>, source_url: Option<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            source_url,
        }
    }
}
