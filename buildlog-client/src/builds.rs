//! Build-related API endpoints

use crate::CollectorClient;
use crate::error::Result;
use buildlog_core::dto::build::{BuildProjection, ImportantBuildView, LogLineView};
use uuid::Uuid;

impl CollectorClient {
    // =============================================================================
    // Builds
    // =============================================================================

    /// Get a build by ID
    ///
    /// # Arguments
    /// * `build_id` - The build UUID
    /// * `shape` - `full`, `no_logs`, `important` or `last`
    /// * `limit` - Line count for the `last` shape
    pub async fn get_build(
        &self,
        build_id: Uuid,
        shape: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Option<BuildProjection>> {
        let url = format!("{}/api/builds/{}", self.base_url, build_id);
        let mut request = self.client.get(&url);
        if let Some(shape) = shape {
            request = request.query(&[("shape", shape)]);
        }
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let response = request.send().await?;

        self.handle_optional(response).await
    }

    /// All log lines of a build
    pub async fn build_logs(&self, build_id: Uuid) -> Result<Option<Vec<LogLineView>>> {
        let url = format!("{}/api/builds/{}/logs", self.base_url, build_id);
        let response = self.client.get(&url).send().await?;

        self.handle_optional(response).await
    }

    /// ERROR lines of a build
    pub async fn build_errors(&self, build_id: Uuid) -> Result<Option<Vec<LogLineView>>> {
        let url = format!("{}/api/builds/{}/errors", self.base_url, build_id);
        let response = self.client.get(&url).send().await?;

        self.handle_optional(response).await
    }

    /// The most recently collected build, `None` when nothing is stored
    pub async fn last_build(
        &self,
        shape: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Option<BuildProjection>> {
        let url = format!("{}/api/builds/last", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(shape) = shape {
            request = request.query(&[("shape", shape)]);
        }
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let response = request.send().await?;

        self.handle_optional(response).await
    }

    /// The last build restricted to ERROR and WARN lines
    pub async fn last_build_important(&self) -> Result<Option<ImportantBuildView>> {
        let url = format!("{}/api/builds/last/important", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_optional(response).await
    }

    /// Every build, newest first
    pub async fn all_builds(&self, shape: Option<&str>) -> Result<Vec<BuildProjection>> {
        let url = format!("{}/api/builds/all", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(shape) = shape {
            request = request.query(&[("shape", shape)]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }
}
