//! Pipeline-related API endpoints

use crate::CollectorClient;
use crate::error::Result;
use buildlog_core::dto::build::BuildProjection;
use buildlog_core::dto::pipeline::PipelineProjection;
use uuid::Uuid;

impl CollectorClient {
    // =============================================================================
    // Pipelines
    // =============================================================================

    /// List all pipelines with their build counts
    pub async fn list_pipelines(&self) -> Result<Vec<PipelineProjection>> {
        let url = format!("{}/api/pipelines", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Find a pipeline by its exact name
    pub async fn find_pipeline(&self, name: &str) -> Result<Option<PipelineProjection>> {
        let url = format!("{}/api/pipelines/search", self.base_url);
        let response = self.client.get(&url).query(&[("name", name)]).send().await?;

        self.handle_optional(response).await
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Option<PipelineProjection>> {
        let url = format!("{}/api/pipelines/{}", self.base_url, pipeline_id);
        let response = self.client.get(&url).send().await?;

        self.handle_optional(response).await
    }

    /// Builds of a pipeline with their logs, newest first
    pub async fn pipeline_builds(&self, pipeline_id: Uuid) -> Result<Option<Vec<BuildProjection>>> {
        let url = format!("{}/api/pipelines/{}/builds", self.base_url, pipeline_id);
        let response = self.client.get(&url).send().await?;

        self.handle_optional(response).await
    }

    /// The most recently created pipeline
    ///
    /// # Arguments
    /// * `shape` - `full` (default) or `no_logs`
    pub async fn last_pipeline(&self, shape: Option<&str>) -> Result<Option<PipelineProjection>> {
        let url = format!("{}/api/pipelines/last", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(shape) = shape {
            request = request.query(&[("shape", shape)]);
        }
        let response = request.send().await?;

        self.handle_optional(response).await
    }

    /// Every pipeline with its builds, newest first
    pub async fn all_pipelines(&self, shape: Option<&str>) -> Result<Vec<PipelineProjection>> {
        let url = format!("{}/api/pipelines/all", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(shape) = shape {
            request = request.query(&[("shape", shape)]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }
}
