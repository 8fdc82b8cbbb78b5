//! Entity store
//!
//! Persistence seam between the services and the backing database.
//! - `PgStore`: PostgreSQL, delegating to the repository functions
//! - `MemoryStore`: process-local, used when no database is configured and in tests

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use buildlog_core::domain::build::{Build, BuildDraft, BuildSummary, BuildWithLogs};
use buildlog_core::domain::log::{LogLevel, LogLine};
use buildlog_core::domain::pipeline::{NewPipeline, Pipeline};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `(pipeline_id, build_number)` is already recorded
    #[error("build #{build_number} already recorded for pipeline {pipeline_id}")]
    Conflict { pipeline_id: Uuid, build_number: i32 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A build row together with the name of its pipeline
pub type NamedBuild = (Build, String);

/// Storage operations the collector needs
///
/// Collections come back newest first: `created_at` descending, ties broken
/// by the larger id. Log lines come back `created_at` descending, then
/// `line_no` ascending.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Create the pipeline if its name is unseen, otherwise return the existing one
    async fn upsert_pipeline(&self, pipeline: NewPipeline) -> StoreResult<Pipeline>;

    async fn pipeline_by_name(&self, name: &str) -> StoreResult<Option<Pipeline>>;

    async fn pipeline_by_id(&self, id: Uuid) -> StoreResult<Option<Pipeline>>;

    async fn list_pipelines(&self) -> StoreResult<Vec<Pipeline>>;

    async fn last_pipeline(&self) -> StoreResult<Option<Pipeline>>;

    /// Insert a build and all of its lines atomically.
    ///
    /// Either everything is stored or nothing is. A duplicate key yields
    /// [`StoreError::Conflict`] and leaves the store untouched.
    async fn insert_build(&self, draft: BuildDraft, pipeline_name: &str)
    -> StoreResult<BuildWithLogs>;

    async fn build_by_id(&self, id: Uuid) -> StoreResult<Option<NamedBuild>>;

    async fn build_by_number(
        &self,
        pipeline_id: Uuid,
        build_number: i32,
    ) -> StoreResult<Option<NamedBuild>>;

    async fn last_build(&self) -> StoreResult<Option<NamedBuild>>;

    /// Builds with their log counts, optionally restricted to one pipeline
    async fn build_summaries(&self, pipeline_id: Option<Uuid>) -> StoreResult<Vec<BuildSummary>>;

    async fn count_builds(&self, pipeline_id: Uuid) -> StoreResult<usize>;

    async fn logs_for_build(&self, build_id: Uuid) -> StoreResult<Vec<LogLine>>;

    async fn logs_by_level(&self, build_id: Uuid, level: LogLevel) -> StoreResult<Vec<LogLine>>;
}
