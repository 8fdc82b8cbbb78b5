//! PostgreSQL-backed entity store

use async_trait::async_trait;
use buildlog_core::domain::build::{BuildDraft, BuildSummary, BuildWithLogs};
use buildlog_core::domain::log::{LogLevel, LogLine};
use buildlog_core::domain::pipeline::{NewPipeline, Pipeline};
use sqlx::PgPool;
use uuid::Uuid;

use super::{EntityStore, NamedBuild, StoreError, StoreResult};
use crate::repository::{build_repository, log_repository, pipeline_repository};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn upsert_pipeline(&self, pipeline: NewPipeline) -> StoreResult<Pipeline> {
        Ok(pipeline_repository::upsert(&self.pool, pipeline).await?)
    }

    async fn pipeline_by_name(&self, name: &str) -> StoreResult<Option<Pipeline>> {
        Ok(pipeline_repository::find_by_name(&self.pool, name).await?)
    }

    async fn pipeline_by_id(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        Ok(pipeline_repository::find_by_id(&self.pool, id).await?)
    }

    async fn list_pipelines(&self) -> StoreResult<Vec<Pipeline>> {
        Ok(pipeline_repository::list_all(&self.pool).await?)
    }

    async fn last_pipeline(&self) -> StoreResult<Option<Pipeline>> {
        Ok(pipeline_repository::find_last(&self.pool).await?)
    }

    async fn insert_build(
        &self,
        draft: BuildDraft,
        pipeline_name: &str,
    ) -> StoreResult<BuildWithLogs> {
        let pipeline_id = draft.build.pipeline_id;
        let build_number = draft.build.build_number;
        let conflict = |err: sqlx::Error| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict {
                pipeline_id,
                build_number,
            },
            _ => StoreError::Database(err),
        };

        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await?;

        let build = build_repository::insert(&mut *tx, &draft.build)
            .await
            .map_err(conflict)?;
        let logs = log_repository::insert_lines(&mut *tx, build.id, build.created_at, &draft.logs)
            .await?;

        tx.commit().await.map_err(conflict)?;

        Ok(BuildWithLogs {
            build,
            pipeline_name: pipeline_name.to_string(),
            logs,
        })
    }

    async fn build_by_id(&self, id: Uuid) -> StoreResult<Option<NamedBuild>> {
        Ok(build_repository::find_by_id(&self.pool, id).await?)
    }

    async fn build_by_number(
        &self,
        pipeline_id: Uuid,
        build_number: i32,
    ) -> StoreResult<Option<NamedBuild>> {
        Ok(build_repository::find_by_number(&self.pool, pipeline_id, build_number).await?)
    }

    async fn last_build(&self) -> StoreResult<Option<NamedBuild>> {
        Ok(build_repository::find_last(&self.pool).await?)
    }

    async fn build_summaries(&self, pipeline_id: Option<Uuid>) -> StoreResult<Vec<BuildSummary>> {
        let summaries = match pipeline_id {
            Some(id) => build_repository::find_summaries_by_pipeline(&self.pool, id).await?,
            None => build_repository::list_summaries(&self.pool).await?,
        };
        Ok(summaries)
    }

    async fn count_builds(&self, pipeline_id: Uuid) -> StoreResult<usize> {
        let count = build_repository::count_by_pipeline(&self.pool, pipeline_id).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn logs_for_build(&self, build_id: Uuid) -> StoreResult<Vec<LogLine>> {
        Ok(log_repository::find_by_build(&self.pool, build_id).await?)
    }

    async fn logs_by_level(&self, build_id: Uuid, level: LogLevel) -> StoreResult<Vec<LogLine>> {
        Ok(log_repository::find_by_build_and_level(&self.pool, build_id, level).await?)
    }
}
