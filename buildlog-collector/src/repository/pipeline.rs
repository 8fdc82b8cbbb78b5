//! Pipeline Repository
//!
//! Handles all database operations related to pipelines.

use buildlog_core::domain::pipeline::{NewPipeline, Pipeline};
use sqlx::PgPool;
use uuid::Uuid;

const PIPELINE_COLUMNS: &str = "id, name, display_name, source_url, created_at, updated_at";

/// Insert a pipeline, or return the existing row with the same name.
///
/// Single statement, so concurrent first sightings of a name converge on
/// one row. The no-op update makes `RETURNING` yield the existing row.
pub async fn upsert(pool: &PgPool, req: NewPipeline) -> Result<Pipeline, sqlx::Error> {
    let now = crate::db::now();

    let sql = format!(
        "INSERT INTO pipelines ({PIPELINE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING {PIPELINE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PipelineRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.display_name)
        .bind(&req.source_url)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(row.into())
}

/// Find a pipeline by its unique name
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Pipeline>, sqlx::Error> {
    let sql = format!("SELECT {PIPELINE_COLUMNS} FROM pipelines WHERE name = $1");
    let row = sqlx::query_as::<_, PipelineRow>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

/// Find a pipeline by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Pipeline>, sqlx::Error> {
    let sql = format!("SELECT {PIPELINE_COLUMNS} FROM pipelines WHERE id = $1");
    let row = sqlx::query_as::<_, PipelineRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

/// List all pipelines, newest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Pipeline>, sqlx::Error> {
    let sql = format!("SELECT {PIPELINE_COLUMNS} FROM pipelines ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, PipelineRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// The most recently created pipeline; ties go to the larger id
pub async fn find_last(pool: &PgPool) -> Result<Option<Pipeline>, sqlx::Error> {
    let sql = format!(
        "SELECT {PIPELINE_COLUMNS} FROM pipelines ORDER BY created_at DESC, id DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, PipelineRow>(&sql)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct PipelineRow {
    id: Uuid,
    name: String,
    display_name: String,
    source_url: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PipelineRow> for Pipeline {
    fn from(row: PipelineRow) -> Self {
        Pipeline {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            source_url: row.source_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
