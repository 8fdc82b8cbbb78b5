//! Build Repository
//!
//! Handles all database operations related to builds. Every read joins the
//! owning pipeline so callers get the pipeline name alongside the row.

use buildlog_core::domain::build::{Build, BuildStatus, BuildSummary, NewBuild};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const BUILD_COLUMNS: &str = r#"
    b.id, b.pipeline_id, b.build_number, b.status, b.start_time, b.end_time,
    b.duration_seconds, b.triggered_by, b.created_at, b.updated_at,
    p.name AS pipeline_name
"#;

const LOG_COUNT_COLUMN: &str =
    "(SELECT COUNT(*) FROM log_lines l WHERE l.build_id = b.id) AS log_count";

/// Insert a build row.
///
/// Runs on a connection so it can share a transaction with the log lines.
/// A duplicate `(pipeline_id, build_number)` surfaces as a unique violation.
pub async fn insert(conn: &mut PgConnection, req: &NewBuild) -> Result<Build, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = crate::db::now();

    let build = Build {
        id,
        pipeline_id: req.pipeline_id,
        build_number: req.build_number,
        status: req.status,
        start_time: req.start_time,
        end_time: req.end_time,
        duration_seconds: req.duration_seconds(),
        triggered_by: req.triggered_by.clone(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO builds (id, pipeline_id, build_number, status, start_time, end_time,
                            duration_seconds, triggered_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(build.id)
    .bind(build.pipeline_id)
    .bind(build.build_number)
    .bind(status_to_string(build.status))
    .bind(build.start_time)
    .bind(build.end_time)
    .bind(build.duration_seconds)
    .bind(&build.triggered_by)
    .bind(build.created_at)
    .bind(build.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(build)
}

/// Find a build by ID, with its pipeline name
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<(Build, String)>, sqlx::Error> {
    let sql = format!(
        "SELECT {BUILD_COLUMNS} FROM builds b JOIN pipelines p ON p.id = b.pipeline_id WHERE b.id = $1"
    );

    let row = sqlx::query_as::<_, BuildRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(BuildRow::into_parts))
}

/// Find a build by its idempotency key
pub async fn find_by_number(
    pool: &PgPool,
    pipeline_id: Uuid,
    build_number: i32,
) -> Result<Option<(Build, String)>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {BUILD_COLUMNS}
        FROM builds b JOIN pipelines p ON p.id = b.pipeline_id
        WHERE b.pipeline_id = $1 AND b.build_number = $2
        "#
    );

    let row = sqlx::query_as::<_, BuildRow>(&sql)
        .bind(pipeline_id)
        .bind(build_number)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(BuildRow::into_parts))
}

/// The most recently created build across all pipelines
pub async fn find_last(pool: &PgPool) -> Result<Option<(Build, String)>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {BUILD_COLUMNS}
        FROM builds b JOIN pipelines p ON p.id = b.pipeline_id
        ORDER BY b.created_at DESC, b.id DESC
        LIMIT 1
        "#
    );

    let row = sqlx::query_as::<_, BuildRow>(&sql)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(BuildRow::into_parts))
}

/// Builds of one pipeline with their log counts, newest first
pub async fn find_summaries_by_pipeline(
    pool: &PgPool,
    pipeline_id: Uuid,
) -> Result<Vec<BuildSummary>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {BUILD_COLUMNS}, {LOG_COUNT_COLUMN}
        FROM builds b JOIN pipelines p ON p.id = b.pipeline_id
        WHERE b.pipeline_id = $1
        ORDER BY b.created_at DESC, b.id DESC
        "#
    );

    let rows = sqlx::query_as::<_, BuildSummaryRow>(&sql)
        .bind(pipeline_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Every build with its log count, newest first
pub async fn list_summaries(pool: &PgPool) -> Result<Vec<BuildSummary>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {BUILD_COLUMNS}, {LOG_COUNT_COLUMN}
        FROM builds b JOIN pipelines p ON p.id = b.pipeline_id
        ORDER BY b.created_at DESC, b.id DESC
        "#
    );

    let rows = sqlx::query_as::<_, BuildSummaryRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Number of builds recorded for a pipeline
pub async fn count_by_pipeline(pool: &PgPool, pipeline_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM builds WHERE pipeline_id = $1")
        .bind(pipeline_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn status_to_string(status: BuildStatus) -> &'static str {
    status.as_str()
}

fn string_to_status(s: &str) -> BuildStatus {
    s.parse().unwrap_or(BuildStatus::Unknown)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BuildRow {
    id: Uuid,
    pipeline_id: Uuid,
    build_number: i32,
    status: String,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
    end_time: Option<chrono::DateTime<chrono::Utc>>,
    duration_seconds: Option<i64>,
    triggered_by: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    pipeline_name: String,
}

impl BuildRow {
    fn into_parts(self) -> (Build, String) {
        let build = Build {
            id: self.id,
            pipeline_id: self.pipeline_id,
            build_number: self.build_number,
            status: string_to_status(&self.status),
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds: self.duration_seconds,
            triggered_by: self.triggered_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        (build, self.pipeline_name)
    }
}

#[derive(sqlx::FromRow)]
struct BuildSummaryRow {
    #[sqlx(flatten)]
    build: BuildRow,
    log_count: i64,
}

impl From<BuildSummaryRow> for BuildSummary {
    fn from(row: BuildSummaryRow) -> Self {
        let (build, pipeline_name) = row.build.into_parts();

        BuildSummary {
            build,
            pipeline_name,
            log_count: usize::try_from(row.log_count).unwrap_or_default(),
        }
    }
}
