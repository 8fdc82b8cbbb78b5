use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

/// Current time at the microsecond precision `TIMESTAMPTZ` stores, so a
/// timestamp reads back exactly as it was written
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create pipelines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipelines (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            display_name VARCHAR(255) NOT NULL,
            source_url TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create builds table; (pipeline_id, build_number) is the idempotency key
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS builds (
            id UUID PRIMARY KEY,
            pipeline_id UUID NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
            build_number INTEGER NOT NULL,
            status VARCHAR(20) NOT NULL,
            start_time TIMESTAMPTZ,
            end_time TIMESTAMPTZ,
            duration_seconds BIGINT,
            triggered_by TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            CONSTRAINT uq_builds_pipeline_number UNIQUE (pipeline_id, build_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create log lines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_lines (
            id BIGSERIAL PRIMARY KEY,
            build_id UUID NOT NULL REFERENCES builds(id) ON DELETE CASCADE,
            line_no INTEGER NOT NULL,
            level VARCHAR(10) NOT NULL,
            message TEXT NOT NULL,
            stack_trace TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for the "last"/ordered queries
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pipelines_created_at ON pipelines(created_at DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_builds_created_at ON builds(created_at DESC)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_builds_pipeline_created ON builds(pipeline_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_log_lines_build ON log_lines(build_id, line_no)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_log_lines_build_level ON log_lines(build_id, level)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
