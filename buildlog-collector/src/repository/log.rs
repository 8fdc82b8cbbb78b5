//! Log Repository
//!
//! Handles all database operations related to build log lines.

use buildlog_core::domain::log::{LogLevel, LogLine, NewLogLine};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

/// Rows per INSERT statement; keeps bind parameters well under the protocol limit
const INSERT_CHUNK: usize = 1000;

/// Insert the log lines of a build and return them with their assigned ids.
///
/// Runs on the build's transaction. The returned lines keep input order.
pub async fn insert_lines(
    conn: &mut PgConnection,
    build_id: Uuid,
    created_at: DateTime<Utc>,
    lines: &[NewLogLine],
) -> Result<Vec<LogLine>, sqlx::Error> {
    let mut ids: HashMap<i32, i64> = HashMap::with_capacity(lines.len());

    for chunk in lines.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO log_lines (build_id, line_no, level, message, stack_trace, created_at) ",
        );

        builder.push_values(chunk, |mut row, line| {
            row.push_bind(build_id)
                .push_bind(line.line_no)
                .push_bind(level_to_string(line.level))
                .push_bind(&line.message)
                .push_bind(&line.stack_trace)
                .push_bind(created_at);
        });
        builder.push(" RETURNING id, line_no");

        let assigned: Vec<(i64, i32)> = builder.build_query_as().fetch_all(&mut *conn).await?;
        ids.extend(assigned.into_iter().map(|(id, line_no)| (line_no, id)));
    }

    Ok(lines
        .iter()
        .map(|line| LogLine {
            id: ids.get(&line.line_no).copied().unwrap_or_default(),
            build_id,
            line_no: line.line_no,
            level: line.level,
            message: line.message.clone(),
            stack_trace: line.stack_trace.clone(),
            created_at,
        })
        .collect())
}

/// Get all log lines for a build
pub async fn find_by_build(pool: &PgPool, build_id: Uuid) -> Result<Vec<LogLine>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LogRow>(
        r#"
        SELECT id, build_id, line_no, level, message, stack_trace, created_at
        FROM log_lines
        WHERE build_id = $1
        ORDER BY created_at DESC, line_no ASC
        "#,
    )
    .bind(build_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Get the log lines of a build at one level
pub async fn find_by_build_and_level(
    pool: &PgPool,
    build_id: Uuid,
    level: LogLevel,
) -> Result<Vec<LogLine>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LogRow>(
        r#"
        SELECT id, build_id, line_no, level, message, stack_trace, created_at
        FROM log_lines
        WHERE build_id = $1 AND level = $2
        ORDER BY created_at DESC, line_no ASC
        "#,
    )
    .bind(build_id)
    .bind(level_to_string(level))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Helper Functions
// =============================================================================

fn level_to_string(level: LogLevel) -> &'static str {
    level.as_str()
}

fn string_to_level(s: &str) -> LogLevel {
    s.parse().unwrap_or(LogLevel::Info)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    build_id: Uuid,
    line_no: i32,
    level: String,
    message: String,
    stack_trace: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LogRow> for LogLine {
    fn from(row: LogRow) -> Self {
        LogLine {
            id: row.id,
            build_id: row.build_id,
            line_no: row.line_no,
            level: string_to_level(&row.level),
            message: row.message,
            stack_trace: row.stack_trace,
            created_at: row.created_at,
        }
    }
}
