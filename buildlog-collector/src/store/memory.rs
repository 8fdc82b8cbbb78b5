//! In-memory entity store
//!
//! Holds everything behind one mutex, so each operation is atomic with
//! respect to the others. Used when `DATABASE_URL` is unset and by tests.

use async_trait::async_trait;
use buildlog_core::domain::build::{Build, BuildDraft, BuildSummary, BuildWithLogs};
use buildlog_core::domain::log::{LogLevel, LogLine};
use buildlog_core::domain::pipeline::{NewPipeline, Pipeline};
use chrono::Utc;
use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{EntityStore, NamedBuild, StoreError, StoreResult};

#[derive(Default)]
struct State {
    pipelines: Vec<Pipeline>,
    builds: Vec<Build>,
    logs: Vec<LogLine>,
    next_log_id: i64,
}

impl State {
    fn pipeline_name(&self, pipeline_id: Uuid) -> String {
        self.pipelines
            .iter()
            .find(|p| p.id == pipeline_id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn named(&self, build: &Build) -> NamedBuild {
        (build.clone(), self.pipeline_name(build.pipeline_id))
    }

    fn log_count(&self, build_id: Uuid) -> usize {
        self.logs.iter().filter(|l| l.build_id == build_id).count()
    }

    fn sorted_logs<F>(&self, keep: F) -> Vec<LogLine>
    where
        F: Fn(&LogLine) -> bool,
    {
        let mut logs: Vec<LogLine> = self.logs.iter().filter(|l| keep(l)).cloned().collect();
        logs.sort_by_key(|l| (Reverse(l.created_at), l.line_no));
        logs
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first<T, K>(items: &mut [T], key: K)
where
    K: Fn(&T) -> (chrono::DateTime<Utc>, Uuid),
{
    items.sort_by_key(|item| Reverse(key(item)));
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn upsert_pipeline(&self, pipeline: NewPipeline) -> StoreResult<Pipeline> {
        let mut state = self.state();

        if let Some(existing) = state.pipelines.iter().find(|p| p.name == pipeline.name) {
            return Ok(existing.clone());
        }

        let now = crate::db::now();
        let created = Pipeline {
            id: Uuid::new_v4(),
            name: pipeline.name,
            display_name: pipeline.display_name,
            source_url: pipeline.source_url,
            created_at: now,
            updated_at: now,
        };
        state.pipelines.push(created.clone());
        Ok(created)
    }

    async fn pipeline_by_name(&self, name: &str) -> StoreResult<Option<Pipeline>> {
        Ok(self.state().pipelines.iter().find(|p| p.name == name).cloned())
    }

    async fn pipeline_by_id(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        Ok(self.state().pipelines.iter().find(|p| p.id == id).cloned())
    }

    async fn list_pipelines(&self) -> StoreResult<Vec<Pipeline>> {
        let mut pipelines = self.state().pipelines.clone();
        newest_first(&mut pipelines, |p| (p.created_at, p.id));
        Ok(pipelines)
    }

    async fn last_pipeline(&self) -> StoreResult<Option<Pipeline>> {
        Ok(self
            .state()
            .pipelines
            .iter()
            .max_by_key(|p| (p.created_at, p.id))
            .cloned())
    }

    async fn insert_build(
        &self,
        draft: BuildDraft,
        pipeline_name: &str,
    ) -> StoreResult<BuildWithLogs> {
        let mut state = self.state();
        let new = draft.build;

        let duplicate = state
            .builds
            .iter()
            .any(|b| b.pipeline_id == new.pipeline_id && b.build_number == new.build_number);
        if duplicate {
            return Err(StoreError::Conflict {
                pipeline_id: new.pipeline_id,
                build_number: new.build_number,
            });
        }

        let now = crate::db::now();
        let build = Build {
            id: Uuid::new_v4(),
            pipeline_id: new.pipeline_id,
            build_number: new.build_number,
            status: new.status,
            start_time: new.start_time,
            end_time: new.end_time,
            duration_seconds: new.duration_seconds(),
            triggered_by: new.triggered_by,
            created_at: now,
            updated_at: now,
        };

        let mut logs = Vec::with_capacity(draft.logs.len());
        for line in draft.logs {
            state.next_log_id += 1;
            logs.push(LogLine {
                id: state.next_log_id,
                build_id: build.id,
                line_no: line.line_no,
                level: line.level,
                message: line.message,
                stack_trace: line.stack_trace,
                created_at: now,
            });
        }

        state.builds.push(build.clone());
        state.logs.extend(logs.iter().cloned());

        Ok(BuildWithLogs {
            build,
            pipeline_name: pipeline_name.to_string(),
            logs,
        })
    }

    async fn build_by_id(&self, id: Uuid) -> StoreResult<Option<NamedBuild>> {
        let state = self.state();
        Ok(state.builds.iter().find(|b| b.id == id).map(|b| state.named(b)))
    }

    async fn build_by_number(
        &self,
        pipeline_id: Uuid,
        build_number: i32,
    ) -> StoreResult<Option<NamedBuild>> {
        let state = self.state();
        Ok(state
            .builds
            .iter()
            .find(|b| b.pipeline_id == pipeline_id && b.build_number == build_number)
            .map(|b| state.named(b)))
    }

    async fn last_build(&self) -> StoreResult<Option<NamedBuild>> {
        let state = self.state();
        Ok(state
            .builds
            .iter()
            .max_by_key(|b| (b.created_at, b.id))
            .map(|b| state.named(b)))
    }

    async fn build_summaries(&self, pipeline_id: Option<Uuid>) -> StoreResult<Vec<BuildSummary>> {
        let state = self.state();
        let mut summaries: Vec<BuildSummary> = state
            .builds
            .iter()
            .filter(|b| pipeline_id.is_none_or(|id| b.pipeline_id == id))
            .map(|b| BuildSummary {
                build: b.clone(),
                pipeline_name: state.pipeline_name(b.pipeline_id),
                log_count: state.log_count(b.id),
            })
            .collect();
        newest_first(&mut summaries, |s| (s.build.created_at, s.build.id));
        Ok(summaries)
    }

    async fn count_builds(&self, pipeline_id: Uuid) -> StoreResult<usize> {
        Ok(self
            .state()
            .builds
            .iter()
            .filter(|b| b.pipeline_id == pipeline_id)
            .count())
    }

    async fn logs_for_build(&self, build_id: Uuid) -> StoreResult<Vec<LogLine>> {
        Ok(self.state().sorted_logs(|l| l.build_id == build_id))
    }

    async fn logs_by_level(&self, build_id: Uuid, level: LogLevel) -> StoreResult<Vec<LogLine>> {
        Ok(self
            .state()
            .sorted_logs(|l| l.build_id == build_id && l.level == level))
    }
}
