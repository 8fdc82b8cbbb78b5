//! Service Module
//!
//! Business logic layer for the collector.
//! Services orchestrate between the store, the console source and the relay.

pub mod batch;
pub mod collect;
pub mod ingest;
pub mod projection;
pub mod query;
pub mod view;

// Re-export for convenience
pub use batch as batch_service;
pub use collect as collect_service;
pub use query as query_service;
pub use view as view_service;

#[cfg(test)]
pub(crate) mod testing {
    //! Doubles shared by the service tests

    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    use crate::source::{ConsoleSource, FetchError};

    /// Console source serving canned text per (pipeline, build)
    #[derive(Default)]
    pub struct StaticSource {
        consoles: HashMap<(String, i32), String>,
        fetches: AtomicUsize,
        gate: Option<Arc<Barrier>>,
    }

    impl StaticSource {
        pub fn with(mut self, pipeline: &str, build_number: i32, console: &str) -> Self {
            self.consoles
                .insert((pipeline.to_string(), build_number), console.to_string());
            self
        }

        /// Hold every fetch until `callers` fetches are in flight
        pub fn gated(mut self, callers: usize) -> Self {
            self.gate = Some(Arc::new(Barrier::new(callers)));
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConsoleSource for StaticSource {
        async fn fetch_console_text(
            &self,
            pipeline: &str,
            build_number: i32,
        ) -> Result<String, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.wait().await;
            }
            self.consoles
                .get(&(pipeline.to_string(), build_number))
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 404,
                    url: format!("/job/{}/{}/consoleText", pipeline, build_number),
                })
        }

        fn pipeline_url(&self, pipeline: &str) -> Option<String> {
            Some(format!("http://jenkins.test/job/{}", pipeline))
        }
    }
}
