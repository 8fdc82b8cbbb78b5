//! Console sources
//!
//! Where raw build console text comes from. The collector only depends on
//! the [`ConsoleSource`] trait; [`JenkinsSource`] is the production
//! implementation.

pub mod jenkins;

use async_trait::async_trait;

pub use jenkins::JenkinsSource;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("console fetch timed out: {0}")]
    Timeout(String),

    #[error("CI server answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid console url: {0}")]
    InvalidUrl(String),

    #[error("console fetch failed: {0}")]
    Transport(String),
}

/// Fetches the console text of one build
#[async_trait]
pub trait ConsoleSource: Send + Sync {
    /// Full console output of `pipeline` build `build_number`
    async fn fetch_console_text(
        &self,
        pipeline: &str,
        build_number: i32,
    ) -> Result<String, FetchError>;

    /// Browsable URL of a pipeline, recorded when the pipeline is first seen
    fn pipeline_url(&self, pipeline: &str) -> Option<String>;
}
