//! Jenkins console source
//!
//! `GET {jenkins_url}/job/{name}/{number}/consoleText` with HTTP basic auth.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use super::{ConsoleSource, FetchError};

pub struct JenkinsSource {
    client: Client,
    base_url: String,
    username: String,
    api_key: String,
}

impl JenkinsSource {
    /// Creates a Jenkins source
    ///
    /// # Arguments
    /// * `base_url` - Jenkins root URL (e.g., "http://jenkins:8080")
    /// * `timeout` - Upper bound on a single fetch
    pub fn new(
        base_url: String,
        username: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            api_key,
        })
    }

    /// Console text URL; job names are percent-encoded as path segments
    fn console_url(&self, pipeline: &str, build_number: i32) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["job", pipeline, &build_number.to_string(), "consoleText"]);

        Ok(url)
    }
}

#[async_trait]
impl ConsoleSource for JenkinsSource {
    async fn fetch_console_text(
        &self,
        pipeline: &str,
        build_number: i32,
    ) -> Result<String, FetchError> {
        let url = self.console_url(pipeline, build_number)?;

        tracing::debug!("Fetching console text from {}", url);

        let mut request = self.client.get(url.clone());
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.api_key));
        }

        let response = request.send().await.map_err(|e| transport_error(&url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| transport_error(&url, e))
    }

    fn pipeline_url(&self, pipeline: &str) -> Option<String> {
        Some(format!("{}/job/{}", self.base_url, pipeline))
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> JenkinsSource {
        JenkinsSource::new(
            base.to_string(),
            "ci".to_string(),
            "secret".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_console_url() {
        let url = source("http://jenkins:8080/").console_url("demo", 42).unwrap();
        assert_eq!(url.as_str(), "http://jenkins:8080/job/demo/42/consoleText");
    }

    #[test]
    fn test_console_url_under_prefix_and_encoded() {
        let url = source("http://ci.local/jenkins")
            .console_url("my job", 1)
            .unwrap();
        assert_eq!(url.as_str(), "http://ci.local/jenkins/job/my%20job/1/consoleText");
    }

    #[test]
    fn test_pipeline_url() {
        assert_eq!(
            source("http://jenkins:8080").pipeline_url("demo").as_deref(),
            Some("http://jenkins:8080/job/demo")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            source("not a url").console_url("demo", 1),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_fetch_error() {
        let jenkins = JenkinsSource::new(
            "http://127.0.0.1:1".to_string(),
            String::new(),
            String::new(),
            Duration::from_secs(2),
        )
        .unwrap();

        assert!(jenkins.fetch_console_text("demo", 1).await.is_err());
    }
}
