//! Buildlog HTTP Client
//!
//! A type-safe HTTP client for the buildlog collector API.
//!
//! Used by the CLI for queries and by the collector itself to relay
//! collected builds to a second ingestion stage.
//!
//! # Example
//!
//! ```no_run
//! use buildlog_client::CollectorClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CollectorClient::new("http://localhost:8080");
//!
//!     if let Some(build) = client.last_build(None, None).await? {
//!         println!("{} #{}: {}", build.pipeline_name, build.build_number, build.status);
//!     }
//!     Ok(())
//! }
//! ```

mod builds;
pub mod error;
mod ingest;
mod pipelines;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the collector API
///
/// Methods are grouped by resource:
/// - Builds (by id, last, all, logs)
/// - Pipelines (list, search, last, all)
/// - Ingestion (webhook trigger, batch ingest, view publish, relay stats)
#[derive(Debug, Clone)]
pub struct CollectorClient {
    /// Base URL of the collector (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl CollectorClient {
    /// Create a new collector client
    ///
    /// # Example
    /// ```
    /// use buildlog_client::CollectorClient;
    ///
    /// let client = CollectorClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new collector client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the collector
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("{} answered {}", response.url(), status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = ClientError::api_error(status.as_u16(), error_text);
            if !err.is_not_found() {
                tracing::warn!("Collector request failed: {}", err);
            }
            return Err(err);
        }

        response.json().await.map_err(|e| {
            tracing::warn!("Unreadable collector response: {}", e);
            ClientError::ParseError(format!("Failed to parse JSON response: {}", e))
        })
    }

    /// Like [`Self::handle_response`], but a 404 becomes `None`
    async fn handle_optional<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>> {
        match self.handle_response(response).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CollectorClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = CollectorClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_unreachable_collector_is_request_error() {
        let client = CollectorClient::new("http://127.0.0.1:1");
        let err = client.list_pipelines().await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed(_)));
    }

    /// Serve one canned HTTP response on a local port
    async fn answer_once(status: &str, body: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_not_found_becomes_none() {
        let url = answer_once("404 Not Found", r#"{"error":"Build not found"}"#).await;
        let client = CollectorClient::new(url);

        let build = client.last_build(None, None).await.unwrap();

        assert!(build.is_none());
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let url = answer_once("502 Bad Gateway", r#"{"error":"Jenkins unreachable"}"#).await;
        let client = CollectorClient::new(url);

        let err = client.list_pipelines().await.unwrap_err();

        assert!(err.is_server_error());
        match err {
            ClientError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Jenkins unreachable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let url = answer_once("200 OK", "not json").await;
        let client = CollectorClient::new(url);

        let err = client.list_pipelines().await.unwrap_err();

        assert!(matches!(err, ClientError::ParseError(_)));
    }
}
