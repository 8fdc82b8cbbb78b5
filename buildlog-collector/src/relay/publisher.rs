//! Event bus publisher over a Kafka REST proxy
//!
//! Records are posted to `{base_url}/topics/{topic}` in the proxy's JSON
//! embedded format: `{"records": [{"key": ..., "value": ...}]}`.

use async_trait::async_trait;
use buildlog_core::dto::view::EventEnvelope;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{EventPublisher, RelayError};

const CONTENT_TYPE: &str = "application/vnd.kafka.json.v2+json";

pub struct RestEventPublisher {
    client: Client,
    base_url: String,
}

impl RestEventPublisher {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Publish(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Serialize)]
struct ProduceRequest<'a> {
    records: [ProduceRecord<'a>; 1],
}

#[derive(Serialize)]
struct ProduceRecord<'a> {
    key: &'a str,
    value: &'a EventEnvelope,
}

#[async_trait]
impl EventPublisher for RestEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &EventEnvelope,
    ) -> Result<(), RelayError> {
        let url = format!("{}/topics/{}", self.base_url, topic);
        let body = serde_json::to_vec(&ProduceRequest {
            records: [ProduceRecord {
                key,
                value: payload,
            }],
        })
        .map_err(|e| RelayError::Serialize(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RelayError::Publish(format!(
                "event bus returned {}: {}",
                status, text
            )));
        }

        tracing::debug!("Published '{}' to topic {}", key, topic);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_produce_request_shape() {
        let envelope = EventEnvelope {
            event: "last_build".to_string(),
            generated_at: Utc::now(),
            data: serde_json::json!({ "buildNumber": 5 }),
        };
        let request = ProduceRequest {
            records: [ProduceRecord {
                key: "last_build",
                value: &envelope,
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["records"][0]["key"], "last_build");
        assert_eq!(json["records"][0]["value"]["event"], "last_build");
        assert_eq!(json["records"][0]["value"]["data"]["buildNumber"], 5);
    }

    #[tokio::test]
    async fn test_unreachable_bus_is_publish_error() {
        let publisher =
            RestEventPublisher::new("http://127.0.0.1:1".to_string(), Duration::from_secs(2))
                .unwrap();
        let envelope = EventEnvelope {
            event: "last_build".to_string(),
            generated_at: Utc::now(),
            data: serde_json::Value::Null,
        };

        let result = publisher.publish("jenkins-logs", "last_build", &envelope).await;
        assert!(matches!(result, Err(RelayError::Publish(_))));
    }
}
