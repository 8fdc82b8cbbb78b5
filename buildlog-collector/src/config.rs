//! Collector configuration
//!
//! Connection settings for the store, the CI server, and the downstream
//! relay targets. Everything is read from environment variables.

use std::time::Duration;

/// Collector configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL; `None` runs against the in-memory store
    pub database_url: Option<String>,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Jenkins base URL (e.g., "http://jenkins:8080")
    pub jenkins_url: String,

    pub jenkins_username: String,

    pub jenkins_api_key: String,

    /// Upper bound on a single console fetch
    pub fetch_timeout: Duration,

    /// Shared secret expected on webhook triggers; `None` disables the check
    pub webhook_token: Option<String>,

    /// Second ingestion stage; `None` skips the batch relay
    pub analyzer_url: Option<String>,

    /// Event bus REST endpoint; `None` skips publishing
    pub event_bus_url: Option<String>,

    pub event_topic: String,

    /// Upper bound on each relay send
    pub relay_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(jenkins_url: String) -> Self {
        Self {
            database_url: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            jenkins_url,
            jenkins_username: String::new(),
            jenkins_api_key: String::new(),
            fetch_timeout: Duration::from_secs(30),
            webhook_token: None,
            analyzer_url: None,
            event_bus_url: None,
            event_topic: "jenkins-logs".to_string(),
            relay_timeout: Duration::from_secs(10),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JENKINS_URL (required)
    /// - JENKINS_USERNAME, JENKINS_API_KEY (optional, basic auth)
    /// - DATABASE_URL (optional, in-memory store when unset)
    /// - COLLECTOR_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - FETCH_TIMEOUT (optional, seconds, default: 30)
    /// - WEBHOOK_TOKEN (optional)
    /// - ANALYZER_URL (optional)
    /// - EVENT_BUS_URL (optional)
    /// - EVENT_TOPIC (optional, default: jenkins-logs)
    /// - RELAY_TIMEOUT (optional, seconds, default: 10)
    pub fn from_env() -> anyhow::Result<Self> {
        let jenkins_url = std::env::var("JENKINS_URL")
            .map_err(|_| anyhow::anyhow!("JENKINS_URL environment variable not set"))?;

        let mut config = Self::new(jenkins_url.trim_end_matches('/').to_string());

        config.database_url = non_empty_var("DATABASE_URL");
        if let Some(addr) = non_empty_var("COLLECTOR_BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.jenkins_username = non_empty_var("JENKINS_USERNAME").unwrap_or_default();
        config.jenkins_api_key = non_empty_var("JENKINS_API_KEY").unwrap_or_default();
        if let Some(timeout) = seconds_var("FETCH_TIMEOUT")? {
            config.fetch_timeout = timeout;
        }
        config.webhook_token = non_empty_var("WEBHOOK_TOKEN");
        config.analyzer_url =
            non_empty_var("ANALYZER_URL").map(|url| url.trim_end_matches('/').to_string());
        config.event_bus_url =
            non_empty_var("EVENT_BUS_URL").map(|url| url.trim_end_matches('/').to_string());
        if let Some(topic) = non_empty_var("EVENT_TOPIC") {
            config.event_topic = topic;
        }
        if let Some(timeout) = seconds_var("RELAY_TIMEOUT")? {
            config.relay_timeout = timeout;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jenkins_url.is_empty() {
            anyhow::bail!("jenkins_url cannot be empty");
        }

        for (name, url) in [
            ("jenkins_url", Some(&self.jenkins_url)),
            ("analyzer_url", self.analyzer_url.as_ref()),
            ("event_bus_url", self.event_bus_url.as_ref()),
        ] {
            let valid = url.is_none_or(|u| u.starts_with("http://") || u.starts_with("https://"));
            if !valid {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.fetch_timeout.as_secs() == 0 {
            anyhow::bail!("fetch_timeout must be greater than 0");
        }

        if self.relay_timeout.as_secs() == 0 {
            anyhow::bail!("relay_timeout must be greater than 0");
        }

        if self.event_topic.is_empty() {
            anyhow::bail!("event_topic cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8081".to_string())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn seconds_var(name: &str) -> anyhow::Result<Option<Duration>> {
    parse_seconds(name, non_empty_var(name))
}

/// Whole seconds; a value that is set but not a number is an error
fn parse_seconds(name: &str, value: Option<String>) -> anyhow::Result<Option<Duration>> {
    value
        .map(|raw| {
            raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                anyhow::anyhow!("{} must be a whole number of seconds, got {:?}", name, raw)
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.relay_timeout, Duration::from_secs(10));
        assert_eq!(config.event_topic, "jenkins-logs");
        assert!(config.database_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.jenkins_url = "jenkins:8080".to_string();
        assert!(config.validate().is_err());

        config.jenkins_url = "http://jenkins:8080".to_string();
        config.analyzer_url = Some("analyzer:8082".to_string());
        assert!(config.validate().is_err());

        config.analyzer_url = Some("http://analyzer:8082".to_string());
        assert!(config.validate().is_ok());

        config.relay_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("FETCH_TIMEOUT", None).unwrap(), None);
        assert_eq!(
            parse_seconds("FETCH_TIMEOUT", Some("45".to_string())).unwrap(),
            Some(Duration::from_secs(45))
        );

        let err = parse_seconds("RELAY_TIMEOUT", Some("10s".to_string())).unwrap_err();
        assert!(err.to_string().contains("RELAY_TIMEOUT"));
        assert!(parse_seconds("FETCH_TIMEOUT", Some("-1".to_string())).is_err());
    }

    #[test]
    fn test_empty_topic_rejected() {
        let mut config = Config::default();
        config.event_topic = String::new();
        assert!(config.validate().is_err());
    }
}
