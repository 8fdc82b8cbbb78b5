//! Configuration module

use buildlog_client::CollectorClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the collector service
    pub collector_url: String,
}

impl Config {
    pub fn client(&self) -> CollectorClient {
        CollectorClient::new(&self.collector_url)
    }
}
