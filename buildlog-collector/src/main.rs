use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod relay;
pub mod repository;
pub mod service;
pub mod source;
pub mod store;

use buildlog_client::CollectorClient;
use config::Config;
use relay::{AnalyzerSink, BatchSink, EventPublisher, Relay, RestEventPublisher};
use source::JenkinsSource;
use store::{EntityStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buildlog_collector=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting buildlog collector...");

    let config = Config::from_env()?;
    config.validate()?;

    let store = create_store(&config).await?;
    let relay = create_relay(&config)?;

    let source = JenkinsSource::new(
        config.jenkins_url.clone(),
        config.jenkins_username.clone(),
        config.jenkins_api_key.clone(),
        config.fetch_timeout,
    )
    .context("Failed to create Jenkins client")?;

    // Build router with all API endpoints
    let app = api::create_router(api::AppState {
        store,
        source: Arc::new(source),
        relay: Arc::new(relay),
        webhook_token: config.webhook_token.clone(),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

async fn create_store(config: &Config) -> anyhow::Result<Arc<dyn EntityStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(PgStore::new(pool)))
}

fn create_relay(config: &Config) -> anyhow::Result<Relay> {
    let sink: Option<Arc<dyn BatchSink>> = match &config.analyzer_url {
        Some(url) => {
            let http = reqwest::Client::builder()
                .timeout(config.relay_timeout)
                .build()
                .context("Failed to create analyzer client")?;
            tracing::info!("Relaying builds to analyzer at {}", url);
            Some(Arc::new(AnalyzerSink::new(CollectorClient::with_client(
                url.as_str(),
                http,
            ))))
        }
        None => None,
    };

    let publisher: Option<Arc<dyn EventPublisher>> = match &config.event_bus_url {
        Some(url) => {
            tracing::info!(
                "Publishing events to {} (topic: {})",
                url,
                config.event_topic
            );
            Some(Arc::new(RestEventPublisher::new(
                url.clone(),
                config.relay_timeout,
            )?))
        }
        None => None,
    };

    Ok(Relay::new(sink, publisher, config.event_topic.clone()))
}
