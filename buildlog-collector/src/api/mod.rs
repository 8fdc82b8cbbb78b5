//! API Module
//!
//! HTTP API layer for the collector.
//! Each submodule handles endpoints for a specific resource.

pub mod build;
pub mod error;
pub mod health;
pub mod ingest;
pub mod pipeline;
pub mod view;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::relay::Relay;
use crate::source::ConsoleSource;
use crate::store::EntityStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub source: Arc<dyn ConsoleSource>,
    pub relay: Arc<Relay>,
    /// Expected `token` on webhook calls; `None` accepts any
    pub webhook_token: Option<String>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Ingestion endpoints
        .route("/api/webhook", post(webhook::collect_build))
        .route("/api/ingest/builds", post(ingest::ingest_builds))
        // Pipeline endpoints
        .route("/api/pipelines", get(pipeline::list_pipelines))
        .route("/api/pipelines/search", get(pipeline::find_pipeline))
        .route("/api/pipelines/last", get(pipeline::last_pipeline))
        .route("/api/pipelines/all", get(pipeline::all_pipelines))
        .route("/api/pipelines/{id}", get(pipeline::get_pipeline))
        .route("/api/pipelines/{id}/builds", get(pipeline::list_pipeline_builds))
        // Build endpoints
        .route("/api/builds/last", get(build::last_build))
        .route("/api/builds/last/important", get(build::last_build_important))
        .route("/api/builds/all", get(build::all_builds))
        .route("/api/builds/{id}", get(build::get_build))
        .route("/api/builds/{id}/logs", get(build::get_build_logs))
        .route("/api/builds/{id}/errors", get(build::get_build_errors))
        // Views & relay
        .route("/api/views/{view}/publish", post(view::publish_view))
        .route("/api/relay/stats", get(view::relay_stats))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
