//! Repository Module
//!
//! PostgreSQL data access for the collector.
//! Each repository handles database operations for a specific domain entity.

pub mod build;
pub mod log;
pub mod pipeline;

// Re-export for convenience
pub use build as build_repository;
pub use log as log_repository;
pub use pipeline as pipeline_repository;
