//! Core domain types
//!
//! Records persisted by the collector. Ownership runs one way:
//! a pipeline owns its builds and a build owns its log lines. Children only
//! carry the parent's id for lookups.

pub mod build;
pub mod log;
pub mod pipeline;
