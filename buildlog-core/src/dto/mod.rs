//! Data Transfer Objects for inter-service communication
//!
//! Read-shapes rendered by the collector, the batch payload relayed to the
//! second ingestion stage, and the envelopes published to the event bus.
//! Everything here is camelCase on the wire.

pub mod batch;
pub mod build;
pub mod pipeline;
pub mod view;
