//! Buildlog Core
//!
//! Core types and pure logic for the buildlog ingestion system.
//!
//! This crate contains:
//! - Domain types: Pipeline, Build and LogLine records
//! - DTOs: projections and batch payloads exchanged between services
//! - Classification: console line severity and build status inference

pub mod classify;
pub mod domain;
pub mod dto;
