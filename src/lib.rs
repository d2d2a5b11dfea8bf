//! Event ingestion pipeline for the Stagelog performance catalog.
//!
//! Renders a venue's listing page, pulls event containers out of the DOM,
//! parses and normalizes them, and upserts venue/performance records into
//! the catalog without creating duplicates.

pub mod apis;
pub mod catalog;
pub mod classify;
pub mod common;
pub mod config;
pub mod extract;
pub mod logging;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod render;

pub use common::error::{Result, ScraperError};
pub use common::types::IntegrationResult;
pub use pipeline::{Pipeline, PipelineOptions};
