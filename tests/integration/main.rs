//! Integration tests for the ingestion pipeline
//!
//! These tests use wiremock to create mock upstream servers and exercise
//! the engines, adapters and orchestrator end-to-end. Pacing is scaled down
//! to one millisecond per time unit.

mod feed_engine;
mod html_engine;
mod pipeline;
