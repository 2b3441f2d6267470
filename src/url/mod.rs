//! URL handling module for Newsdesk-Ingest
//!
//! This module resolves extracted `href` values against the page they were
//! found on and builds cache-defeating request URLs.

mod cache_bust;
mod resolve;

pub use cache_bust::{cache_busted_url, with_cache_buster};
pub use resolve::resolve_link;
