//! Upstream fetching
//!
//! This module contains everything that talks to upstream servers:
//! - Client construction
//! - Browser-like request identities
//! - Retry pacing
//! - The HTML fetch-and-extract engine and its selector cascade
//! - The RSS/Atom feed engine

mod client;
mod extract;
mod feed;
mod html;
mod identity;
mod pacing;

pub use client::{build_http_client, Transport};
pub use extract::{extract_articles, CONTAINER_KEYWORDS};
pub use feed::{is_fresh, parse_feed, FeedEngine, FeedError};
pub use html::{FetchReport, FetchStatus, HtmlEngine, HtmlTarget};
pub use identity::{feed_identity, next_identity, HeaderSet};
pub use pacing::{RetryPolicy, MAX_DELAY_UNITS};
