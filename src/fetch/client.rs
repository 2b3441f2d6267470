//! HTTP client construction
//!
//! Clients prefer HTTP/2 (negotiated over ALPN) and fall back to an
//! HTTP/1.1-only client when the preferred configuration cannot be built.
//! A missing multiplexed transport never fails a fetch on its own.

use reqwest::{redirect::Policy, Client, ClientBuilder};
use std::time::Duration;

/// Transport the client was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// HTTP/2 when the server offers it, HTTP/1.1 otherwise
    Http2Preferred,
    /// HTTP/1.1 only
    Http1Only,
}

/// Builds an HTTP client with the given per-request timeout
///
/// # Returns
///
/// * `Ok((Client, Transport))` - A client and the transport it negotiates
/// * `Err(reqwest::Error)` - Neither the preferred nor the fallback client
///   could be built
pub fn build_http_client(timeout: Duration) -> Result<(Client, Transport), reqwest::Error> {
    match base_builder(timeout).http2_adaptive_window(true).build() {
        Ok(client) => Ok((client, Transport::Http2Preferred)),
        Err(e) => {
            tracing::warn!(error = %e, "HTTP/2 client unavailable, falling back to HTTP/1.1");
            let client = base_builder(timeout).http1_only().build()?;
            Ok((client, Transport::Http1Only))
        }
    }
}

fn base_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .deflate(true)
}
