//! Browser-like request identities
//!
//! Each HTML request carries a freshly generated identity: a user agent drawn
//! from a fixed pool, the accept/encoding/fetch-metadata headers a desktop
//! browser would send, and a new analytics-style session cookie. Sources that
//! are picky about where requests come from get Host/Origin/Referer overrides.

use crate::config::HeaderOverrides;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
];

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const FEED_ACCEPT: &str = "application/rss+xml,application/atom+xml,application/xml;q=0.9";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,hi;q=0.8";
const ACCEPT_ENCODING: &str = "gzip, deflate, br";
const DEFAULT_REFERER: &str = "https://www.google.com/";

/// A complete set of request headers for one attempt
#[derive(Debug, Clone)]
pub struct HeaderSet(HeaderMap);

impl HeaderSet {
    /// Returns a header value as text, if present and printable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.get("user-agent")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_header_map(self) -> HeaderMap {
        self.0
    }

    fn apply(&mut self, overrides: Option<&HeaderOverrides>) {
        let Some(overrides) = overrides else {
            return;
        };
        if let Some(host) = &overrides.host {
            self.insert("host", host);
        }
        if let Some(origin) = &overrides.origin {
            self.insert("origin", origin);
        }
        if let Some(referer) = &overrides.referer {
            self.insert("referer", referer);
        }
        if let Some(language) = &overrides.accept_language {
            self.insert("accept-language", language);
        }
    }

    fn insert(&mut self, name: &'static str, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.0.insert(HeaderName::from_static(name), value);
            }
            Err(_) => {
                tracing::warn!(header = name, value, "Skipping header with invalid value");
            }
        }
    }
}

/// Generates a fresh browser-like identity for an HTML request
///
/// When `overrides` is given, its Host/Origin/Referer/Accept-Language values
/// replace the generic ones so the request looks like in-site navigation.
/// Never fails: invalid override values are skipped.
pub fn next_identity(overrides: Option<&HeaderOverrides>) -> HeaderSet {
    let mut rng = rand::rng();
    let user_agent = USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0]);
    let cookie = session_cookie(&mut rng);

    let mut headers = HeaderSet(HeaderMap::new());
    headers.insert("user-agent", user_agent);
    headers.insert("accept", HTML_ACCEPT);
    headers.insert("accept-language", DEFAULT_ACCEPT_LANGUAGE);
    headers.insert("accept-encoding", ACCEPT_ENCODING);
    headers.insert("upgrade-insecure-requests", "1");
    headers.insert("cache-control", "max-age=0");
    headers.insert("pragma", "no-cache");
    headers.insert("dnt", "1");
    headers.insert("sec-fetch-dest", "document");
    headers.insert("sec-fetch-mode", "navigate");
    headers.insert("sec-fetch-site", "none");
    headers.insert("sec-fetch-user", "?1");
    headers.insert("sec-ch-ua", r#""Not_A Brand";v="8", "Chromium";v="120""#);
    headers.insert("sec-ch-ua-mobile", "?0");
    headers.insert("sec-ch-ua-platform", r#""Windows""#);
    headers.insert("referer", DEFAULT_REFERER);
    headers.insert("cookie", &cookie);
    headers.apply(overrides);
    headers
}

/// Headers for feed requests: a plain reader identity plus any site overrides
pub fn feed_identity(overrides: Option<&HeaderOverrides>) -> HeaderSet {
    let mut headers = HeaderSet(HeaderMap::new());
    headers.insert("user-agent", USER_AGENTS[0]);
    headers.insert("accept", FEED_ACCEPT);
    headers.insert("accept-language", "en-US,en;q=0.9");
    headers.insert("accept-encoding", ACCEPT_ENCODING);
    headers.insert("cache-control", "no-cache");
    headers.insert("pragma", "no-cache");
    headers.apply(overrides);
    headers
}

/// Analytics-style session cookie with randomized client identifiers
fn session_cookie<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "_ga=GA1.2.{}.{}; cookieconsent=true",
        rng.random_range(100_000_000u64..=999_999_999),
        rng.random_range(1_000_000_000u64..=9_999_999_999)
    )
}
