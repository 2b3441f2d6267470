use chrono::Utc;
use rand::Rng;

/// Appends a cache-defeating query suffix to a URL
///
/// The suffix carries the request time in epoch milliseconds and a random
/// four-digit token: `?_=<millis>&r=<token>`. URLs that already have a query
/// string get the suffix joined with `&` instead.
pub fn with_cache_buster(url: &str, epoch_millis: i64, token: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}_={}&r={}", url, separator, epoch_millis, token)
}

/// Appends a fresh cache-defeating suffix using the current time
pub fn cache_busted_url(url: &str) -> String {
    let token = rand::rng().random_range(1000..=9999);
    with_cache_buster(url, Utc::now().timestamp_millis(), token)
}
