use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::RequestBuilder;

use crate::infra::config::{ConfigError, WikiConfig};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("wiki-{}-{}-{}", now.as_secs(), now.subsec_nanos(), seq)
}

/// Headers sent with every upstream request.
pub fn default_headers(wiki: &WikiConfig) -> Result<HeaderMap, ConfigError> {
    let user_agent = HeaderValue::from_bytes(wiki.user_agent().as_bytes())
        .map_err(|e| ConfigError::InvalidHeader(e.to_string()))?;
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, user_agent);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Tag an outgoing request with a correlation id. Returns the updated builder and the id used.
pub fn add_request_id(builder: RequestBuilder, request_id: Option<String>) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    (builder.header(REQUEST_ID_HEADER, rid.as_str()), rid)
}
