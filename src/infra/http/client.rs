use crate::infra::config::{ConfigError, WikiConfig};
use crate::infra::http::headers::default_headers;

/// Build the shared upstream client. Timeouts stay at reqwest's defaults.
pub fn make_http_client(wiki: &WikiConfig) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .default_headers(default_headers(wiki)?)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}
