use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{PageContent, WikiPage};
use crate::infra::config::{ConfigError, WikiConfig};
use crate::infra::http::client::make_http_client;
use crate::infra::http::headers::add_request_id;
use crate::infra::logging::record_upstream;

/// Why an upstream call produced no usable payload.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream status {0}")]
    Status(StatusCode),
    #[error("invalid upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{info}")]
    Api { code: String, info: String },
}

/// Upstream wiki operations. Failures are returned, never raised.
#[async_trait]
pub trait WikiApi: Send + Sync + 'static {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<WikiPage>, UpstreamError>;
    async fn page_content(&self, title: &str) -> Result<PageContent, UpstreamError>;
}

/// MediaWiki `api.php` client.
#[derive(Clone)]
pub struct MediaWikiClient {
    api_url: Url,
    http: Client,
}

impl MediaWikiClient {
    pub fn new(wiki: &WikiConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: wiki.api_url.clone(),
            http: make_http_client(wiki)?,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        op: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let (builder, rid) = add_request_id(self.http.get(self.api_url.clone()).query(params), None);
        tracing::debug!(op = op, request_id = %rid, endpoint = %self.api_url, "mediawiki request");
        let start = Instant::now();
        let res = fetch::<T>(builder).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        record_upstream(op, elapsed_ms, res.is_ok());
        if let Err(e) = &res {
            let code = match e {
                UpstreamError::Api { code, .. } => code.as_str(),
                _ => "",
            };
            tracing::debug!(op = op, request_id = %rid, error = %e, api_code = code, "mediawiki request failed");
        }
        res
    }
}

async fn fetch<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, UpstreamError> {
    let resp = builder.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }
    let body: serde_json::Value = serde_json::from_slice(&resp.bytes().await?)?;
    // MediaWiki reports API-level failures with a 200 and an `error` object.
    if let Some(error) = body.get("error") {
        let error: ApiErrorWire = serde_json::from_value(error.clone())?;
        return Err(UpstreamError::Api {
            code: error.code,
            info: error.info,
        });
    }
    Ok(serde_json::from_value(body)?)
}

#[async_trait]
impl WikiApi for MediaWikiClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<WikiPage>, UpstreamError> {
        tracing::info!(query = %query, limit = limit, "starting wiki search");
        let limit = limit.to_string();
        let res = self
            .get::<SearchWire>(
                "search",
                &[
                    ("action", "query"),
                    ("list", "search"),
                    ("srsearch", query),
                    ("srlimit", limit.as_str()),
                    ("srwhat", "text"),
                    ("srprop", "snippet|wordcount|sectiontitle|categorysnippet"),
                    ("format", "json"),
                ],
            )
            .await;
        match res {
            Ok(wire) => {
                tracing::info!(query = %query, results = wire.query.search.len(), "search returned results");
                Ok(wire.query.search)
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "search failed");
                Err(e)
            }
        }
    }

    async fn page_content(&self, title: &str) -> Result<PageContent, UpstreamError> {
        tracing::info!(title = %title, "fetching page content");
        let res = self
            .get::<ParseWire>(
                "parse",
                &[
                    ("action", "parse"),
                    ("page", title),
                    ("prop", "text"),
                    ("format", "json"),
                    ("disablelimitreport", "true"),
                    ("disableeditsection", "true"),
                ],
            )
            .await;
        match res {
            Ok(wire) => {
                tracing::info!(title = %wire.parse.title, "fetched page content");
                Ok(wire.parse)
            }
            Err(e) => {
                tracing::error!(title = %title, error = %e, "page content fetch failed");
                Err(e)
            }
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorWire {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Deserialize)]
struct SearchWire {
    query: SearchQueryWire,
}

#[derive(Deserialize)]
struct SearchQueryWire {
    #[serde(default)]
    search: Vec<WikiPage>,
}

#[derive(Deserialize)]
struct ParseWire {
    parse: PageContent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const API_PATH: &str = "/mediawiki/api.php";

    fn client_for(server: &MockServer) -> MediaWikiClient {
        let wiki = WikiConfig::new("Stardew Valley", &server.url(API_PATH)).unwrap();
        MediaWikiClient::new(&wiki).unwrap()
    }

    #[tokio::test]
    async fn search_sends_query_params_and_maps_pages() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(API_PATH)
                    .query_param("action", "query")
                    .query_param("list", "search")
                    .query_param("srsearch", "blue jazz")
                    .query_param("srlimit", "3")
                    .query_param("srwhat", "text")
                    .query_param("srprop", "snippet|wordcount|sectiontitle|categorysnippet")
                    .query_param("format", "json")
                    .header("accept", "application/json")
                    .header("user-agent", format!("Stardew Valley MCP/{}", crate::infra::config::APP_VERSION))
                    .header_exists("x-request-id");
                then.status(200).json_body(json!({
                    "batchcomplete": "",
                    "query": {
                        "searchinfo": {"totalhits": 2},
                        "search": [
                            {"ns": 0, "title": "Blue Jazz", "pageid": 1, "wordcount": 512,
                             "snippet": "<span class=\"searchmatch\">Blue</span> Jazz is a flower"},
                            {"ns": 0, "title": "Flowers", "pageid": 2, "sectiontitle": "Spring"}
                        ]
                    }
                }));
            })
            .await;

        let pages = client_for(&server).search("blue jazz", 3).await.unwrap();
        m.assert_async().await;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Blue Jazz");
        assert_eq!(pages[0].word_count, Some(512));
        assert_eq!(pages[1].section_title.as_deref(), Some("Spring"));
    }

    #[tokio::test]
    async fn page_content_sends_parse_params() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(API_PATH)
                    .query_param("action", "parse")
                    .query_param("page", "Blue Jazz")
                    .query_param("prop", "text")
                    .query_param("format", "json")
                    .query_param("disablelimitreport", "true")
                    .query_param("disableeditsection", "true");
                then.status(200).json_body(json!({
                    "parse": {"title": "Blue Jazz", "pageid": 1, "text": {"*": "<p>A flower.</p>"}}
                }));
            })
            .await;

        let page = client_for(&server).page_content("Blue Jazz").await.unwrap();
        m.assert_async().await;
        assert_eq!(page.title, "Blue Jazz");
        assert_eq!(page.default_html(), "<p>A flower.</p>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_and_not_retried() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(503).body("maintenance");
            })
            .await;

        let err = client_for(&server).search("x", 5).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.to_string().contains("upstream status 503"));
        m.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = client_for(&server).page_content("x").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
        assert!(err.to_string().starts_with("invalid upstream payload"));
    }

    #[tokio::test]
    async fn api_error_object_is_surfaced_with_its_info() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH).query_param("action", "parse");
                then.status(200).json_body(json!({
                    "error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}
                }));
            })
            .await;

        let err = client_for(&server).page_content("Nope").await.unwrap_err();
        assert!(matches!(&err, UpstreamError::Api { code, .. } if code == "missingtitle"));
        assert_eq!(err.to_string(), "The page you specified doesn't exist.");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let wiki = WikiConfig::new("W", "http://127.0.0.1:1/api.php").unwrap();
        let err = MediaWikiClient::new(&wiki).unwrap().search("x", 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
