//! Wiki data model shared by the upstream client and the tools.

pub mod normalize;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key of the default (unnamed) rendering in a parse response.
pub const DEFAULT_VARIANT: &str = "*";

pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

fn default_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

/// Arguments of `search_wiki`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Arguments of `get_page_content`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page_title: String,
}

/// One hit from `list=search`. Field names follow the upstream wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(
        default,
        rename = "sectiontitle",
        skip_serializing_if = "Option::is_none"
    )]
    pub section_title: Option<String>,
    #[serde(
        default,
        rename = "categorysnippet",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_snippet: Option<String>,
    #[serde(default, rename = "wordcount", skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

impl WikiPage {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: None,
            section_title: None,
            category_snippet: None,
            word_count: None,
        }
    }
}

/// Body of an `action=parse` response, keyed by content variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageContent {
    pub title: String,
    #[serde(default)]
    pub text: HashMap<String, String>,
}

impl PageContent {
    /// HTML of the default variant; empty when the upstream omitted it.
    pub fn default_html(&self) -> &str {
        self.text.get(DEFAULT_VARIANT).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<WikiPage>,
    pub total_results: usize,
    pub query: String,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, results: Vec<WikiPage>) -> Self {
        Self {
            total_results: results.len(),
            results,
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub title: String,
    pub content: String,
    pub url: String,
    pub word_count: usize,
}

/// Response envelope of `search_wiki`: exactly one top-level key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    SearchResults(SearchResults),
    Error(String),
}

/// Response envelope of `get_page_content`: exactly one top-level key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    PageContent(PageSummary),
    Error(String),
}
