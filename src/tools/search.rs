use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use rmcp::ErrorData as McpError;
use serde_json::json;

use crate::clients::mediawiki::WikiApi;
use crate::core::content::Envelope;
use crate::core::tool::{decode_args, schema, Tool, ToolDescriptor, ToolSpec};
use crate::domain::{SearchOutcome, SearchQuery, SearchResults, DEFAULT_SEARCH_LIMIT};

pub const NAME: &str = "search_wiki";

pub fn descriptor(wiki_name: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        title: format!("Search {wiki_name} Wiki"),
        description: format!(
            "Search the {wiki_name} wiki for articles matching a free-text query. \
             Returns page titles with highlighted snippets, section titles, category snippets and word counts."
        ),
        input_schema: schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": format!("Search query for the {wiki_name} wiki")
                },
                "limit": {
                    "type": "integer",
                    "description": format!("Maximum number of results to return (default: {DEFAULT_SEARCH_LIMIT})"),
                    "default": DEFAULT_SEARCH_LIMIT,
                    "minimum": 1
                }
            },
            "required": ["query"]
        })),
        output_schema: Some(schema(json!({
            "type": "object",
            "oneOf": [
                {
                    "type": "object",
                    "properties": {
                        "results": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "title": { "type": "string" },
                                    "snippet": { "type": "string" },
                                    "sectiontitle": { "type": "string" },
                                    "categorysnippet": { "type": "string" },
                                    "wordcount": { "type": "integer" }
                                },
                                "required": ["title", "snippet", "sectiontitle", "categorysnippet", "wordcount"]
                            }
                        }
                    },
                    "required": ["results"]
                },
                {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string", "description": "Error message" }
                    },
                    "required": ["error"]
                }
            ]
        }))),
    }
}

pub struct SearchTool {
    descriptor: ToolDescriptor,
    wiki: Arc<dyn WikiApi>,
}

impl SearchTool {
    pub fn new(wiki_name: &str, wiki: Arc<dyn WikiApi>) -> Self {
        Self {
            descriptor: descriptor(wiki_name),
            wiki,
        }
    }
}

impl ToolSpec for SearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl Tool for SearchTool {
    async fn call(&self, arguments: JsonObject) -> Result<Envelope, McpError> {
        let input: SearchQuery = decode_args(NAME, arguments)?;
        if input.query.trim().is_empty() {
            return Err(McpError::invalid_params("query must not be empty", None));
        }
        if input.limit == 0 {
            return Err(McpError::invalid_params("limit must be at least 1", None));
        }
        tracing::info!(query = %input.query, limit = input.limit, "received search_wiki request");

        let outcome = match self.wiki.search(&input.query, input.limit).await {
            Ok(results) => {
                tracing::info!(query = %input.query, results = results.len(), "search_wiki succeeded");
                SearchOutcome::SearchResults(SearchResults::new(input.query, results))
            }
            Err(e) => {
                tracing::error!(query = %input.query, error = %e, "search_wiki failed");
                SearchOutcome::Error(format!("Error occurred while searching the wiki: {e}"))
            }
        };
        Envelope::from_outcome(&outcome)
    }
}
