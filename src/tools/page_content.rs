use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use rmcp::ErrorData as McpError;
use serde_json::json;

use crate::clients::mediawiki::WikiApi;
use crate::core::content::Envelope;
use crate::core::tool::{decode_args, schema, Tool, ToolDescriptor, ToolSpec};
use crate::domain::normalize::normalize;
use crate::domain::{PageOutcome, PageRequest, PageSummary};
use crate::infra::config::WikiConfig;

pub const NAME: &str = "get_page_content";

pub fn descriptor(wiki_name: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: NAME,
        title: format!("Get {wiki_name} Wiki Page Content"),
        description: format!("Get the full content of a specific {wiki_name} wiki page"),
        input_schema: schema(json!({
            "type": "object",
            "properties": {
                "page_title": {
                    "type": "string",
                    "description": format!("The exact title of the {wiki_name} wiki page to retrieve")
                }
            },
            "required": ["page_title"]
        })),
        output_schema: Some(schema(json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "The title of the wiki page" },
                "content": { "type": "string", "description": "The full text content of the page (HTML stripped)" },
                "url": { "type": "string", "format": "uri", "description": format!("Direct URL to the page on the {wiki_name} wiki") },
                "word_count": { "type": "integer", "description": "Number of words in the content" }
            },
            "required": ["title", "content", "url", "word_count"]
        }))),
    }
}

pub struct PageContentTool {
    descriptor: ToolDescriptor,
    wiki: Arc<dyn WikiApi>,
    site: WikiConfig,
}

impl PageContentTool {
    pub fn new(site: WikiConfig, wiki: Arc<dyn WikiApi>) -> Self {
        Self {
            descriptor: descriptor(&site.name),
            wiki,
            site,
        }
    }
}

impl ToolSpec for PageContentTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl Tool for PageContentTool {
    async fn call(&self, arguments: JsonObject) -> Result<Envelope, McpError> {
        let input: PageRequest = decode_args(NAME, arguments)?;
        tracing::info!(page_title = %input.page_title, "received get_page_content request");

        let outcome = match self.wiki.page_content(&input.page_title).await {
            Ok(page) => {
                tracing::info!(page_title = %input.page_title, title = %page.title, "get_page_content succeeded");
                let text = normalize(page.default_html());
                PageOutcome::PageContent(PageSummary {
                    url: self.site.page_url(&page.title),
                    title: page.title,
                    content: text.content,
                    word_count: text.word_count,
                })
            }
            Err(e) => {
                tracing::error!(page_title = %input.page_title, error = %e, "get_page_content failed");
                PageOutcome::Error(format!("Error occurred while fetching page content: {e}"))
            }
        };
        Envelope::from_outcome(&outcome)
    }
}
