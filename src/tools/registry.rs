use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool as McpTool};
use rmcp::ErrorData as McpError;

use crate::clients::mediawiki::WikiApi;
use crate::core::tool::Tool;
use crate::infra::config::WikiConfig;
use crate::tools::page_content::PageContentTool;
use crate::tools::search::SearchTool;

/// Ordered `{descriptor, handler}` pairs served by the gateway.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<Vec<Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn with_tools<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        Self {
            tools: Arc::new(iter.into_iter().collect()),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn list(&self) -> Vec<McpTool> {
        self.tools.iter().map(|t| t.descriptor().to_mcp()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub async fn call(&self, name: &str, args: JsonObject) -> Result<CallToolResult, McpError> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::invalid_params(format!("unknown tool: {name}"), None))?;
        let envelope = tool.call(args).await?;
        Ok(envelope.into_call_result())
    }
}

/// The two wiki tools, both backed by `wiki`.
pub fn build_registry(site: &WikiConfig, wiki: Arc<dyn WikiApi>) -> ToolRegistry {
    ToolRegistry::with_tools([
        Arc::new(SearchTool::new(&site.name, wiki.clone())) as Arc<dyn Tool>,
        Arc::new(PageContentTool::new(site.clone(), wiki)) as Arc<dyn Tool>,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WikiPage;
    use crate::tools::fakes::FakeWiki;
    use serde_json::{json, Value};

    fn registry(fake: FakeWiki) -> ToolRegistry {
        let site = WikiConfig::new("Stardew Valley", "https://stardewvalleywiki.com/mediawiki/api.php").unwrap();
        build_registry(&site, Arc::new(fake))
    }

    fn payload(result: &CallToolResult) -> Value {
        let v = serde_json::to_value(result).unwrap();
        serde_json::from_str(v["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    #[test]
    fn registers_exactly_the_two_wiki_tools() {
        let reg = registry(FakeWiki::default());
        assert_eq!(reg.names(), vec!["search_wiki", "get_page_content"]);
        let listed = reg.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "search_wiki");
    }

    #[tokio::test]
    async fn routes_calls_by_name() {
        let reg = registry(FakeWiki::default().with_pages(vec![WikiPage::titled("Abigail")]));
        let out = reg
            .call("search_wiki", json!({"query": "abi"}).as_object().unwrap().clone())
            .await
            .unwrap();
        assert_eq!(payload(&out)["search_results"]["results"][0]["title"], "Abigail");
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let reg = registry(FakeWiki::default());
        let err = reg.call("does.not.exist", JsonObject::new()).await.err().unwrap();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("unknown tool: does.not.exist"));
    }

    #[tokio::test]
    async fn business_failure_is_still_a_successful_call() {
        let reg = registry(FakeWiki::failing("boom"));
        let out = reg
            .call("get_page_content", json!({"page_title": "X"}).as_object().unwrap().clone())
            .await
            .unwrap();
        assert_eq!(
            payload(&out),
            json!({"error": "Error occurred while fetching page content: boom"})
        );
    }
}
