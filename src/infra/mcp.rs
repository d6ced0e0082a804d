//! MCP server integration (stdio + Streamable HTTP) for the wiki tools.
//!
//! - Advertises `search_wiki` and `get_page_content` from the tool registry
//! - Routes `tools/call` to the matching handler; business failures come back
//!   as a `{"error": ...}` payload, undecodable arguments as `invalid_params`
//! - Connects to any `AsyncRead`/`AsyncWrite` pair (stdin/stdout in production)

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RunningService},
    transport::streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService},
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use tokio::io::{AsyncRead, AsyncWrite};

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;

use crate::clients::mediawiki::{MediaWikiClient, WikiApi};
use crate::core::error::GatewayError;
use crate::infra::config::WikiConfig;
use crate::tools::registry::{build_registry, ToolRegistry};

/// A running server bound to its transport.
pub type ServingWiki = RunningService<RoleServer, WikiServer>;

/// The MCP server handler. Cheap to clone; every clone shares the registry
/// and the upstream connection pool.
#[derive(Clone)]
pub struct WikiServer {
    site: Arc<WikiConfig>,
    registry: ToolRegistry,
}

impl WikiServer {
    pub fn new(site: WikiConfig, wiki: Arc<dyn WikiApi>) -> Self {
        let registry = build_registry(&site, wiki);
        Self {
            site: Arc::new(site),
            registry,
        }
    }

    /// Builds the MediaWiki client eagerly so bad configuration fails before serving.
    pub fn from_config(site: WikiConfig) -> Result<Self, GatewayError> {
        let client = MediaWikiClient::new(&site)?;
        Ok(Self::new(site, Arc::new(client)))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Connects to the transport and returns once the initialize handshake
    /// has completed. Wait on the returned service to keep serving.
    pub async fn start<R, W>(self, reader: R, writer: W) -> Result<ServingWiki, GatewayError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        tracing::info!(wiki = %self.site.name, tools = ?self.registry.names(), "starting wiki MCP server");
        let running = self
            .serve((reader, writer))
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        tracing::info!("wiki MCP server connected and ready to handle requests");
        Ok(running)
    }
}

impl ServerHandler for WikiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: format!("{} MCP Server", self.site.name),
                version: self.site.app_version.clone(),
                ..Default::default()
            },
            instructions: Some(format!(
                "Use search_wiki to find {name} wiki pages, then get_page_content with an exact page title to read one.",
                name = self.site.name
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.registry.list()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let CallToolRequestParam { name, arguments } = request;
        tracing::debug!(tool = %name, "tools/call received");
        self.registry
            .call(&name, arguments.unwrap_or_default())
            .await
    }
}

/// Run the server over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(server: WikiServer) -> Result<(), GatewayError> {
    let running = server.start(tokio::io::stdin(), tokio::io::stdout()).await?;
    let reason = running
        .waiting()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    tracing::info!(reason = ?reason, "stdio transport closed");
    Ok(())
}

pub fn make_streamable_http_service(
    server: WikiServer,
    session_mgr: Arc<LocalSessionManager>,
) -> StreamableHttpService<WikiServer, LocalSessionManager> {
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "StreamableHttpServerConfig");
    StreamableHttpService::new(move || Ok(server.clone()), session_mgr, cfg)
}
