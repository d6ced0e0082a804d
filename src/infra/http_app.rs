use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::infra::mcp::{self, LocalSessionManager, WikiServer};

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app(server: WikiServer) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = mcp::make_streamable_http_service(server, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}
