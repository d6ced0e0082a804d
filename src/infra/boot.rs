use std::net::SocketAddr;

use crate::core::error::GatewayError;
use crate::infra::config::{Config, Mode};
use crate::infra::mcp::{self, WikiServer};

pub async fn run_server(cfg: Config) -> Result<(), GatewayError> {
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        wiki = %cfg.wiki.name,
        api_url = %cfg.wiki.api_url,
        "BOOT wiki-mcp-gateway"
    );

    let server = WikiServer::from_config(cfg.wiki)?;

    match cfg.mode {
        Mode::Stdio => mcp::serve_stdio(server).await?,
        Mode::Http => {
            let app = crate::infra::http_app::build_app(server);
            let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
            tracing::info!(%addr, "listening for streamable HTTP on /mcp");
            axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::WikiConfig;

    #[tokio::test]
    async fn unusable_wiki_name_fails_before_serving() {
        let cfg = Config {
            mode: Mode::Stdio,
            port: 8080,
            wiki: WikiConfig::new("Bad\u{7f}Name", "https://w.example/api.php").unwrap(),
        };
        let err = run_server(cfg).await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("User-Agent"), "{err}");
    }
}
