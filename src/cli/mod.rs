use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use crate::infra::config::{
    Config, ConfigError, Settings, ENV_API_URL, ENV_CONFIG_FILE, ENV_MODE, ENV_PORT, ENV_SITE_URL,
    ENV_WIKI_NAME,
};
use crate::infra::mcp::WikiServer;

#[derive(Parser, Debug)]
#[command(name = "wiki-mcp-gateway")]
#[command(about = "MCP server exposing MediaWiki search and page content")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub wiki: WikiArgs,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Connection settings; each flag falls back to its environment variable,
/// then to the TOML file given by `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct WikiArgs {
    /// Display name of the wiki, e.g. "Stardew Valley"
    #[arg(long, env = ENV_WIKI_NAME, global = true)]
    pub wiki_name: Option<String>,
    /// MediaWiki api.php endpoint
    #[arg(long, env = ENV_API_URL, global = true)]
    pub api_url: Option<String>,
    /// Base used for page links instead of the API host
    #[arg(long, env = ENV_SITE_URL, global = true)]
    pub site_url: Option<String>,
    /// Transport: stdio or http
    #[arg(long, env = ENV_MODE, global = true)]
    pub mode: Option<String>,
    /// Listen port for http mode
    #[arg(long, env = ENV_PORT, global = true)]
    pub port: Option<String>,
    /// TOML file with the same keys
    #[arg(long, env = ENV_CONFIG_FILE, global = true)]
    pub config: Option<String>,
}

impl WikiArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            wiki_name: self.wiki_name.clone(),
            api_url: self.api_url.clone(),
            site_url: self.site_url.clone(),
            mode: self.mode.clone(),
            port: self.port.clone(),
        }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let file = self.config.as_deref().filter(|path| !path.trim().is_empty());
        Config::load(self.settings(), file)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server (default)
    Serve,
    /// Validate configuration without starting the server
    CheckConfig,
    /// Run search_wiki once and print the result
    Search {
        query: String,
        #[arg(short, long, default_value_t = crate::domain::DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Run get_page_content once and print the result
    Page { title: String },
    /// Health check a server running in http mode
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.wiki, cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(wiki: WikiArgs, command: Commands) -> ExitCode {
    match command {
        Commands::Serve => {
            let cfg = match wiki.load() {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!(error = %e, "configuration error");
                    eprintln!("❌ {e}");
                    return ExitCode::FAILURE;
                }
            };
            match crate::infra::boot::run_server(cfg).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "server stopped with error");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::CheckConfig => match wiki.load() {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("  Wiki: {}", cfg.wiki.name);
                println!("  API: {}", cfg.wiki.api_url);
                println!("  Page links: {}", cfg.wiki.page_url("Example_Page"));
                println!("  Mode: {}", cfg.mode);
                println!("  Port: {}", cfg.port);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Search { query, limit } => {
            let args = serde_json::json!({ "query": query, "limit": limit });
            print_call(&wiki, crate::tools::search::NAME, args).await
        }
        Commands::Page { title } => {
            let args = serde_json::json!({ "page_title": title });
            print_call(&wiki, crate::tools::page_content::NAME, args).await
        }
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Invokes one tool the same way `tools/call` would and prints its payload.
async fn print_call(wiki: &WikiArgs, tool: &str, args: serde_json::Value) -> ExitCode {
    match call_tool(wiki, tool, args).await {
        Ok(payload) => {
            println!("{payload}");
            if payload.get("error").is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn call_tool(
    wiki: &WikiArgs,
    tool: &str,
    args: serde_json::Value,
) -> anyhow::Result<serde_json::Value> {
    let cfg = wiki.load()?;
    let server = WikiServer::from_config(cfg.wiki)?;
    let arguments = match args {
        serde_json::Value::Object(map) => map,
        _ => anyhow::bail!("tool arguments must be an object"),
    };
    let result = server
        .registry()
        .call(tool, arguments)
        .await
        .map_err(|e| anyhow::anyhow!(e.message))?;
    let value = serde_json::to_value(&result)?;
    let text = value["content"][0]["text"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("tool returned no text content"))?;
    Ok(serde_json::from_str(text)?)
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}
