use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_WIKI_NAME: &str = "WIKI_NAME";
pub const ENV_API_URL: &str = "WIKI_API_URL";
pub const ENV_SITE_URL: &str = "WIKI_SITE_URL";
pub const ENV_MODE: &str = "MODE";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CONFIG_FILE: &str = "WIKI_MCP_CONFIG";

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(&'static str),
    #[error("{key} is not a usable wiki URL: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
    #[error("invalid MODE: {0}. Must be 'stdio' or 'http'")]
    InvalidMode(String),
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("cannot load config file {path}: {reason}")]
    File { path: String, reason: String },
    #[error("wiki name cannot be sent as a User-Agent: {0}")]
    InvalidHeader(String),
    #[error("http client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Stdio,
    Http,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Mode::Stdio),
            "http" | "server" => Ok(Mode::Http),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Stdio => f.write_str("stdio"),
            Mode::Http => f.write_str("http"),
        }
    }
}

/// Raw, unvalidated settings. Doubles as the TOML file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub wiki_name: Option<String>,
    pub api_url: Option<String>,
    pub site_url: Option<String>,
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "port_value")]
    pub port: Option<String>,
}

/// TOML ports may be written as `port = 7000` or `port = "7000"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Num(u16),
    Text(String),
}

fn port_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<PortValue>::deserialize(deserializer)?.map(|value| match value {
        PortValue::Num(port) => port.to_string(),
        PortValue::Text(raw) => raw,
    }))
}

impl Settings {
    pub fn from_toml_str(path: &str, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(path, &raw)
    }

    /// Fills every unset value from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            wiki_name: self.wiki_name.or(fallback.wiki_name),
            api_url: self.api_url.or(fallback.api_url),
            site_url: self.site_url.or(fallback.site_url),
            mode: self.mode.or(fallback.mode),
            port: self.port.or(fallback.port),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_wiki_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl { key, reason };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}

/// Validated settings the wiki client and tool descriptors are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiConfig {
    pub name: String,
    pub api_url: Url,
    pub site_url: Option<Url>,
    pub app_version: String,
}

impl WikiConfig {
    pub fn new(name: impl Into<String>, api_url: &str) -> Result<Self, ConfigError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::Missing(ENV_WIKI_NAME));
        }
        Ok(Self {
            name,
            api_url: parse_wiki_url(ENV_API_URL, api_url)?,
            site_url: None,
            app_version: APP_VERSION.to_string(),
        })
    }

    pub fn with_site_url(mut self, site_url: &str) -> Result<Self, ConfigError> {
        self.site_url = Some(parse_wiki_url(ENV_SITE_URL, site_url)?);
        Ok(self)
    }

    pub fn user_agent(&self) -> String {
        format!("{} MCP/{}", self.name, self.app_version)
    }

    /// Human-facing page link: `<scheme>://<host>/<Title_With_Underscores>`.
    pub fn page_url(&self, title: &str) -> String {
        let base = self.site_url.as_ref().unwrap_or(&self.api_url);
        format!(
            "{}://{}/{}",
            base.scheme(),
            base.host_str().unwrap_or_default(),
            title.replace(' ', "_")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub port: u16,
    pub wiki: WikiConfig,
}

impl Config {
    /// Values already in `settings` win; gaps are filled from the TOML `file`.
    pub fn load(settings: Settings, file: Option<&str>) -> Result<Self, ConfigError> {
        let settings = match file {
            Some(path) => settings.or(Settings::from_toml_file(path)?),
            None => settings,
        };
        Self::from_settings(settings)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let name = non_blank(settings.wiki_name).ok_or(ConfigError::Missing(ENV_WIKI_NAME))?;
        let api_url = non_blank(settings.api_url).ok_or(ConfigError::Missing(ENV_API_URL))?;
        let mut wiki = WikiConfig::new(name, &api_url)?;
        if let Some(site_url) = non_blank(settings.site_url) {
            wiki = wiki.with_site_url(&site_url)?;
        }
        let mode = match non_blank(settings.mode) {
            Some(raw) => raw.parse()?,
            None => Mode::default(),
        };
        let port = match non_blank(settings.port) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        Ok(Self { mode, port, wiki })
    }
}
