use thiserror::Error;

use crate::infra::config::ConfigError;

/// Startup and serving failures, surfaced by the binary as a non-zero exit.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("transport failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
