//! CLI error types

use provenance_gateway::GatewayError;
use provenance_lifecycle::{ConfigError, ResolveError};
use provenance_types::ParseError;
use thiserror::Error;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
