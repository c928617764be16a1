//! Error types for fleet operations
//!
//! Every per-project failure is converted into a field of the report at
//! its call site. Only `ReportError` and `ConfigError` abort a run.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of an outbound HTTP call
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Failure of the live endpoint lookup
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to run discovery command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("discovery timed out after {0:?}")]
    Timeout(Duration),

    #[error("discovery command exited with {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("discovery returned no URL")]
    Empty,
}

/// Failure of the billing collaborator
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("invalid billing credentials: {0}")]
    Credentials(String),

    #[error("token exchange failed: {0}")]
    Token(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("billing API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode billing response: {0}")]
    Decode(String),
}

/// Failure to persist a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Invalid configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}
