//! Error types for configuration and the image sources.

use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors from reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from running the runtime image listing command.
#[derive(Debug, Error)]
pub enum CrictlError {
    #[error("no image listing command configured")]
    EmptyCommand,

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("crictl command timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Nonzero exit; `stderr` is already trimmed.
    #[error("Failed to execute crictl command: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Errors from the Harbor REST API.
#[derive(Debug, Error)]
pub enum HarborError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type HarborResult<T> = std::result::Result<T, HarborError>;
