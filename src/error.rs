use std::path::PathBuf;

use thiserror::Error;

use crate::platform::Platform;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Could not retrieve manifest: {0}")]
    ManifestFetch(#[from] FetchError),

    #[error("Could not validate manifest at {location}: {source}")]
    ManifestSchema {
        location: String,
        #[source]
        source: SchemaError,
    },

    #[error("{0}")]
    PathResolution(#[from] StructuralError),

    #[error("HTTP HEAD request to URL '{url}' failed: {source}")]
    ProbeNetwork {
        url: String,
        #[source]
        source: ProbeError,
    },

    #[error("HTTP HEAD request to URL '{url}' yielded bad response code {status}")]
    ProbeStatus { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Manifest retrieval errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("request to {url} timed out after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },
}

/// Manifest syntax and semantic errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("malformed manifest: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("{} problem(s) found: {}", .problems.len(), .problems.join("; "))]
    Invalid { problems: Vec<String> },
}

/// Errors mapping a manifest path onto a bundle URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path '{path}' is not a relative path which descends into at least one folder")]
    NotRelative { path: String },

    #[error("Bundle base URL '{url}' is not a valid absolute URL: {details}")]
    InvalidBaseUrl { url: String, details: String },
}

/// Problems found while deriving URLs from a manifest, independent of network state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Invalid path for command \"{command}\" on platform {platform}: {source}")]
    InvalidCommandPath {
        command: String,
        platform: Platform,
        #[source]
        source: PathError,
    },

    #[error(
        "Could not get bundle URL for bundle \"{bundle}\" for platform {platform}. (Required for command \"{command}\")"
    )]
    UnknownBundle {
        bundle: String,
        platform: Platform,
        command: String,
    },

    #[error(
        "Could not get JAR URL for platform {platform} (Required for command \"{command}\"): {details}"
    )]
    JarPath {
        command: String,
        platform: Platform,
        details: String,
    },
}

/// Transport-level probe failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("no response within {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("{details}")]
    Transport { details: String },

    #[error("probe task aborted: {details}")]
    Aborted { details: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;
