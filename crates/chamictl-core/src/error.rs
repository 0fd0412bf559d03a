//! Error types for chamictl core.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::Envelope;
use crate::service::Service;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("{0}")]
    Other(String),
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("cluster {0} is defined more than once")]
    DuplicateCluster(String),

    #[error("default-cluster {0} does not name a configured cluster")]
    DanglingDefault(String),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("path cannot be empty")]
    EmptyPath,
}

/// Base URI resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("base URI for {service} not found (neither cluster uri nor {service} uri specified)")]
    MissingUri { service: Service },

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("invalid cluster URI {uri:?}: {reason}")]
    InvalidClusterUri { uri: String, reason: String },

    #[error("invalid service URI for {service} {uri:?}: {reason}")]
    InvalidServiceUri {
        service: Service,
        uri: String,
        reason: String,
    },
}

/// Access token resolution and validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("no cluster selected (no --cluster and no default-cluster) and --token not passed")]
    NoCluster,

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("environment variable {var} unset for reading token for cluster {cluster:?}")]
    MissingToken { var: String, cluster: String },

    #[error("failed to parse token: {0}")]
    Malformed(String),

    #[error("token is expired (expired {ago} ago at {at})")]
    Expired { ago: String, at: String },

    #[error("token has no expiration time")]
    NoExpiry,

    #[error("token is not valid yet (nbf is in the future)")]
    NotYetValid,

    #[error("token was issued in the future at {0}")]
    IssuedInFuture(String),
}

/// HTTP dispatch errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request was sent and the backend answered outside the 2xx range.
    #[error("unsuccessful HTTP response from {url}: {}", .envelope.status_line())]
    Unsuccessful { url: String, envelope: Envelope },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to load CA certificate {}: {reason}", path.display())]
    CaCert { path: PathBuf, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl HttpError {
    /// True when the backend rejected the request (as opposed to the request
    /// never reaching it).
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self, HttpError::Unsuccessful { .. })
    }

    /// The response envelope, when there was one.
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            HttpError::Unsuccessful { envelope, .. } => Some(envelope),
            _ => None,
        }
    }
}

/// Payload encoding and decoding errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown data format: {0} (expected json, json-pretty or yaml)")]
    UnknownFormat(String),

    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("failed to read payload {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
