use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Result of a single proxied call
pub type ProxyResult<T> = std::result::Result<T, ProxyError>;

/// Errors raised outside of a single proxied call: configuration, registry lookups
/// and batch validation. Failures of the call itself are `ProxyError`s.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service '{name}' is not configured")]
    UnknownService { name: String },

    #[error("Duplicate aggregation key '{key}'")]
    DuplicateKey { key: String },

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl GatewayError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new unknown service error
    pub fn unknown_service<S: Into<String>>(name: S) -> Self {
        Self::UnknownService { name: name.into() }
    }
}

/// Coarse failure category; the only input the retry policy looks at besides the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    Timeout,
    ClientError,
    ServerError,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ClientError => "clientError",
            ErrorKind::ServerError => "serverError",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A classified failure of one logical proxied call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProxyError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    /// Upstream response body (or other opaque context) when one was received
    pub cause: Option<Value>,
}

impl ProxyError {
    fn build(kind: ErrorKind, message: String, status: Option<u16>, cause: Option<Value>) -> Self {
        Self {
            kind,
            message,
            status,
            cause,
        }
    }

    /// Backend unreachable (connection refused, host not found)
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::build(ErrorKind::Network, message.into(), Some(503), None)
    }

    /// No response within the time budget
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::build(ErrorKind::Timeout, message.into(), Some(504), None)
    }

    pub fn client_error<S: Into<String>>(status: u16, message: S, cause: Option<Value>) -> Self {
        Self::build(ErrorKind::ClientError, message.into(), Some(status), cause)
    }

    pub fn server_error<S: Into<String>>(status: u16, message: S, cause: Option<Value>) -> Self {
        Self::build(ErrorKind::ServerError, message.into(), Some(status), cause)
    }

    /// Anything that could not be classified further
    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::build(ErrorKind::Unknown, message.into(), Some(502), None)
    }

    /// Classify a received response status: 4xx is a client error, everything else a server error.
    pub fn from_status<S: Into<String>>(status: u16, message: S, cause: Option<Value>) -> Self {
        if (400..500).contains(&status) {
            Self::client_error(status, message, cause)
        } else {
            Self::server_error(status, message, cause)
        }
    }

    /// Status a caller-facing layer should answer with
    pub fn http_status(&self) -> u16 {
        self.status.unwrap_or(502)
    }

    pub fn is_client_error(&self) -> bool {
        self.kind == ErrorKind::ClientError
    }
}
