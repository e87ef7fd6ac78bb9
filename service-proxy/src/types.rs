use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// One physical request handed to a `Transport`
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// Raw 2xx response returned by a `Transport`
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl TransportResponse {
    /// Create a new transport response
    pub fn new(status: u16, headers: HashMap<String, String>, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Low-level failure surfaced by a `Transport`, before classification
#[derive(Debug, Clone, PartialEq)]
pub enum TransportFailure {
    ConnectionRefused(String),
    HostNotFound(String),
    TimedOut(String),
    /// A response was received but its status was not 2xx
    Status {
        status: u16,
        headers: HashMap<String, String>,
        body: String,
    },
    Other(String),
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionRefused(msg) => write!(f, "connection refused: {}", msg),
            Self::HostNotFound(msg) => write!(f, "host not found: {}", msg),
            Self::TimedOut(msg) => write!(f, "timed out: {}", msg),
            Self::Status { status, .. } => write!(f, "upstream returned status {}", status),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

/// Successful result of a logical proxied call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse<T> {
    pub data: T,
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Wall-clock time since the logical call began, retries included
    pub response_time_ms: u64,
}

/// Per-call overrides of the service configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl RequestOptions {
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        };
        f.write_str(label)
    }
}

/// Outcome of probing one backend's health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub service: String,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
