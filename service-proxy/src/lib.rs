//! Service Proxy - backend access layer for API gateways
//!
//! Wraps each backend service in a `ServiceProxy` that retries transient failures
//! with exponential backoff, classifies errors for the caller, and can fan out
//! GET requests across several backends while tolerating partial failure.

// Core modules
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Main functionality modules
pub mod analysis;
pub mod execution;
pub mod http;
pub mod proxy;
pub mod registry;
pub mod response;
pub mod retry;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use analysis::{ErrorClassifier, ErrorClassifierImpl};
pub use config::{GatewayConfig, ServiceConfig};
pub use error::{ErrorKind, GatewayError, ProxyError, ProxyResult, Result};
pub use execution::{aggregate, enrich, AggregationRequest, AggregationResult};
pub use http::ReqwestTransport;
pub use proxy::{ServiceProxy, HEALTH_PATH, HEALTH_TIMEOUT_MS};
pub use registry::{GatewayHealth, GatewayStatus, ServiceRegistry};
pub use response::{ApiResponse, ErrorBody};
pub use retry::RetryPolicy;
pub use traits::Transport;
pub use reqwest::Method;
pub use types::{
    HealthReport, HealthStatus, ProxyResponse, RequestOptions, TransportFailure, TransportRequest,
    TransportResponse,
};
