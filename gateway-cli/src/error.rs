use service_proxy::{GatewayError, ProxyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Request failed: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),

    #[error("Unhealthy services: {}", .0.join(", "))]
    Degraded(Vec<String>),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Gateway(err) => err.to_string(),
            Self::Proxy(err) => format!(
                "{} request failed with status {}: {}",
                err.kind,
                err.http_status(),
                err.message
            ),
            Self::JsonParseError(err) => format!("Failed to parse JSON: {err}"),
            Self::AnyhowError(err) => format!("{err:#}"),
            Self::Degraded(services) => {
                format!("Gateway is degraded, unhealthy services: {}", services.join(", "))
            }
            Self::Other(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
