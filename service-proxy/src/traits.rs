use crate::types::{TransportFailure, TransportRequest, TransportResponse};
use std::future::Future;

/// Trait for the network layer a `ServiceProxy` sends its physical attempts through.
///
/// Implementations report any non-2xx response as `TransportFailure::Status`
/// so that classification happens in one place.
pub trait Transport: Send + Sync {
    /// Send a single request and wait for its response or failure
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = std::result::Result<TransportResponse, TransportFailure>> + Send;
}

/// Trait for configuration validation
pub trait ConfigValidator: Send + Sync {
    type Config;

    /// Validate configuration
    fn validate(&self, config: &Self::Config) -> crate::error::Result<()>;
}
