pub mod loader;
pub mod types;
pub mod validator;

pub use loader::{config_from_lookup, ConfigLoader, DefaultConfigLoader};
pub use types::{GatewayConfig, ServiceConfig, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
pub use validator::ConfigValidatorImpl;
