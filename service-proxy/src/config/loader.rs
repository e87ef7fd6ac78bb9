use crate::config::types::{GatewayConfig, ServiceConfig, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
use crate::config::validator::ConfigValidatorImpl;
use crate::error::{GatewayError, Result};
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_DELAY_MS};
use crate::traits::ConfigValidator;
use std::collections::HashMap;
use std::path::Path;

/// Comma separated list of service names, e.g. `users,orders`
pub const SERVICES_ENV: &str = "GATEWAY_SERVICES";

/// Configuration loader trait
pub trait ConfigLoader {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<GatewayConfig>;
    fn load_from_env() -> Result<GatewayConfig>;
}

/// Default configuration loader implementation
pub struct DefaultConfigLoader;

impl ConfigLoader for DefaultConfigLoader {
    /// Load configuration from a TOML file and validate it
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<GatewayConfig> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(GatewayError::ConfigNotFound {
                path: path_ref.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path_ref)?;
        let config: GatewayConfig = toml::from_str(&content)?;

        ConfigValidatorImpl::new().validate_with_context(&config, path_ref.to_string_lossy())?;
        Ok(config)
    }

    /// Load configuration from process environment variables and validate it
    fn load_from_env() -> Result<GatewayConfig> {
        let config = config_from_lookup(|name| std::env::var(name).ok())?;
        ConfigValidatorImpl::new().validate_with_context(&config, "environment")?;
        Ok(config)
    }
}

/// Build a configuration from an arbitrary variable lookup.
///
/// For a service named `users` the variables are `USERS_SERVICE_URL` (required),
/// `USERS_SERVICE_TIMEOUT_MS`, `USERS_SERVICE_RETRIES` and `USERS_SERVICE_HEADERS`
/// (`name=value` pairs separated by commas). Unparseable numbers fall back to defaults.
pub fn config_from_lookup<F>(lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let names: Vec<String> = lookup(SERVICES_ENV)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let mut config = GatewayConfig::default();
    for name in names {
        let prefix = format!("{}_SERVICE", env_prefix(&name));
        let url_var = format!("{}_URL", prefix);
        let base_address = lookup(&url_var).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
            GatewayError::invalid_config(format!(
                "Service '{}' is listed in {} but {} is not set",
                name, SERVICES_ENV, url_var
            ))
        })?;

        let service = ServiceConfig {
            base_address: base_address.trim().to_string(),
            timeout_ms: parse_or(&lookup, &format!("{}_TIMEOUT_MS", prefix), DEFAULT_TIMEOUT_MS),
            max_retries: parse_or(&lookup, &format!("{}_RETRIES", prefix), DEFAULT_MAX_RETRIES),
            default_headers: parse_pairs(&lookup(&format!("{}_HEADERS", prefix)).unwrap_or_default()),
        };
        config.services.insert(name, service);
    }

    config.retry = RetryPolicy {
        base_delay_ms: parse_or(&lookup, "GATEWAY_RETRY_BASE_DELAY_MS", DEFAULT_BASE_DELAY_MS),
        max_delay_ms: parse_or(&lookup, "GATEWAY_RETRY_MAX_DELAY_MS", DEFAULT_MAX_DELAY_MS),
        retry_rate_limited: parse_bool_or(&lookup, "GATEWAY_RETRY_RATE_LIMITED", false),
    };

    Ok(config)
}

/// `user-profile` -> `USER_PROFILE`
fn env_prefix(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_bool_or<F>(lookup: &F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn parse_pairs(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|item| {
            let (k, v) = item.split_once('=')?;
            let key = k.trim();
            let value = v.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

// Convenience functions maintaining the API
impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_from_file(path)
    }

    /// Load configuration from `GATEWAY_SERVICES` and the per-service variables
    pub fn from_env() -> Result<Self> {
        DefaultConfigLoader::load_from_env()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ConfigValidatorImpl::new().validate(self)
    }
}
