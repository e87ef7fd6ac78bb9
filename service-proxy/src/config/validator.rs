use crate::config::types::{GatewayConfig, ServiceConfig};
use crate::error::{GatewayError, Result};
use crate::traits::ConfigValidator;
use reqwest::header::{HeaderName, HeaderValue};
use std::fmt::Display;
use url::Url;

/// Configuration validator implementation
pub struct ConfigValidatorImpl;

impl ConfigValidator for ConfigValidatorImpl {
    type Config = GatewayConfig;

    fn validate(&self, config: &GatewayConfig) -> Result<()> {
        self.validate_with_context(config, "configuration")
    }
}

impl ConfigValidatorImpl {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validation with the config source named in error messages
    pub fn validate_with_context<C: Display>(&self, config: &GatewayConfig, source: C) -> Result<()> {
        if config.services.is_empty() {
            return Err(GatewayError::invalid_config(format!(
                "No services configured in {}. Add at least one [services.<name>] entry.",
                source
            )));
        }

        for (name, service) in &config.services {
            self.validate_service(name, service)
                .map_err(|message| GatewayError::invalid_config(format!("{} ({})", message, source)))?;
        }

        if config.retry.max_delay_ms < config.retry.base_delay_ms {
            return Err(GatewayError::invalid_config(format!(
                "Retry max_delay_ms ({}) is lower than base_delay_ms ({}) in {}",
                config.retry.max_delay_ms, config.retry.base_delay_ms, source
            )));
        }

        Ok(())
    }

    /// Check one backend; the error is a plain message so callers can add context
    pub fn validate_service(&self, name: &str, service: &ServiceConfig) -> std::result::Result<(), String> {
        if name.trim().is_empty() {
            return Err("Service name must not be empty".to_string());
        }

        let url = Url::parse(&service.base_address).map_err(|e| {
            format!(
                "Service '{}' has an invalid base address '{}': {}",
                name, service.base_address, e
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Service '{}' base address must use http or https, got '{}'",
                name,
                url.scheme()
            ));
        }

        if service.timeout_ms == 0 {
            return Err(format!("Service '{}' timeout_ms must be greater than 0", name));
        }

        for (header, value) in &service.default_headers {
            if HeaderName::from_bytes(header.as_bytes()).is_err() {
                return Err(format!("Service '{}' has an invalid header name '{}'", name, header));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(format!(
                    "Service '{}' has an invalid value for header '{}'",
                    name, header
                ));
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidatorImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;

    fn config_with(service: ServiceConfig) -> GatewayConfig {
        GatewayConfig::default().service("users", service)
    }

    #[test]
    fn test_valid_config() {
        let config = config_with(ServiceConfig::new("https://users.internal/api"));
        assert!(ConfigValidatorImpl::new().validate(&config).is_ok());
    }

    #[test]
    fn test_empty_config_is_rejected() {
        let err = ConfigValidatorImpl::new()
            .validate(&GatewayConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("No services configured"));
    }

    #[test]
    fn test_bad_base_addresses() {
        let validator = ConfigValidatorImpl::new();
        assert!(validator.validate(&config_with(ServiceConfig::new("users:3001"))).is_err());
        assert!(validator.validate(&config_with(ServiceConfig::new("ftp://users"))).is_err());
        assert!(validator.validate(&config_with(ServiceConfig::new("not a url"))).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = config_with(ServiceConfig::new("http://users:3001").with_timeout_ms(0));
        let err = ConfigValidatorImpl::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_invalid_headers() {
        let validator = ConfigValidatorImpl::new();
        let bad_name = config_with(ServiceConfig::new("http://users").with_header("Bad Header", "x"));
        assert!(validator.validate(&bad_name).is_err());

        let bad_value = config_with(ServiceConfig::new("http://users").with_header("X-Key", "a\nb"));
        assert!(validator.validate(&bad_value).is_err());
    }

    #[test]
    fn test_inverted_retry_delays() {
        let config = config_with(ServiceConfig::new("http://users"))
            .retry_policy(RetryPolicy::new(2_000, 500));
        let err = ConfigValidatorImpl::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_delay_ms"));
    }
}
