use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Main configuration structure: every backend the gateway talks to
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Backend configurations keyed by service name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
    /// Backoff settings shared by every proxy
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Configuration of one backend. Immutable once a proxy is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base address requests are joined onto, e.g. `http://users:3001/api`
    #[serde(alias = "url")]
    pub base_address: String,
    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries", alias = "retries")]
    pub max_retries: u32,
    /// Headers sent with every request to this backend
    #[serde(default, alias = "headers")]
    pub default_headers: HashMap<String, String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl ServiceConfig {
    pub fn new<S: Into<String>>(base_address: S) -> Self {
        Self {
            base_address: base_address.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            default_headers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

impl GatewayConfig {
    /// Add or replace a service
    #[must_use]
    pub fn service<S: Into<String>>(mut self, name: S, config: ServiceConfig) -> Self {
        self.services.insert(name.into(), config);
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
