use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::http::ReqwestTransport;
use crate::proxy::ServiceProxy;
use crate::traits::Transport;
use crate::types::HealthReport;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Rollup over every backend: degraded as soon as one is unhealthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Healthy,
    Degraded,
}

impl std::fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
        })
    }
}

/// Health of every backend in a registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayHealth {
    pub status: GatewayStatus,
    pub services: BTreeMap<String, HealthReport>,
}

impl GatewayHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == GatewayStatus::Healthy
    }

    pub fn unhealthy_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|(_, report)| !report.is_healthy())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Named set of proxies, built once at startup and handed to whoever needs a backend
pub struct ServiceRegistry<T = ReqwestTransport> {
    proxies: BTreeMap<String, ServiceProxy<T>>,
}

impl ServiceRegistry<ReqwestTransport> {
    /// One proxy, with its own transport, per configured service
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::new();
        for (name, service) in &config.services {
            let proxy = ServiceProxy::new(name.clone(), service.clone())?.with_retry_policy(config.retry);
            registry.insert(proxy);
        }

        info!(services = registry.len(), "service registry ready");
        Ok(registry)
    }
}

impl<T: Transport> ServiceRegistry<T> {
    pub fn new() -> Self {
        Self {
            proxies: BTreeMap::new(),
        }
    }

    /// Add a proxy under its own name, replacing any previous one
    pub fn insert(&mut self, proxy: ServiceProxy<T>) -> Option<ServiceProxy<T>> {
        self.proxies.insert(proxy.name().to_string(), proxy)
    }

    pub fn get(&self, name: &str) -> Result<&ServiceProxy<T>> {
        self.proxies
            .get(name)
            .ok_or_else(|| GatewayError::unknown_service(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.proxies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Probe every backend concurrently
    pub async fn health_all(&self) -> GatewayHealth {
        let reports = join_all(self.proxies.values().map(|proxy| proxy.health_check())).await;

        let services: BTreeMap<String, HealthReport> = reports
            .into_iter()
            .map(|report| (report.service.clone(), report))
            .collect();

        let status = if services.values().all(HealthReport::is_healthy) {
            GatewayStatus::Healthy
        } else {
            GatewayStatus::Degraded
        };

        GatewayHealth { status, services }
    }
}

impl<T: Transport> Default for ServiceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
