use crate::analysis::{ErrorClassifier, ErrorClassifierImpl};
use crate::config::{ConfigValidatorImpl, ServiceConfig};
use crate::error::{GatewayError, ProxyError, ProxyResult, Result};
use crate::http::{ReqwestTransport, RequestBuilderImpl};
use crate::retry::RetryPolicy;
use crate::traits::Transport;
use crate::types::{
    HealthReport, HealthStatus, ProxyResponse, RequestOptions, TransportResponse,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const HEALTH_PATH: &str = "/health";
pub const HEALTH_TIMEOUT_MS: u64 = 5_000;

/// Client-side handle on one backend: its address, timeout, retry budget and headers.
///
/// A proxy holds no per-call state; concurrent calls on the same proxy are independent.
#[derive(Clone)]
pub struct ServiceProxy<T = ReqwestTransport> {
    name: String,
    config: ServiceConfig,
    retry: RetryPolicy,
    transport: T,
    request_builder: RequestBuilderImpl,
    classifier: ErrorClassifierImpl,
}

impl ServiceProxy<ReqwestTransport> {
    /// Create a proxy with its own `reqwest` transport
    pub fn new<S: Into<String>>(name: S, config: ServiceConfig) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(name, config, transport)
    }
}

impl<T: Transport> ServiceProxy<T> {
    /// Create a proxy that sends through the given transport
    pub fn with_transport<S: Into<String>>(name: S, config: ServiceConfig, transport: T) -> Result<Self> {
        let name = name.into();
        ConfigValidatorImpl::new()
            .validate_service(&name, &config)
            .map_err(GatewayError::invalid_config)?;

        let request_builder = RequestBuilderImpl::new(&name, &config);
        Ok(Self {
            name,
            config,
            retry: RetryPolicy::default(),
            transport,
            request_builder,
            classifier: ErrorClassifierImpl::new(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&HashMap<String, String>>,
        options: RequestOptions,
    ) -> ProxyResult<ProxyResponse<R>> {
        self.request(Method::GET, path, None, params, options).await
    }

    pub async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> ProxyResult<ProxyResponse<R>> {
        self.request(Method::POST, path, body, None, options).await
    }

    pub async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> ProxyResult<ProxyResponse<R>> {
        self.request(Method::PUT, path, body, None, options).await
    }

    pub async fn patch<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> ProxyResult<ProxyResponse<R>> {
        self.request(Method::PATCH, path, body, None, options).await
    }

    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&HashMap<String, String>>,
        options: RequestOptions,
    ) -> ProxyResult<ProxyResponse<R>> {
        self.request(Method::DELETE, path, None, params, options).await
    }

    /// Execute one logical call, retrying transient failures per the retry policy.
    ///
    /// Attempts are strictly sequential. Retried POST/PUT/PATCH calls may repeat their
    /// side effects on the backend; no idempotency key is sent.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: Option<&HashMap<String, String>>,
        options: RequestOptions,
    ) -> ProxyResult<ProxyResponse<R>> {
        let started = Instant::now();
        let timeout_ms = options
            .timeout_ms
            .filter(|ms| *ms > 0)
            .unwrap_or(self.config.timeout_ms);
        let timeout = Duration::from_millis(timeout_ms);
        let max_retries = options.max_retries.unwrap_or(self.config.max_retries);

        let mut attempt: u32 = 1;
        loop {
            let request =
                self.request_builder
                    .build_request(method.clone(), path, body, params, timeout);
            debug!(
                service = %self.name,
                method = %method,
                path,
                attempt,
                timeout_ms,
                "sending request"
            );

            let failure = match self.transport.send(request).await {
                Ok(response) => return self.decode(response, started),
                Err(failure) => failure,
            };

            let error = self.classifier.classify(&failure);
            if !self.retry.should_retry(&error, attempt, max_retries) {
                debug!(
                    service = %self.name,
                    method = %method,
                    path,
                    attempt,
                    status = ?error.status,
                    classification = %error.kind,
                    "request failed"
                );
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            warn!(
                service = %self.name,
                method = %method,
                path,
                attempt,
                status = ?error.status,
                classification = %error.kind,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Probe `GET /health` once with a short fixed timeout. Never fails.
    pub async fn health_check(&self) -> HealthReport {
        let started = Instant::now();
        let request = self.request_builder.build_request(
            Method::GET,
            HEALTH_PATH,
            None,
            None,
            Duration::from_millis(HEALTH_TIMEOUT_MS),
        );

        let result = self.transport.send(request).await;
        let response_time_ms = elapsed_ms(started);

        let report = match result {
            Ok(_) => HealthReport {
                service: self.name.clone(),
                status: HealthStatus::Healthy,
                response_time_ms,
                error: None,
            },
            Err(failure) => HealthReport {
                service: self.name.clone(),
                status: HealthStatus::Unhealthy,
                response_time_ms,
                error: Some(self.classifier.classify(&failure).message),
            },
        };

        debug!(
            service = %self.name,
            status = %report.status,
            response_time_ms,
            "health check completed"
        );
        report
    }

    fn decode<R: DeserializeOwned>(
        &self,
        response: TransportResponse,
        started: Instant,
    ) -> ProxyResult<ProxyResponse<R>> {
        let text = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };

        let data = serde_json::from_str::<R>(text).map_err(|e| {
            ProxyError::unknown(format!(
                "Failed to decode response from {}: {}",
                self.name, e
            ))
        })?;

        Ok(ProxyResponse {
            data,
            status: response.status,
            headers: response.headers,
            response_time_ms: elapsed_ms(started),
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
