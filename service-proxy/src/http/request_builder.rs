use crate::config::ServiceConfig;
use crate::types::TransportRequest;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const REQUEST_TIMESTAMP_HEADER: &str = "x-request-timestamp";

/// Builds the physical requests a proxy sends to its backend
#[derive(Debug, Clone)]
pub struct RequestBuilderImpl {
    service_name: String,
    base_address: String,
    default_headers: HashMap<String, String>,
}

impl RequestBuilderImpl {
    pub fn new(service_name: &str, config: &ServiceConfig) -> Self {
        Self {
            service_name: service_name.to_string(),
            base_address: config.base_address.trim_end_matches('/').to_string(),
            default_headers: config.default_headers.clone(),
        }
    }

    /// Build one attempt. Every call stamps a fresh correlation id.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: Option<&HashMap<String, String>>,
        timeout: Duration,
    ) -> TransportRequest {
        let mut query: Vec<(String, String)> = params
            .map(|p| p.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        // Stable order keeps URLs reproducible in logs
        query.sort();

        let mut headers = self.default_headers.clone();
        // Header names are case-insensitive on the wire; a configured id must not ride along
        headers.retain(|name, _| !is_correlation_header(name));
        headers.insert(REQUEST_ID_HEADER.to_string(), self.request_id());
        headers.insert(
            REQUEST_TIMESTAMP_HEADER.to_string(),
            chrono::Utc::now().to_rfc3339(),
        );

        TransportRequest {
            method,
            url: self.url_for(path),
            query,
            headers,
            body: body.cloned(),
            timeout,
        }
    }

    /// Join `path` onto the base address with exactly one slash between them
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_address.clone();
        }
        format!("{}/{}", self.base_address, path.trim_start_matches('/'))
    }

    /// `{service}-{epoch millis}-{9 random hex chars}`
    pub fn request_id(&self) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}",
            self.service_name,
            chrono::Utc::now().timestamp_millis(),
            &random[..9]
        )
    }
}

fn is_correlation_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(REQUEST_ID_HEADER) || name.eq_ignore_ascii_case(REQUEST_TIMESTAMP_HEADER)
}
