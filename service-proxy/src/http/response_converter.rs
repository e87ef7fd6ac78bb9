use crate::types::{TransportFailure, TransportResponse};
use reqwest::Response;
use std::collections::HashMap;

const DNS_MARKERS: [&str; 4] = [
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
];

/// Turns `reqwest` results into transport responses and failures
#[derive(Clone)]
pub struct ResponseConverterImpl;

impl ResponseConverterImpl {
    /// Create a new response converter
    pub fn new() -> Self {
        Self
    }

    /// Read a response; non-2xx statuses become `TransportFailure::Status`
    pub async fn convert_response(
        &self,
        response: Response,
    ) -> Result<TransportResponse, TransportFailure> {
        let status = response.status().as_u16();

        // Extract headers
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.to_string(), value_str.to_string());
            }
        }

        // Extract body
        let body = response.text().await.map_err(|e| self.convert_error(&e))?;

        if (200..300).contains(&status) {
            Ok(TransportResponse::new(status, headers, body))
        } else {
            Err(TransportFailure::Status {
                status,
                headers,
                body,
            })
        }
    }

    /// Map a `reqwest` error onto the transport failure taxonomy
    pub fn convert_error(&self, error: &reqwest::Error) -> TransportFailure {
        let description = error_chain(error);

        if error.is_timeout() {
            return TransportFailure::TimedOut(description);
        }

        if error.is_connect() {
            let lowered = description.to_ascii_lowercase();
            if DNS_MARKERS.iter().any(|m| lowered.contains(m)) {
                return TransportFailure::HostNotFound(description);
            }
            return TransportFailure::ConnectionRefused(description);
        }

        TransportFailure::Other(description)
    }
}

impl Default for ResponseConverterImpl {
    fn default() -> Self {
        Self::new()
    }
}

/// Join an error and all of its sources into one line, skipping repeated messages
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !parts.contains(&text) {
            parts.push(text);
        }
        source = inner.source();
    }
    parts.join(": ")
}
