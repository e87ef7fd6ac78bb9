//! Pure classification of transport failures into `ProxyError`s
//! No retry or presentation concerns - the policy and envelope layers consume the result

use crate::error::ProxyError;
use crate::types::TransportFailure;
use serde_json::Value;

const NETWORK_MARKERS: [&str; 5] = [
    "connection refused",
    "econnrefused",
    "enotfound",
    "dns error",
    "failed to lookup address",
];

const TIMEOUT_MARKERS: [&str; 3] = ["timeout", "timed out", "etimedout"];

/// Trait for failure classification - pure business logic
pub trait ErrorClassifier: Send + Sync {
    /// Label a raw transport failure with a coarse category and public status
    fn classify(&self, failure: &TransportFailure) -> ProxyError;

    /// Pick a human readable message for a non-2xx upstream response
    fn extract_message(&self, status: u16, cause: Option<&Value>) -> String;
}

/// Default implementation of the failure classifier
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifierImpl;

impl ErrorClassifierImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ErrorClassifierImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier for ErrorClassifierImpl {
    fn classify(&self, failure: &TransportFailure) -> ProxyError {
        match failure {
            TransportFailure::ConnectionRefused(msg) | TransportFailure::HostNotFound(msg) => {
                ProxyError::network(format!("Service unavailable: {}", msg))
            }
            TransportFailure::TimedOut(msg) => {
                ProxyError::timeout(format!("Request timed out: {}", msg))
            }
            TransportFailure::Status { status, body, .. } => {
                let cause = parse_body(body);
                let message = self.extract_message(*status, cause.as_ref());
                ProxyError::from_status(*status, message, cause)
            }
            TransportFailure::Other(msg) => {
                let lowered = msg.to_ascii_lowercase();
                if NETWORK_MARKERS.iter().any(|m| lowered.contains(m)) {
                    ProxyError::network(format!("Service unavailable: {}", msg))
                } else if TIMEOUT_MARKERS.iter().any(|m| lowered.contains(m)) {
                    ProxyError::timeout(format!("Request timed out: {}", msg))
                } else {
                    ProxyError::unknown(format!("Upstream request failed: {}", msg))
                }
            }
        }
    }

    fn extract_message(&self, status: u16, cause: Option<&Value>) -> String {
        if let Some(obj) = cause.and_then(Value::as_object) {
            for field in ["message", "error"] {
                if let Some(text) = obj.get(field).and_then(Value::as_str) {
                    if !text.trim().is_empty() {
                        return truncate(text, 200);
                    }
                }
                // {"error": {"message": "..."}} envelopes from other gateways
                if let Some(text) = obj
                    .get(field)
                    .and_then(|v| v.get("message"))
                    .and_then(Value::as_str)
                {
                    if !text.trim().is_empty() {
                        return truncate(text, 200);
                    }
                }
            }
        }

        format!("Upstream returned {}: {}", status, friendly_status_message(status))
    }
}

/// Keep the upstream body as JSON when it is JSON, otherwise as a string
fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

fn friendly_status_message(status: u16) -> &'static str {
    match status {
        400 => "request contains invalid data",
        401 => "authentication required",
        403 => "access denied",
        404 => "resource not found",
        409 => "conflict with current resource state",
        422 => "request could not be processed",
        429 => "rate limit exceeded",
        500 => "internal server error",
        501 => "not implemented",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        505 => "HTTP version not supported",
        _ => "unexpected status",
    }
}
