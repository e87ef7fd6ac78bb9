//! Public response envelope and the mapping from proxy failures onto it

use crate::error::{ErrorKind, ProxyError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `{ success, data?, error?, meta?, timestamp }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: None,
            timestamp: now(),
        }
    }

    pub fn success_with_meta(data: T, meta: Value) -> Self {
        Self {
            meta: Some(meta),
            ..Self::success(data)
        }
    }

    /// Page of results with `{page, limit, total, totalPages}` metadata
    pub fn paginated(data: T, page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self::success_with_meta(
            data,
            json!({
                "page": page,
                "limit": limit,
                "total": total,
                "totalPages": total_pages,
            }),
        )
    }

    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta: None,
            timestamp: now(),
        }
    }
}

impl ErrorBody {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&ProxyError> for ErrorBody {
    fn from(error: &ProxyError) -> Self {
        let body = ErrorBody::new(error_code(error), error.message.clone());
        match &error.cause {
            Some(cause) => body.with_details(cause.clone()),
            None => body,
        }
    }
}

impl<T> From<&ProxyError> for ApiResponse<T> {
    fn from(error: &ProxyError) -> Self {
        Self::failure(ErrorBody::from(error))
    }
}

/// Public error code for a classified failure
pub fn error_code(error: &ProxyError) -> &'static str {
    match error.kind {
        ErrorKind::Network => "SERVICE_UNAVAILABLE",
        ErrorKind::Timeout => "GATEWAY_TIMEOUT",
        ErrorKind::ServerError => "UPSTREAM_ERROR",
        ErrorKind::Unknown => "BAD_GATEWAY",
        ErrorKind::ClientError => match error.status {
            Some(400) => "BAD_REQUEST",
            Some(401) => "UNAUTHORIZED",
            Some(403) => "FORBIDDEN",
            Some(404) => "NOT_FOUND",
            Some(409) => "CONFLICT",
            Some(422) => "VALIDATION_ERROR",
            Some(429) => "RATE_LIMITED",
            _ => "CLIENT_ERROR",
        },
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
