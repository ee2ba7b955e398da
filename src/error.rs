/// Unified error types for the I2P DNS gateway
use axum::{
    extract::{
        path::ErrorKind,
        rejection::{PathRejection, QueryRejection},
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures talking to the upstream ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger could not be reached (connect failure, timeout, broken body)
    #[error("Ledger transport error: {0}")]
    Transport(String),

    /// A token could not be obtained, or was still refused after a refresh
    #[error("Ledger authentication failed: {0}")]
    Auth(String),

    /// The ledger was reachable and authenticated but declined the operation
    #[error("Ledger rejected request with status {status}")]
    UpstreamRejected { status: u16, body: Vec<u8> },

    /// The payload could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed client input; `field` names what failed
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Errors from the ledger client
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Startup configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        GatewayError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Path segments that fail to decode are reported against the segment's field
impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        let key = match &rejection {
            PathRejection::FailedToDeserializePathParams(e) => match e.kind() {
                ErrorKind::InvalidUtf8InPathParam { key } => Some(key.clone()),
                ErrorKind::ParseErrorAtKey { key, .. } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        };

        let error = match key.as_deref() {
            Some("address") => GatewayError::validation("address", "b32 address format invalid"),
            Some("domain") => GatewayError::validation("domain", "domain format invalid"),
            _ => GatewayError::Internal(rejection.body_text()),
        };
        if let GatewayError::Validation { field, .. } = &error {
            crate::metrics::record_validation_failure(field);
        }
        error
    }
}

/// The only query parameter is `seq`, so any malformed query is a `seq` error
impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected query string");
        crate::metrics::record_validation_failure("seq");
        GatewayError::validation("seq", "seq must be a single positive integer")
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Convert GatewayError to HTTP response
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_code, message, field) = match &self {
            GatewayError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                message.clone(),
                Some(field.to_string()),
            ),
            GatewayError::RateLimitExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RateLimitExceeded",
                "Rate limit exceeded".to_string(),
                None,
            ),
            GatewayError::Ledger(LedgerError::Transport(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "LedgerUnavailable",
                "could not reach ledger".to_string(),
                None,
            ),
            GatewayError::Ledger(LedgerError::Auth(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "LedgerAuthFailed",
                "ledger refused credentials".to_string(),
                None,
            ),
            GatewayError::Ledger(LedgerError::UpstreamRejected { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "LedgerRejected",
                "ledger rejected write".to_string(),
                None,
            ),
            GatewayError::Ledger(LedgerError::Encoding(_))
            | GatewayError::Config(_)
            | GatewayError::Internal(_)
            | GatewayError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            field,
        });

        let mut response = (status, body).into_response();
        if let GatewayError::RateLimitExceeded { retry_after } = &self {
            // Whole seconds, never zero
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, header::HeaderValue::from(secs.max(1)));
        }
        response
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
