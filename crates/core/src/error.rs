use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Uniform error taxonomy used across every subsystem.
///
/// Each kind maps to exactly one wire status code at the HTTP boundary; see
/// `ErrorKind::status_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    AuthError,
    RateLimitExceeded,
    SizeLimitExceeded,
    TimeoutError,
    NetworkError,
    ServiceUnavailable,
    CircuitBreakerOpen,
    NotFound,
    Conflict,
    InternalError,
    PanicRecovered,
}

impl ErrorKind {
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::ValidationError => 400,
            ErrorKind::AuthError => 401,
            ErrorKind::RateLimitExceeded => 429,
            ErrorKind::SizeLimitExceeded => 413,
            ErrorKind::TimeoutError => 504,
            ErrorKind::NetworkError | ErrorKind::ServiceUnavailable | ErrorKind::CircuitBreakerOpen => 503,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InternalError | ErrorKind::PanicRecovered => 500,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::SizeLimitExceeded => "SIZE_LIMIT_EXCEEDED",
            ErrorKind::TimeoutError => "TIMEOUT_ERROR",
            ErrorKind::NetworkError => "SERVICE_UNAVAILABLE",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::CircuitBreakerOpen => "CIRCUIT_BREAKER_OPEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::PanicRecovered => "INTERNAL_ERROR",
        }
    }
}

/// A tagged error carrying a kind, a sanitized user-safe message, and an
/// internal-only details payload. Publishers and classifiers branch on
/// `kind`, never on `message` text.
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    /// Full context, logged internally, never serialized to the wire.
    pub details: Option<String>,
}

impl GatewayError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    #[must_use]
    pub fn circuit_breaker_open(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircuitBreakerOpen, message)
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TimeoutError, message)
    }

    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

/// Wire-facing error envelope: `{error: {code, message, request_id, timestamp, details?}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

impl ApiError {
    /// Build the wire envelope from a `GatewayError`. The internal `details`
    /// field is intentionally NOT carried to the wire; callers who want it
    /// exposed (rare, internal-only endpoints) must set it explicitly.
    #[must_use]
    pub fn from_gateway_error(err: &GatewayError, request_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            error: ApiErrorBody {
                code: err.kind.code().to_string(),
                message: err.message.clone(),
                request_id: request_id.into(),
                timestamp: now,
                details: None,
            },
        }
    }
}
