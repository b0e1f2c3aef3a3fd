//! Error Types for the Locus API
//!
//! One error type serves both transports:
//! - `ErrorCode` is the shared taxonomy
//! - `ApiError` converts into a `tonic::Status` for RPC replies and into a
//!   plain-text HTTP response for the gateway
//! - `tonic::Status` received from a downstream service converts back into
//!   `ApiError`, so the kind survives a hop

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use locus_core::{CacheError, ConfigError, ProviderError, StoreError, ValidatorError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error categories shared by the RPC services and the HTTP gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or missing request data
    InvalidArgument,

    /// Missing, rejected, or unverifiable credentials
    Unauthenticated,

    /// Requested entity does not exist
    NotFound,

    /// Entity with the same identity already exists
    AlreadyExists,

    /// Unexpected failure, including downstream provider faults
    Internal,

    /// A dependency could not be reached
    Unavailable,

    /// The caller's deadline elapsed before an answer was ready
    DeadlineExceeded,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Get the gRPC status code for this error code.
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            ErrorCode::InvalidArgument => tonic::Code::InvalidArgument,
            ErrorCode::Unauthenticated => tonic::Code::Unauthenticated,
            ErrorCode::NotFound => tonic::Code::NotFound,
            ErrorCode::AlreadyExists => tonic::Code::AlreadyExists,
            ErrorCode::Internal => tonic::Code::Internal,
            ErrorCode::Unavailable => tonic::Code::Unavailable,
            ErrorCode::DeadlineExceeded => tonic::Code::DeadlineExceeded,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "Invalid request",
            ErrorCode::Unauthenticated => "Unauthorized",
            ErrorCode::NotFound => "Not found",
            ErrorCode::AlreadyExists => "Already exists",
            ErrorCode::Internal => "Internal server error",
            ErrorCode::Unavailable => "Service temporarily unavailable",
            ErrorCode::DeadlineExceeded => "Deadline exceeded",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by every service operation and gateway handler.
///
/// Messages never contain passwords or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Replace the message, keeping the code.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    /// Create a DeadlineExceeded error naming the operation that ran out of time.
    pub fn deadline_exceeded(operation: &str) -> Self {
        Self::new(
            ErrorCode::DeadlineExceeded,
            format!("deadline exceeded during {}", operation),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// TRANSPORT CONVERSIONS
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

impl From<ApiError> for tonic::Status {
    fn from(err: ApiError) -> Self {
        tonic::Status::new(err.code.grpc_code(), err.message)
    }
}

impl From<tonic::Status> for ApiError {
    fn from(status: tonic::Status) -> Self {
        let code = match status.code() {
            tonic::Code::InvalidArgument => ErrorCode::InvalidArgument,
            tonic::Code::Unauthenticated => ErrorCode::Unauthenticated,
            tonic::Code::NotFound => ErrorCode::NotFound,
            tonic::Code::AlreadyExists => ErrorCode::AlreadyExists,
            tonic::Code::Unavailable => ErrorCode::Unavailable,
            tonic::Code::DeadlineExceeded | tonic::Code::Cancelled => ErrorCode::DeadlineExceeded,
            _ => ErrorCode::Internal,
        };
        Self::new(code, status.message())
    }
}

// ============================================================================
// DOMAIN CONVERSIONS
// ============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found(err.to_string()),
            StoreError::AlreadyExists => ApiError::already_exists(err.to_string()),
            StoreError::InvalidCredentials => ApiError::unauthenticated(err.to_string()),
            StoreError::Hashing { .. } | StoreError::Database { .. } => {
                ApiError::internal_error(err.to_string())
            }
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::internal_error(err.to_string())
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError::unavailable(err.to_string())
    }
}

impl From<ValidatorError> for ApiError {
    fn from(err: ValidatorError) -> Self {
        match err {
            ValidatorError::Timeout => ApiError::deadline_exceeded("token validation"),
            ValidatorError::Unavailable { .. } => ApiError::unavailable(err.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        let cases = [
            (ErrorCode::InvalidArgument, 400),
            (ErrorCode::Unauthenticated, 401),
            (ErrorCode::NotFound, 404),
            (ErrorCode::AlreadyExists, 409),
            (ErrorCode::Internal, 500),
            (ErrorCode::Unavailable, 503),
            (ErrorCode::DeadlineExceeded, 504),
        ];
        for (code, status) in cases {
            assert_eq!(code.status_code().as_u16(), status, "{code}");
        }
    }

    #[test]
    fn test_status_round_trip_keeps_kind_and_message() {
        for code in [
            ErrorCode::InvalidArgument,
            ErrorCode::Unauthenticated,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::Internal,
            ErrorCode::Unavailable,
            ErrorCode::DeadlineExceeded,
        ] {
            let original = ApiError::new(code, "boom");
            let status: tonic::Status = original.clone().into();
            assert_eq!(ApiError::from(status), original);
        }
    }

    #[test]
    fn test_unknown_grpc_codes_are_internal() {
        let err = ApiError::from(tonic::Status::permission_denied("nope"));
        assert_eq!(err.code, ErrorCode::Internal);
        let err = ApiError::from(tonic::Status::cancelled("client went away"));
        assert_eq!(err.code, ErrorCode::DeadlineExceeded);
    }

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(ApiError::from(StoreError::NotFound), ApiError::not_found("user not found"));
        assert_eq!(
            ApiError::from(StoreError::AlreadyExists),
            ApiError::already_exists("user already exists")
        );
        assert_eq!(
            ApiError::from(StoreError::InvalidCredentials).code,
            ErrorCode::Unauthenticated
        );
    }

    #[test]
    fn test_into_response_is_plain_text() {
        let response = ApiError::not_found("address not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/plain; charset=utf-8")
        );
    }
}
