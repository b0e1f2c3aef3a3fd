//! Request extractors with gateway-specific rejections.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub const INVALID_BODY: &str = "Invalid request body";
pub const UNAUTHORIZED: &str = "Unauthorized";

/// JSON body whose rejection is a plain-text 400.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(ApiError::invalid_argument(INVALID_BODY))
            }
        }
    }
}

/// The raw `Authorization` header value, exactly as the client sent it.
///
/// Absent, empty or non-ASCII headers are rejected with 401.
#[derive(Clone)]
pub struct Authorization(pub String);

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Authorization([REDACTED])")
    }
}

impl Authorization {
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| Authorization(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Authorization
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Authorization::from_parts(parts).ok_or_else(|| ApiError::unauthenticated(UNAUTHORIZED))
    }
}
