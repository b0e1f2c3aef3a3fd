//! Edge authentication for account routes.
//!
//! Account routes have no engine of their own to check the caller, so the
//! gateway asks the auth service before forwarding. The header itself is
//! still passed downstream untouched.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use locus_core::strip_bearer;

use crate::error::ApiError;
use crate::extractors::UNAUTHORIZED;
use crate::state::GatewayState;

/// Reject the request with 401 unless its bearer token validates.
pub async fn require_valid_token(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| strip_bearer(value).to_string());

    let Some(token) = token else {
        return ApiError::unauthenticated(UNAUTHORIZED).into_response();
    };

    match state.auth.validate_token(&token).await {
        Ok(validation) if validation.valid => next.run(request).await,
        Ok(_) => ApiError::unauthenticated(UNAUTHORIZED).into_response(),
        Err(e) => {
            tracing::warn!(code = %e.code, reason = %e.message, "Token validation failed at the edge");
            ApiError::unauthenticated(UNAUTHORIZED).into_response()
        }
    }
}
