//! Registration and login routes.

use axum::{extract::State, Json};

use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::state::GatewayState;
use crate::types::{CredentialsRequest, TokenResponse};

const CREDENTIALS_REQUIRED: &str = "Email and password are required";

fn check_credentials(req: &CredentialsRequest) -> ApiResult<()> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::invalid_argument(CREDENTIALS_REQUIRED));
    }
    Ok(())
}

/// POST /api/auth/register
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Malformed body or missing fields", body = String, content_type = "text/plain"),
        (status = 409, description = "Email already registered", body = String, content_type = "text/plain"),
    ),
))]
pub async fn register(
    State(state): State<GatewayState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    check_credentials(&req)?;

    let token = state
        .auth
        .register(&req.email, &req.password)
        .await
        .map_err(|e| {
            let message = format!("Registration failed: {}", e.message);
            e.with_message(message)
        })?;

    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/login
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 400, description = "Malformed body or missing fields", body = String, content_type = "text/plain"),
        (status = 401, description = "Login failed", body = String, content_type = "text/plain"),
    ),
))]
pub async fn login(
    State(state): State<GatewayState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> ApiResult<Json<TokenResponse>> {
    check_credentials(&req)?;

    let token = state
        .auth
        .login(&req.email, &req.password)
        .await
        .map_err(|e| {
            tracing::debug!(code = %e.code, "Login rejected by auth service");
            ApiError::unauthenticated("Login failed")
        })?;

    Ok(Json(TokenResponse { token }))
}
