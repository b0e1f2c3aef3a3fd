//! Auth service: registration, login and token validation.

use std::sync::Arc;

use async_trait::async_trait;
use locus_core::UserProfile;
use tonic::{Request, Response, Status};

use crate::accounts::{UserAccounts, CREDENTIALS_REQUIRED};
use crate::auth::{issue_token, validate_token, TokenConfig};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::proto::auth::{
    auth_service_server::AuthService, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, ValidateTokenRequest, ValidateTokenResponse,
};

/// Account lookups the auth service needs from the user tier.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, email: &str, password: &str) -> ApiResult<UserProfile>;

    /// Fetch a profile; when `password` is given it must verify.
    async fn get_profile(&self, email: &str, password: Option<&str>) -> ApiResult<UserProfile>;
}

#[async_trait]
impl UserDirectory for UserAccounts {
    async fn create_user(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        UserAccounts::create_user(self, email, password).await
    }

    async fn get_profile(&self, email: &str, password: Option<&str>) -> ApiResult<UserProfile> {
        UserAccounts::get_profile(self, email, password).await
    }
}

pub struct AuthGrpcService {
    tokens: TokenConfig,
    users: Arc<dyn UserDirectory>,
}

impl AuthGrpcService {
    pub fn new(tokens: TokenConfig, users: Arc<dyn UserDirectory>) -> Self {
        Self { tokens, users }
    }

    /// Create an account and return a token for it.
    pub async fn register_user(&self, email: &str, password: &str) -> ApiResult<String> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::invalid_argument(CREDENTIALS_REQUIRED));
        }

        match self.users.get_profile(email, None).await {
            Ok(_) => return Err(ApiError::already_exists("user already exists")),
            Err(e) if e.code == ErrorCode::NotFound => {}
            Err(e) => return Err(e),
        }

        let profile = self.users.create_user(email, password).await?;
        tracing::info!(user_id = %profile.id, "User registered");
        issue_token(&self.tokens, &profile.id, &profile.email)
    }

    /// Check credentials and return a token for the account.
    pub async fn login_user(&self, email: &str, password: &str) -> ApiResult<String> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::invalid_argument(CREDENTIALS_REQUIRED));
        }

        let profile = self
            .users
            .get_profile(email, Some(password))
            .await
            .map_err(|e| {
                tracing::warn!(code = %e.code, reason = %e.message, "Login rejected");
                ApiError::unauthenticated("authentication failed")
            })?;

        tracing::info!(user_id = %profile.id, "User logged in");
        issue_token(&self.tokens, &profile.id, &profile.email)
    }
}

#[tonic::async_trait]
impl AuthService for AuthGrpcService {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();
        let token = self.register_user(&req.email, &req.password).await?;
        Ok(Response::new(RegisterResponse { token }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        let token = self.login_user(&req.email, &req.password).await?;
        Ok(Response::new(LoginResponse { token }))
    }

    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        let req = request.into_inner();
        let validation = validate_token(&self.tokens, &req.token);
        Ok(Response::new(ValidateTokenResponse {
            valid: validation.valid,
            user_id: validation.user_id,
        }))
    }
}
