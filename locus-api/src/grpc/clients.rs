//! Tonic clients for calls between tiers.
//!
//! Channels connect lazily, so a process starts even when its downstream
//! is not up yet; the first call reports `Unavailable` instead.

use std::time::Duration;

use async_trait::async_trait;
use locus_core::{TokenValidation, TokenValidator, UserProfile, ValidatorError};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request};

use super::auth::UserDirectory;
use crate::error::{ApiError, ApiResult};
use crate::proto::auth::{auth_service_client::AuthServiceClient, ValidateTokenRequest};
use crate::proto::user::{user_service_client::UserServiceClient, CreateUserRequest, GetProfileRequest};

/// Build a lazily connected channel with a per-call timeout.
pub fn connect_lazy(uri: &str, timeout: Duration) -> ApiResult<Channel> {
    let endpoint = Endpoint::from_shared(uri.to_string())
        .map_err(|e| ApiError::internal_error(format!("Invalid service address {}: {}", uri, e)))?;
    Ok(endpoint.timeout(timeout).connect_lazy())
}

// ============================================================================
// TOKEN VALIDATION
// ============================================================================

/// Token validator backed by `AuthService.ValidateToken`.
#[derive(Debug, Clone)]
pub struct RemoteTokenValidator {
    client: AuthServiceClient<Channel>,
}

impl RemoteTokenValidator {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: AuthServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl TokenValidator for RemoteTokenValidator {
    async fn validate(
        &self,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<TokenValidation, ValidatorError> {
        let mut request = Request::new(ValidateTokenRequest {
            token: token.to_string(),
        });
        if let Some(timeout) = timeout {
            request.set_timeout(timeout);
        }

        let response = self
            .client
            .clone()
            .validate_token(request)
            .await
            .map_err(|status| match status.code() {
                Code::DeadlineExceeded | Code::Cancelled => ValidatorError::Timeout,
                _ => ValidatorError::Unavailable {
                    reason: status.message().to_string(),
                },
            })?
            .into_inner();

        if response.valid && !response.user_id.is_empty() {
            Ok(TokenValidation::valid(response.user_id))
        } else {
            Ok(TokenValidation::invalid())
        }
    }
}

// ============================================================================
// USER DIRECTORY
// ============================================================================

/// Account lookups backed by the user service. Each call carries
/// `grpc-timeout` so the user service shares the caller's budget.
#[derive(Debug, Clone)]
pub struct RemoteUserDirectory {
    client: UserServiceClient<Channel>,
    timeout: Duration,
}

impl RemoteUserDirectory {
    pub fn new(channel: Channel, timeout: Duration) -> Self {
        Self {
            client: UserServiceClient::new(channel),
            timeout,
        }
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.timeout);
        request
    }
}

fn missing_user() -> ApiError {
    ApiError::internal_error("user service returned no user")
}

#[async_trait]
impl UserDirectory for RemoteUserDirectory {
    async fn create_user(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        let request = self.request(CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let response = self.client.clone().create_user(request).await?.into_inner();
        response.user.map(Into::into).ok_or_else(missing_user)
    }

    async fn get_profile(&self, email: &str, password: Option<&str>) -> ApiResult<UserProfile> {
        let request = self.request(GetProfileRequest {
            email: email.to_string(),
            password: password.map(str::to_string),
        });
        let response = self.client.clone().get_profile(request).await?.into_inner();
        response.user.map(Into::into).ok_or_else(missing_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_lazy_rejects_bad_uri() {
        let err = connect_lazy("not a uri", Duration::from_secs(1)).err();
        assert!(err.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_auth_service_is_a_validator_error() -> ApiResult<()> {
        let channel = connect_lazy("http://127.0.0.1:1", Duration::from_millis(500))?;
        let validator = RemoteTokenValidator::new(channel);
        let result = validator.validate("token", Some(Duration::from_millis(500))).await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_user_directory_requests_carry_deadline() -> ApiResult<()> {
        let channel = connect_lazy("http://127.0.0.1:1", Duration::from_secs(2))?;
        let directory = RemoteUserDirectory::new(channel, Duration::from_secs(2));

        let request = directory.request(GetProfileRequest {
            email: "a@b.c".to_string(),
            password: None,
        });
        let timeout = request
            .metadata()
            .get("grpc-timeout")
            .and_then(|v| v.to_str().ok())
            .and_then(crate::context::parse_grpc_timeout);
        assert_eq!(timeout, Some(Duration::from_secs(2)));
        Ok(())
    }
}
