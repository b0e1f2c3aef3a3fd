//! Gateway Backends
//!
//! The HTTP gateway reaches the three internal services through these
//! traits. [`GrpcBackends`] is the production implementation; tests plug in
//! in-memory fakes.
//!
//! The caller's `Authorization` header travels as the `authorization`
//! metadata entry, byte-for-byte.

use std::time::Duration;

use async_trait::async_trait;
use locus_core::{
    Address, AddressList, Pagination, TokenValidation, UserPage, UserProfile, AUTHORIZATION_METADATA_KEY,
};
use tonic::metadata::MetadataValue;
use tonic::transport::Channel;
use tonic::Request;

use crate::config::GatewayConfig;
use crate::error::{ApiError, ApiResult};
use crate::grpc::connect_lazy;
use crate::proto::auth::{
    auth_service_client::AuthServiceClient, LoginRequest, RegisterRequest, ValidateTokenRequest,
};
use crate::proto::geo::{geo_service_client::GeoServiceClient, GeocodeRequest, SearchAddressRequest};
use crate::proto::user::{
    user_service_client::UserServiceClient, GetProfileRequest, ListUsersRequest,
};

// ============================================================================
// TRAITS
// ============================================================================

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account; returns a bearer token.
    async fn register(&self, email: &str, password: &str) -> ApiResult<String>;

    /// Check credentials; returns a bearer token.
    async fn login(&self, email: &str, password: &str) -> ApiResult<String>;

    async fn validate_token(&self, token: &str) -> ApiResult<TokenValidation>;
}

#[async_trait]
pub trait GeoBackend: Send + Sync {
    async fn search_address(&self, authorization: &str, query: &str) -> ApiResult<AddressList>;

    /// `address` is `"<lat>,<lon>"`.
    async fn geocode(&self, authorization: &str, address: &str) -> ApiResult<AddressList>;
}

#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn get_profile(&self, authorization: &str, email: &str) -> ApiResult<UserProfile>;

    async fn list_users(&self, authorization: &str, page: Pagination) -> ApiResult<UserPage>;
}

// ============================================================================
// GRPC IMPLEMENTATION
// ============================================================================

/// Tonic clients for all three services.
///
/// Every outgoing request carries `grpc-timeout`, so the services see the
/// gateway's deadline and stop work the caller has given up on.
#[derive(Debug, Clone)]
pub struct GrpcBackends {
    auth: AuthServiceClient<Channel>,
    geo: GeoServiceClient<Channel>,
    user: UserServiceClient<Channel>,
    rpc_timeout: Duration,
}

impl GrpcBackends {
    pub fn new(auth: Channel, geo: Channel, user: Channel, rpc_timeout: Duration) -> Self {
        Self {
            auth: AuthServiceClient::new(auth),
            geo: GeoServiceClient::new(geo),
            user: UserServiceClient::new(user),
            rpc_timeout,
        }
    }

    /// Build lazily connected clients from gateway configuration.
    pub fn connect(config: &GatewayConfig) -> ApiResult<Self> {
        Ok(Self::new(
            connect_lazy(&config.auth_service, config.rpc_timeout)?,
            connect_lazy(&config.geo_service, config.rpc_timeout)?,
            connect_lazy(&config.user_service, config.rpc_timeout)?,
            config.rpc_timeout,
        ))
    }

    pub fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.rpc_timeout);
        request
    }

    /// Wrap a message in a request carrying the caller's authorization and
    /// the gateway deadline.
    fn authorized<T>(&self, message: T, authorization: &str) -> ApiResult<Request<T>> {
        let value = MetadataValue::try_from(authorization)
            .map_err(|_| ApiError::invalid_argument("Invalid Authorization header"))?;
        let mut request = self.request(message);
        request
            .metadata_mut()
            .insert(AUTHORIZATION_METADATA_KEY, value);
        Ok(request)
    }
}

#[async_trait]
impl AuthBackend for GrpcBackends {
    async fn register(&self, email: &str, password: &str) -> ApiResult<String> {
        let request = self.request(RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let response = self.auth.clone().register(request).await?;
        Ok(response.into_inner().token)
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let request = self.request(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let response = self.auth.clone().login(request).await?;
        Ok(response.into_inner().token)
    }

    async fn validate_token(&self, token: &str) -> ApiResult<TokenValidation> {
        let request = self.request(ValidateTokenRequest {
            token: token.to_string(),
        });
        let response = self.auth.clone().validate_token(request).await?.into_inner();

        Ok(if response.valid && !response.user_id.is_empty() {
            TokenValidation::valid(response.user_id)
        } else {
            TokenValidation::invalid()
        })
    }
}

#[async_trait]
impl GeoBackend for GrpcBackends {
    async fn search_address(&self, authorization: &str, query: &str) -> ApiResult<AddressList> {
        let request = self.authorized(
            SearchAddressRequest {
                query: query.to_string(),
            },
            authorization,
        )?;
        let response = self.geo.clone().search_address(request).await?.into_inner();
        Ok(AddressList::new(
            response.addresses.into_iter().map(Address::from).collect(),
        ))
    }

    async fn geocode(&self, authorization: &str, address: &str) -> ApiResult<AddressList> {
        let request = self.authorized(
            GeocodeRequest {
                address: address.to_string(),
            },
            authorization,
        )?;
        let response = self.geo.clone().geocode(request).await?.into_inner();
        Ok(AddressList::new(
            response.addresses.into_iter().map(Address::from).collect(),
        ))
    }
}

#[async_trait]
impl UserBackend for GrpcBackends {
    async fn get_profile(&self, authorization: &str, email: &str) -> ApiResult<UserProfile> {
        let request = self.authorized(
            GetProfileRequest {
                email: email.to_string(),
                password: None,
            },
            authorization,
        )?;
        let response = self.user.clone().get_profile(request).await?.into_inner();
        response
            .user
            .map(Into::into)
            .ok_or_else(|| ApiError::internal_error("user service returned no user"))
    }

    async fn list_users(&self, authorization: &str, page: Pagination) -> ApiResult<UserPage> {
        let request = self.authorized(
            ListUsersRequest {
                page: page.page(),
                per_page: page.per_page(),
            },
            authorization,
        )?;
        let response = self.user.clone().list_users(request).await?.into_inner();
        Ok(UserPage {
            users: response.users.into_iter().map(Into::into).collect(),
            total: response.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::parse_grpc_timeout;

    fn backends(rpc_timeout: Duration) -> ApiResult<GrpcBackends> {
        let channel = connect_lazy("http://127.0.0.1:1", rpc_timeout)?;
        Ok(GrpcBackends::new(
            channel.clone(),
            channel.clone(),
            channel,
            rpc_timeout,
        ))
    }

    #[tokio::test]
    async fn test_authorization_is_forwarded_verbatim() -> ApiResult<()> {
        let request = backends(Duration::from_secs(5))?.authorized((), "Bearer abc.def")?;
        let value = request
            .metadata()
            .get(AUTHORIZATION_METADATA_KEY)
            .and_then(|v| v.to_str().ok());
        assert_eq!(value, Some("Bearer abc.def"));
        Ok(())
    }

    fn deadline_of<T>(request: &Request<T>) -> Option<Duration> {
        request
            .metadata()
            .get("grpc-timeout")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_grpc_timeout)
    }

    #[tokio::test]
    async fn test_forwarded_requests_carry_deadline() -> ApiResult<()> {
        let backends = backends(Duration::from_millis(1500))?;

        let request = backends.authorized((), "Bearer abc.def")?;
        assert_eq!(deadline_of(&request), Some(Duration::from_millis(1500)));

        let request = backends.request(());
        assert_eq!(deadline_of(&request), Some(Duration::from_millis(1500)));
        Ok(())
    }

    #[tokio::test]
    async fn test_unencodable_authorization_is_rejected_without_echo() -> ApiResult<()> {
        let err = backends(Duration::from_secs(5))?
            .authorized((), "Bearer \nsecret")
            .err();
        let err = err.map(|e| e.message).unwrap_or_default();
        assert!(!err.is_empty());
        assert!(!err.contains("secret"));
        Ok(())
    }
}
