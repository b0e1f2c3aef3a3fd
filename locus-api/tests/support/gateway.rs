//! In-memory backends and request helpers for gateway router tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use locus_api::{
    create_router, ApiError, ApiResult, AuthBackend, GatewayState, GeoBackend, UserBackend,
};
use locus_core::{AddressList, Pagination, TokenValidation, UserPage, UserProfile};
use tower::ServiceExt;

/// One call received by a fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register { email: String },
    Login { email: String },
    ValidateToken { token: String },
    SearchAddress { authorization: String, query: String },
    Geocode { authorization: String, address: String },
    GetProfile { authorization: String, email: String },
    ListUsers { authorization: String, page: Pagination },
}

/// All three backends in one scripted fake.
pub struct FakeBackends {
    calls: Mutex<Vec<Call>>,
    token: Mutex<ApiResult<String>>,
    validation: Mutex<ApiResult<TokenValidation>>,
    addresses: Mutex<ApiResult<AddressList>>,
    profile: Mutex<ApiResult<UserProfile>>,
    users: Mutex<ApiResult<UserPage>>,
}

impl FakeBackends {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            token: Mutex::new(Ok("issued-token".to_string())),
            validation: Mutex::new(Ok(TokenValidation::valid("user-1"))),
            addresses: Mutex::new(Ok(AddressList::default())),
            profile: Mutex::new(Ok(profile("user-1", "ivan@example.com"))),
            users: Mutex::new(Ok(UserPage::default())),
        })
    }

    /// Register and login answer with `result`.
    pub fn set_token_result(&self, result: ApiResult<String>) {
        *self.token.lock().unwrap() = result;
    }

    pub fn set_validation(&self, result: ApiResult<TokenValidation>) {
        *self.validation.lock().unwrap() = result;
    }

    /// Search and geocode answer with `result`.
    pub fn set_addresses(&self, result: ApiResult<AddressList>) {
        *self.addresses.lock().unwrap() = result;
    }

    pub fn set_profile(&self, result: ApiResult<UserProfile>) {
        *self.profile.lock().unwrap() = result;
    }

    pub fn set_users(&self, result: ApiResult<UserPage>) {
        *self.users.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn router(self: &Arc<Self>) -> Router {
        let state = GatewayState::new(self.clone(), self.clone(), self.clone());
        create_router(state, &[])
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AuthBackend for FakeBackends {
    async fn register(&self, email: &str, _password: &str) -> ApiResult<String> {
        self.record(Call::Register {
            email: email.to_string(),
        });
        self.token.lock().unwrap().clone()
    }

    async fn login(&self, email: &str, _password: &str) -> ApiResult<String> {
        self.record(Call::Login {
            email: email.to_string(),
        });
        self.token.lock().unwrap().clone()
    }

    async fn validate_token(&self, token: &str) -> ApiResult<TokenValidation> {
        self.record(Call::ValidateToken {
            token: token.to_string(),
        });
        self.validation.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeoBackend for FakeBackends {
    async fn search_address(&self, authorization: &str, query: &str) -> ApiResult<AddressList> {
        self.record(Call::SearchAddress {
            authorization: authorization.to_string(),
            query: query.to_string(),
        });
        self.addresses.lock().unwrap().clone()
    }

    async fn geocode(&self, authorization: &str, address: &str) -> ApiResult<AddressList> {
        self.record(Call::Geocode {
            authorization: authorization.to_string(),
            address: address.to_string(),
        });
        self.addresses.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserBackend for FakeBackends {
    async fn get_profile(&self, authorization: &str, email: &str) -> ApiResult<UserProfile> {
        self.record(Call::GetProfile {
            authorization: authorization.to_string(),
            email: email.to_string(),
        });
        self.profile.lock().unwrap().clone()
    }

    async fn list_users(&self, authorization: &str, page: Pagination) -> ApiResult<UserPage> {
        self.record(Call::ListUsers {
            authorization: authorization.to_string(),
            page,
        });
        self.users.lock().unwrap().clone()
    }
}

pub fn profile(id: &str, email: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        email: email.to_string(),
        created_at: "2024-03-01 12:00:00 +0000 UTC".to_string(),
    }
}

pub fn not_found() -> ApiError {
    ApiError::not_found("user not found")
}

// ============================================================================
// REQUESTS
// ============================================================================

pub fn post_json(uri: &str, body: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Send one request through the router and collect the body as text.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
