//! OpenAPI Specification for the Locus gateway
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::{address, auth, health, user};
use crate::telemetry::metrics;
use crate::types::{CredentialsRequest, GeocodeRequest, SearchRequest, TokenResponse};
use locus_core::{Address, AddressList, UserPage, UserProfile};

/// OpenAPI document for the gateway.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Locus API",
        description = "Address search and reverse geocoding behind bearer-token authentication"
    ),
    servers(
        (url = "http://localhost:8000", description = "Local Development")
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Address", description = "Address search and reverse geocoding"),
        (name = "Users", description = "Account lookup and listing"),
        (name = "Health", description = "Liveness checks"),
        (name = "Observability", description = "Prometheus metrics"),
    ),
    paths(
        auth::register,
        auth::login,
        address::search_address,
        address::geocode,
        user::get_profile,
        user::list_users,
        health::ping,
        health::live,
        metrics::metrics_handler,
    ),
    components(schemas(
        CredentialsRequest,
        TokenResponse,
        SearchRequest,
        GeocodeRequest,
        Address,
        AddressList,
        UserProfile,
        UserPage,
        health::HealthResponse,
        ApiError,
        ErrorCode,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
