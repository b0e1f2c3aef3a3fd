//! Gateway request and response bodies.

use serde::{Deserialize, Serialize};

/// Body of `/api/auth/register` and `/api/auth/login`.
///
/// Missing fields deserialise as empty strings and are rejected by the
/// handler, so a well-formed but incomplete body is a 400 with its own
/// message rather than a parse error.
#[derive(Clone, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CredentialsRequest {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "user@example.com"))]
    pub email: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "password123"))]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchRequest {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "Москва, Тверская улица"))]
    pub query: String,
}

/// Coordinates as decimal-degree strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GeocodeRequest {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "55.7558"))]
    pub lat: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "37.6173"))]
    pub lng: String,
}

impl GeocodeRequest {
    /// Backend address string, `"<lat>,<lng>"` with no spaces added.
    pub fn address(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ProfileQuery {
    pub email: Option<String>,
}

/// Raw paging parameters; anything unparseable falls back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}
