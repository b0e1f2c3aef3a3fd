//! Address search and reverse geocoding routes.

use axum::{extract::State, Json};
use locus_core::AddressList;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Authorization, JsonBody};
use crate::state::GatewayState;
use crate::types::{GeocodeRequest, SearchRequest};

/// POST /api/address/search
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/address/search",
    tag = "Address",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching addresses, possibly none", body = AddressList),
        (status = 400, description = "Malformed body", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid token", body = String, content_type = "text/plain"),
        (status = 500, description = "Provider failure", body = String, content_type = "text/plain"),
    ),
    security(("bearer_auth" = []))
))]
pub async fn search_address(
    State(state): State<GatewayState>,
    authorization: Authorization,
    JsonBody(req): JsonBody<SearchRequest>,
) -> ApiResult<Json<AddressList>> {
    let addresses = state
        .geo
        .search_address(authorization.as_str(), &req.query)
        .await?;
    Ok(Json(addresses))
}

/// POST /api/address/geocode
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/address/geocode",
    tag = "Address",
    request_body = GeocodeRequest,
    responses(
        (status = 200, description = "Addresses at the coordinates", body = AddressList),
        (status = 400, description = "Malformed body or coordinates", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid token", body = String, content_type = "text/plain"),
        (status = 404, description = "Nothing at the coordinates", body = String, content_type = "text/plain"),
    ),
    security(("bearer_auth" = []))
))]
pub async fn geocode(
    State(state): State<GatewayState>,
    authorization: Authorization,
    JsonBody(req): JsonBody<GeocodeRequest>,
) -> ApiResult<Json<AddressList>> {
    if req.lat.is_empty() || req.lng.is_empty() {
        return Err(ApiError::invalid_argument("lat and lng are required"));
    }

    let addresses = state
        .geo
        .geocode(authorization.as_str(), &req.address())
        .await?;
    Ok(Json(addresses))
}
