//! Account routes. Both sit behind the edge token check.

use axum::{
    extract::{Query, State},
    Json,
};
use locus_core::{Pagination, UserPage, UserProfile};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Authorization;
use crate::state::GatewayState;
use crate::types::{ListUsersQuery, ProfileQuery};

/// GET /api/user/profile?email=
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "Users",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Account profile", body = UserProfile),
        (status = 400, description = "Missing email", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid token", body = String, content_type = "text/plain"),
        (status = 404, description = "No such account", body = String, content_type = "text/plain"),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_profile(
    State(state): State<GatewayState>,
    authorization: Authorization,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Json<UserProfile>> {
    let email = query
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ApiError::invalid_argument("email is required"))?;

    let profile = state
        .users
        .get_profile(authorization.as_str(), &email)
        .await?;
    Ok(Json(profile))
}

/// GET /api/user/list?page=&per_page=
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/user/list",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of accounts", body = UserPage),
        (status = 401, description = "Missing or invalid token", body = String, content_type = "text/plain"),
    ),
    security(("bearer_auth" = []))
))]
pub async fn list_users(
    State(state): State<GatewayState>,
    authorization: Authorization,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<UserPage>> {
    let page = Pagination::from_raw(query.page.as_deref(), query.per_page.as_deref());

    let users = state
        .users
        .list_users(authorization.as_str(), page)
        .await?;
    Ok(Json(users))
}
