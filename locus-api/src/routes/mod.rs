//! Gateway Routes
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | POST | /api/auth/register | none |
//! | POST | /api/auth/login | none |
//! | POST | /api/address/search | header, checked by the geo service |
//! | POST | /api/address/geocode | header, checked by the geo service |
//! | GET | /api/user/profile | header, checked at the edge |
//! | GET | /api/user/list | header, checked at the edge |
//!
//! Plus `/health/*`, `/metrics`, `/openapi.json` and `/swagger-ui`.

pub mod address;
pub mod auth;
pub mod health;
pub mod user;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::require_valid_token;
use crate::state::GatewayState;
use crate::telemetry::{metrics_handler, observability_middleware};

const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Build the CORS layer. No configured origins means any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .max_age(CORS_MAX_AGE);

    if origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", origins);
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
    }
}

/// Handler for /openapi.json when Swagger UI is not compiled in.
#[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

/// Create the complete gateway router.
pub fn create_router(state: GatewayState, cors_origins: &[String]) -> Router {
    let user_routes = Router::new()
        .route("/api/user/profile", get(user::get_profile))
        .route("/api/user/list", get(user::list_users))
        .route_layer(from_fn_with_state(state.clone(), require_valid_token));

    let mut router = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/address/search", post(address::search_address))
        .route("/api/address/geocode", post(address::geocode))
        .merge(user_routes)
        .merge(health::create_router())
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/openapi.json", crate::openapi::ApiDoc::openapi()),
        );
    }

    #[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
    {
        router = router.route("/openapi.json", get(openapi_json));
    }

    router
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
