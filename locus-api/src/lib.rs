//! Locus API - gRPC Services and HTTP Gateway
//!
//! This crate holds everything that runs as a process in a Locus
//! deployment:
//!
//! - the auth service, which issues and validates bearer tokens;
//! - the geo service, an authenticated read-through cache in front of the
//!   geocoding provider;
//! - the user service, which stores accounts;
//! - the HTTP gateway, which turns external JSON requests into internal RPCs.
//!
//! Each has a binary under `src/bin/`.

pub mod accounts;
pub mod auth;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod extractors;
pub mod geo;
pub mod grpc;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

/// Generated protobuf code for the three internal services.
pub mod proto {
    pub mod auth {
        tonic::include_proto!("auth");
    }
    pub mod geo {
        tonic::include_proto!("geo");
    }
    pub mod user {
        tonic::include_proto!("user");
    }
}

// Re-export commonly used types
pub use accounts::UserAccounts;
pub use auth::{
    decode_token, issue_token, validate_token, Claims, JwtClock, JwtSecret, LocalTokenValidator,
    SystemClock, TokenConfig,
};
pub use backend::{AuthBackend, GeoBackend, GrpcBackends, UserBackend};
pub use context::CallContext;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use geo::GeoEngine;
pub use grpc::{
    AuthGrpcService, GeoGrpcService, RemoteTokenValidator, RemoteUserDirectory, UserDirectory,
    UserGrpcService,
};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::GatewayState;

/// Resolve when the process receives Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
