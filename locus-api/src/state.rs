//! Shared gateway state for Axum routers.

use std::sync::Arc;

use crate::backend::{AuthBackend, GeoBackend, GrpcBackends, UserBackend};

/// Handles to the internal services, cloned into every handler.
#[derive(Clone)]
pub struct GatewayState {
    pub auth: Arc<dyn AuthBackend>,
    pub geo: Arc<dyn GeoBackend>,
    pub users: Arc<dyn UserBackend>,
}

impl GatewayState {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        geo: Arc<dyn GeoBackend>,
        users: Arc<dyn UserBackend>,
    ) -> Self {
        Self { auth, geo, users }
    }

    /// All three backends over one set of gRPC clients.
    pub fn from_grpc(backends: GrpcBackends) -> Self {
        let backends = Arc::new(backends);
        Self {
            auth: backends.clone(),
            geo: backends.clone(),
            users: backends,
        }
    }
}
