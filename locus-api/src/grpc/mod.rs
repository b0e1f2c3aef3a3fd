//! gRPC Service Implementations
//!
//! Server halves of the three internal services plus the tonic clients the
//! other tiers use to reach them. Handlers convert `ApiError` into
//! `tonic::Status` with `?`; clients convert the other way.

mod auth;
mod clients;
mod geo;
mod user;

pub use auth::{AuthGrpcService, UserDirectory};
pub use clients::{connect_lazy, RemoteTokenValidator, RemoteUserDirectory};
pub use geo::GeoGrpcService;
pub use user::UserGrpcService;

use crate::proto;
use locus_core::{Address, UserProfile};

// ============================================================================
// CONVERSION HELPERS
// ============================================================================

impl From<Address> for proto::geo::Address {
    fn from(address: Address) -> Self {
        Self {
            city: address.city,
            street: address.street,
            house: address.house,
            lat: address.lat,
            lon: address.lon,
        }
    }
}

impl From<proto::geo::Address> for Address {
    fn from(address: proto::geo::Address) -> Self {
        Address::new(address.city, address.street, address.house, address.lat, address.lon)
    }
}

impl From<UserProfile> for proto::user::User {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            created_at: profile.created_at,
        }
    }
}

impl From<proto::user::User> for UserProfile {
    fn from(user: proto::user::User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}
