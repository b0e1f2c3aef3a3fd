//! Locus Provider Adapters
//!
//! The lookup path talks to external geocoding services through the
//! [`GeoProvider`] trait. [`DadataProvider`] is the production binding.

pub mod dadata;

pub use dadata::{DadataConfig, DadataProvider};

use async_trait::async_trait;
use locus_core::{Address, ProviderError};
use std::sync::Arc;

/// External geocoding service.
///
/// Implementations hold no per-request state. Results are returned in the
/// provider's order; an empty list is a valid answer.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Free-text address suggestions.
    async fn address_search(&self, query: &str) -> Result<Vec<Address>, ProviderError>;

    /// Reverse geocoding from decimal-degree strings.
    ///
    /// Coordinates arrive trimmed but never parsed. A provider that
    /// needs numbers rejects non-numeric input with
    /// [`ProviderError::InvalidRequest`], which the lookup path reports as an
    /// internal error rather than a bad argument.
    async fn geocode(&self, lat: &str, lon: &str) -> Result<Vec<Address>, ProviderError>;
}

#[async_trait]
impl<T: GeoProvider + ?Sized> GeoProvider for Arc<T> {
    async fn address_search(&self, query: &str) -> Result<Vec<Address>, ProviderError> {
        (**self).address_search(query).await
    }

    async fn geocode(&self, lat: &str, lon: &str) -> Result<Vec<Address>, ProviderError> {
        (**self).geocode(lat, lon).await
    }
}
