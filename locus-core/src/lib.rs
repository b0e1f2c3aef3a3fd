//! Locus Core - Domain Types
//!
//! Plain data shared by every Locus crate: the address record returned by
//! geocoding providers, the user profile view, pagination, the error
//! taxonomy, and the small environment helpers used by `from_env()`
//! constructors across the workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod token;

use serde::{Deserialize, Serialize};

pub use config::{env_parse, env_var};
pub use constants::*;
pub use error::{CacheError, ConfigError, ProviderError, StoreError, ValidatorError};
pub use token::{strip_bearer, TokenValidation, TokenValidator};

// ============================================================================
// ADDRESS
// ============================================================================

/// Normalised address record.
///
/// All fields are free-form strings. `lat` and `lon` are decimal-degree
/// strings as returned by the provider and are never parsed by the lookup
/// path. Missing provider fields are represented as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Address {
    pub city: String,
    pub street: String,
    pub house: String,
    pub lat: String,
    pub lon: String,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        house: impl Into<String>,
        lat: impl Into<String>,
        lon: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            street: street.into(),
            house: house.into(),
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

/// Ordered list of addresses, in the order the provider produced them.
///
/// This is also the document stored in the lookup cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddressList {
    pub addresses: Vec<Address>,
}

impl AddressList {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self { addresses }
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }
}

impl From<Vec<Address>> for AddressList {
    fn from(addresses: Vec<Address>) -> Self {
        Self::new(addresses)
    }
}

// ============================================================================
// USERS
// ============================================================================

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    /// Human-readable creation time.
    pub created_at: String,
}

/// One page of accounts plus the total number of accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserPage {
    pub users: Vec<UserProfile>,
    pub total: i32,
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Page selector for account listings.
///
/// Construction always goes through one of the normalising constructors, so
/// both fields are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: i32,
    per_page: i32,
}

impl Pagination {
    /// Build a page selector, replacing absent or non-positive values with
    /// the defaults (page 1, 10 per page).
    pub fn new(page: Option<i32>, per_page: Option<i32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            per_page: per_page.filter(|p| *p > 0).unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// Build a page selector from raw query-string values.
    ///
    /// Unparseable values fall back to the defaults just like absent ones.
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i32>().ok());
        Self::new(parse(page), parse(per_page))
    }

    pub fn page(&self) -> i32 {
        self.page
    }

    pub fn per_page(&self) -> i32 {
        self.per_page
    }

    /// Number of records to skip for this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_address_serializes_in_declaration_order() -> Result<(), serde_json::Error> {
        let address = Address::new("Москва", "Сухаревская", "11", "55.77412", "37.624065");
        let json = serde_json::to_string(&address)?;
        assert_eq!(
            json,
            r#"{"city":"Москва","street":"Сухаревская","house":"11","lat":"55.77412","lon":"37.624065"}"#
        );
        Ok(())
    }

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::default().page(), 1);
        assert_eq!(Pagination::default().per_page(), 10);
        assert_eq!(Pagination::from_raw(None, None), Pagination::default());
        assert_eq!(Pagination::from_raw(Some("abc"), Some("")), Pagination::default());
        assert_eq!(Pagination::from_raw(Some("0"), Some("-5")), Pagination::default());
    }

    #[test]
    fn test_pagination_keeps_valid_values() {
        let page = Pagination::from_raw(Some("3"), Some("25"));
        assert_eq!(page.page(), 3);
        assert_eq!(page.per_page(), 25);
        assert_eq!(page.offset(), 50);
        assert_eq!(page.limit(), 25);
    }

    proptest! {
        #[test]
        fn prop_pagination_is_always_positive(page in any::<Option<i32>>(), per_page in any::<Option<i32>>()) {
            let p = Pagination::new(page, per_page);
            prop_assert!(p.page() > 0);
            prop_assert!(p.per_page() > 0);
            prop_assert!(p.offset() >= 0);
        }
    }
}
