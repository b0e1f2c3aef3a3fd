//! Cache key derivation for the geo lookup path.
//!
//! Search keys embed the query byte-for-byte. Geocode keys trim ASCII
//! whitespace from both coordinates, so `" 55.7 , 37.6"` and `"55.7,37.6"`
//! share an entry while `"Moscow"` and `"moscow "` never do.

use crate::error::{ApiError, ApiResult};
use locus_core::{GEO_KEY_PREFIX, SEARCH_KEY_PREFIX};

pub const INVALID_COORDINATES: &str = "invalid coordinates format";

/// Cache key for a free-text search.
pub fn search_key(query: &str) -> String {
    format!("{}{}", SEARCH_KEY_PREFIX, query)
}

/// A `"<lat>,<lon>"` pair after trimming. Neither side is parsed as a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

impl Coordinates {
    pub fn cache_key(&self) -> String {
        format!("{}{},{}", GEO_KEY_PREFIX, self.lat, self.lon)
    }
}

/// Split a geocode address into its two coordinates.
///
/// Exactly one comma is allowed and both trimmed sides must be non-empty.
pub fn parse_coordinates(address: &str) -> ApiResult<Coordinates> {
    let mut parts = address.split(',');
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ApiError::invalid_argument(INVALID_COORDINATES));
    };

    let lat = lat.trim_matches(|c: char| c.is_ascii_whitespace());
    let lon = lon.trim_matches(|c: char| c.is_ascii_whitespace());
    if lat.is_empty() || lon.is_empty() {
        return Err(ApiError::invalid_argument(INVALID_COORDINATES));
    }

    Ok(Coordinates {
        lat: lat.to_string(),
        lon: lon.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use proptest::prelude::*;

    #[test]
    fn test_search_key_is_verbatim() {
        assert_eq!(search_key("Москва Сухаревская"), "search:Москва Сухаревская");
        assert_eq!(search_key(" moscow "), "search: moscow ");
        assert_eq!(search_key(""), "search:");
    }

    #[test]
    fn test_parse_trims_whitespace() -> ApiResult<()> {
        let coords = parse_coordinates(" 55.7558 ,\t37.6173\n")?;
        assert_eq!(coords.lat, "55.7558");
        assert_eq!(coords.lon, "37.6173");
        assert_eq!(coords.cache_key(), "geo:55.7558,37.6173");
        Ok(())
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["", ",", "55.7", "55.7,", ",37.6", " , ", "1,2,3", "55.7,37.6,"] {
            let err = parse_coordinates(input).err();
            assert_eq!(
                err,
                Some(ApiError::new(ErrorCode::InvalidArgument, INVALID_COORDINATES)),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_non_numeric_coordinates_pass_through() -> ApiResult<()> {
        let coords = parse_coordinates("north,east")?;
        assert_eq!(coords.cache_key(), "geo:north,east");
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_distinct_queries_get_distinct_keys(a in ".*", b in ".*") {
            prop_assume!(a != b);
            prop_assert_ne!(search_key(&a), search_key(&b));
        }

        #[test]
        fn prop_parse_accepts_exactly_two_nonempty_parts(input in "[ 0-9a-z.,]{0,16}") {
            let parts: Vec<&str> = input.split(',').collect();
            let well_formed = parts.len() == 2
                && parts.iter().all(|p| !p.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty());
            prop_assert_eq!(parse_coordinates(&input).is_ok(), well_formed);
        }

        #[test]
        fn prop_geo_key_ignores_surrounding_whitespace(
            lat in "[0-9.]{1,8}",
            lon in "[0-9.]{1,8}",
            pad in "[ \t]{0,3}",
        ) {
            let padded = format!("{pad}{lat}{pad},{pad}{lon}{pad}");
            let plain = format!("{lat},{lon}");
            let padded_key = parse_coordinates(&padded).map(|c| c.cache_key());
            let plain_key = parse_coordinates(&plain).map(|c| c.cache_key());
            prop_assert_eq!(padded_key, plain_key);
        }
    }
}
