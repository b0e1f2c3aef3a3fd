//! Geo Lookup
//!
//! The authenticated, cached address lookup path: token check, cache key,
//! cache read, provider call, cache write.

mod engine;
pub mod keys;

pub use engine::GeoEngine;
pub use keys::{parse_coordinates, search_key, Coordinates};
