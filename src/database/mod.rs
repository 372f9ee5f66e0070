//! Database module for geoip-rs
//!
//! This module provides the lookup side of the service: opening the GeoIP2
//! City database, sharing one handle across requests and turning raw
//! records into an owned, attribute-addressable [`LocationRecord`].
//!
//! # Module Organization
//!
//! - `types`: Record tree and scalar values (LocationRecord, FieldValue)
//! - `traits`: Named-attribute access used by path resolution (Attributes)
//! - `geoip2`: maxminddb-backed database handle
//! - `manager`: Process-wide lazily opened handle with reload support

pub mod geoip2;
pub mod manager;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod fixture;

pub use geoip2::GeoIP2Database;
pub use manager::DatabaseManager;
pub use traits::{Attribute, Attributes};
pub use types::{
    City, Continent, Country, FieldValue, Location, LocationRecord, Postal, Subdivision, Subdivisions,
};
