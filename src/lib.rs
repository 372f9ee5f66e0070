//! geoip-rs: GeoLite2 city lookups over HTTP
//!
//! The service provisions a MaxMind GeoLite2-City database, looks addresses
//! up through a single shared handle and flattens the matching record into
//! a fixed set of JSON fields.

pub mod cli;
pub mod config;
pub mod database;
pub mod download;
pub mod error;
pub mod response;
pub mod server;
pub mod utils;

// Re-export common types
pub use config::AppConfig;
pub use database::{DatabaseManager, FieldValue, LocationRecord};
pub use download::Downloader;
pub use error::{GeoIpError, Result};
pub use response::{extract, FieldMapping, ResponseDocument};
