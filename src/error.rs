//! Error types for geoip-rs
//!
//! This module defines custom error types using thiserror for better error handling.

use thiserror::Error;

/// Main error type for geoip-rs
#[derive(Error, Debug)]
pub enum GeoIpError {
    /// Fetching or materializing the database file failed
    #[error("Provisioning failed: {0}")]
    Provision(String),

    /// The queried address has no entry in the database
    #[error("The address {0} is not in the database.")]
    AddressNotFound(String),

    /// The queried text is not an IP address
    #[error("'{0}' does not appear to be an IPv4 or IPv6 address")]
    InvalidIp(String),

    /// Database unavailable, corrupted or otherwise unqueryable
    #[error("Database query failed: {0}")]
    Query(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(String),

}

/// Result type alias for geoip-rs
pub type Result<T> = std::result::Result<T, GeoIpError>;

impl GeoIpError {
    /// Create a provisioning error
    pub fn provision<S: Into<String>>(msg: S) -> Self {
        GeoIpError::Provision(msg.into())
    }

    /// Create a query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        GeoIpError::Query(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        GeoIpError::Config(msg.into())
    }

    /// Whether this error means "no record", as opposed to a failed query
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeoIpError::AddressNotFound(_))
    }
}
