//! Where geoip-rs keeps its files
//!
//! A directory-specific variable (`GEOIP_CONFIG_HOME`, `GEOIP_DB_HOME`) wins
//! over `GEOIP_HOME`, which wins over the platform directory from `dirs`.

use crate::error::{GeoIpError, Result};
use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "geoip-rs";

/// Directory holding `config.yaml`
pub fn config_dir() -> Result<PathBuf> {
    resolve_dir("GEOIP_CONFIG_HOME", dirs::config_dir(), |name| env::var(name).ok())
        .ok_or_else(|| GeoIpError::config("Unable to determine configuration directory"))
}

/// Directory holding the decompressed database
pub fn data_dir() -> Result<PathBuf> {
    resolve_dir("GEOIP_DB_HOME", dirs::data_dir(), |name| env::var(name).ok())
        .ok_or_else(|| GeoIpError::config("Unable to determine data directory"))
}

fn resolve_dir<F: Fn(&str) -> Option<String>>(specific: &str, platform: Option<PathBuf>, var: F) -> Option<PathBuf> {
    var(specific)
        .or_else(|| var("GEOIP_HOME"))
        .map(PathBuf::from)
        .or_else(|| platform.map(|dir| dir.join(APP_DIR)))
}

/// Get the path to the config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.yaml"))
}

/// Get the path to a database file
pub fn database_file(name: &str) -> Result<PathBuf> {
    Ok(data_dir()?.join(name))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .map_err(|e| GeoIpError::config(format!("Failed to create directory {:?}: {}", path, e)))
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Sibling path with an extra suffix appended to the file name
///
/// `/data/GeoLite2-City.mmdb` + `.part` -> `/data/GeoLite2-City.mmdb.part`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
