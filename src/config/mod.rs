//! Configuration module for geoip-rs
//!
//! Handles loading and managing configuration from YAML files and environment variables.

use crate::error::{GeoIpError, Result};
use crate::utils::path;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote location of the compressed GeoLite2 City database
pub const DEFAULT_DATABASE_URL: &str =
    "http://geolite.maxmind.com/download/geoip/database/GeoLite2-City.mmdb.gz";

/// File name of the decompressed database inside the data directory
pub const DEFAULT_DATABASE_FILE: &str = "GeoLite2-City.mmdb";

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub global: GlobalConfig,
}

/// Database provisioning and lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Remote URL of the gzip-compressed database
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Local path of the decompressed database (empty = data directory default)
    #[serde(default)]
    pub path: String,

    /// Preferred languages for localized names, tried in order
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Download the database at startup when the file is missing
    #[serde(default = "default_true")]
    pub auto_download: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upper bound for a single lookup, in milliseconds
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Pretty-print JSON bodies
    #[serde(default)]
    pub pretty: bool,
}

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalConfig {
    /// Verbose logging
    #[serde(default)]
    pub verbose: bool,

    /// Custom config path
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

// Default value functions
fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_lookup_timeout_ms() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            path: String::new(),
            locales: default_locales(),
            auto_download: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            pretty: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location and environment variables
    pub fn load() -> Result<Self> {
        let config_file = path::config_file()?;
        if let Some(parent) = config_file.parent() {
            path::ensure_dir(parent)?;
        }

        let mut config = if config_file.exists() {
            Self::from_file(&config_file)?
        } else {
            // Create default config
            let config = Self::default();
            config.save(&config_file)?;
            config
        };

        config.global.config_path = Some(config_file);
        config.apply_env();

        Ok(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(file: &Path) -> Result<Self> {
        let mut config = Self::from_file(file)?;
        config.global.config_path = Some(file.to_path_buf());
        config.apply_env();
        Ok(config)
    }

    fn from_file(file: &Path) -> Result<Self> {
        let content = fs::read_to_string(file)
            .map_err(|e| GeoIpError::config(format!("Failed to read config file {:?}: {}", file, e)))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| GeoIpError::Yaml(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    /// Apply `GEOIP_*` overrides read through `var`
    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, var: F) {
        if let Some(val) = var("GEOIP_DB_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("GEOIP_DB_PATH") {
            self.database.path = val;
        }
        if let Some(val) = var("GEOIP_BIND") {
            self.server.bind = val;
        }
        if let Some(val) = var("GEOIP_LOCALES") {
            self.database.locales = parse_locales(&val);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| GeoIpError::Yaml(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, yaml)
            .map_err(|e| GeoIpError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Resolved path of the decompressed database file
    pub fn database_path(&self) -> Result<PathBuf> {
        if !self.database.path.is_empty() {
            return Ok(path::expand_tilde(&self.database.path));
        }

        path::database_file(DEFAULT_DATABASE_FILE)
    }

    /// Parsed listen address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| GeoIpError::config(format!("Invalid bind address '{}': {}", self.server.bind, e)))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.server.lookup_timeout_ms)
    }
}

fn parse_locales(raw: &str) -> Vec<String> {
    let locales: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if locales.is_empty() { default_locales() } else { locales }
}
