//! CLI module for geoip-rs
//!
//! This module handles command line argument parsing and startup logic.

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::download::Downloader;
use crate::error::Result;
use crate::response::FieldMapping;
use crate::server::{self, AppState, GeoIpService};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug, Default)]
#[command(name = "geoip-rs")]
#[command(version, about = "Start the geoip HTTP service")]
#[command(long_about = "geoip-rs resolves IP addresses to GeoLite2 city locations.\n\n\
    Examples:\n  \
    $ geoip-rs --fresh\n  \
    $ geoip-rs --download\n  \
    $ curl http://127.0.0.1:5000/geoip/8.8.8.8")]
pub struct Cli {
    /// Enable debugging (debug logging, pretty-printed JSON)
    #[arg(short, long)]
    pub debug: bool,

    /// Download a fresh copy of the database before serving
    #[arg(short, long)]
    pub fresh: bool,

    /// Only download the database - don't start the server
    #[arg(short = 'o', long)]
    pub download: bool,

    /// Increase output verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Path of the decompressed database file
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// URL of the gzip-compressed database
    #[arg(long, value_name = "URL")]
    pub db_url: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load configuration from `--config` or the default location
    pub fn load_config(&self) -> Result<AppConfig> {
        match &self.config {
            Some(file) => AppConfig::load_from(file),
            None => AppConfig::load(),
        }
    }

    /// Apply CLI options to config
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(path) = &self.db_path {
            config.database.path = path.to_string_lossy().into_owned();
        }
        if let Some(url) = &self.db_url {
            config.database.url = url.clone();
        }
        if self.verbose || self.debug {
            config.global.verbose = true;
        }
        if self.debug {
            config.server.pretty = true;
        }
    }

    pub async fn run(&self, config: AppConfig) -> Result<()> {
        let db_path = config.database_path()?;
        let downloader = Downloader::from_config(&config)?;

        self.prepare_database(&config, &downloader, &db_path).await?;

        if self.download {
            return Ok(());
        }

        let database = Arc::new(DatabaseManager::new(db_path, config.database.locales.clone()));
        let service = GeoIpService::new(
            Arc::clone(&database),
            FieldMapping::geolite_city(),
            config.lookup_timeout(),
        );

        #[cfg(unix)]
        server::spawn_refresh_on_sighup(downloader, Arc::clone(&database))?;

        let state = AppState::new(Arc::new(service), config.server.pretty);
        server::serve(config.bind_addr()?, state).await
    }

    /// Make sure a database file is in place before serving
    ///
    /// `--fresh` and `--download` always provision. Otherwise a missing file
    /// is downloaded when `auto_download` is set; if it is not, the server
    /// still starts and lookups fail until the file appears.
    async fn prepare_database(&self, config: &AppConfig, downloader: &Downloader, db_path: &Path) -> Result<()> {
        if self.fresh || self.download {
            let show_progress = self.download && atty::is(atty::Stream::Stderr);
            return downloader.provision(show_progress).await;
        }

        if db_path.exists() {
            return Ok(());
        }

        if config.database.auto_download {
            log::warn!("Database file not found: {:?}, downloading...", db_path);
            downloader.provision(false).await
        } else {
            log::warn!(
                "Database file not found: {:?}; lookups will fail until it is provisioned (run with --fresh)",
                db_path
            );
            Ok(())
        }
    }
}
