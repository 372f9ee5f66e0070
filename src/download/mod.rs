//! Database downloader module
//!
//! Provisions the GeoLite2 City database: streams the gzip archive to a
//! staging file, decompresses it next to the target, checks that the result
//! opens as a MaxMind database and renames it over the live file. A failure
//! at any step leaves the previous database untouched.

use crate::config::AppConfig;
use crate::error::{GeoIpError, Result};
use crate::utils::path;
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// Constants
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const ARCHIVE_SUFFIX: &str = ".gz.part";
const STAGING_SUFFIX: &str = ".part";

/// Database downloader
///
/// Single attempt, no retries: a failed provisioning is reported to the
/// caller, which decides whether that is fatal.
pub struct Downloader {
    client: reqwest::Client,
    url: String,
    dest: PathBuf,
}

impl Downloader {
    /// Create a downloader for `url` that materializes the database at `dest`
    pub fn new(url: &str, dest: &Path) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("geoip-rs/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeoIpError::provision(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            dest: dest.to_path_buf(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.database.url, &config.database_path()?)
    }

    /// Download, decompress, validate and install the database
    pub async fn provision(&self, show_progress: bool) -> Result<()> {
        log::info!("downloading fresh database from: {}", self.url);

        if let Some(parent) = self.dest.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| GeoIpError::provision(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        let archive = path::with_suffix(&self.dest, ARCHIVE_SUFFIX);
        let staging = path::with_suffix(&self.dest, STAGING_SUFFIX);

        let result = self.stage_and_install(&archive, &staging, show_progress).await;

        let _ = std::fs::remove_file(&archive);
        if result.is_err() {
            let _ = std::fs::remove_file(&staging);
        }

        result
    }

    async fn stage_and_install(&self, archive: &Path, staging: &Path, show_progress: bool) -> Result<()> {
        self.download_file(archive, show_progress).await?;

        log::info!("decompressing database file...");
        let (archive, staging_owned) = (archive.to_path_buf(), staging.to_path_buf());
        tokio::task::spawn_blocking(move || {
            decompress(&archive, &staging_owned)?;
            validate(&staging_owned)
        })
        .await
        .map_err(|e| GeoIpError::provision(format!("Decompression task failed: {}", e)))??;

        std::fs::rename(staging, &self.dest).map_err(|e| {
            GeoIpError::provision(format!("Failed to move {:?} into {:?}: {}", staging, self.dest, e))
        })?;

        log::info!("Database installed at: {:?}", self.dest);
        Ok(())
    }

    /// Stream the remote archive into `dest`, flushing every chunk
    async fn download_file(&self, dest: &Path, show_progress: bool) -> Result<()> {
        log::debug!("Saving archive to: {:?}", dest);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GeoIpError::provision(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            return Err(GeoIpError::provision(format!(
                "HTTP error: {} - {}",
                response.status(),
                self.url
            )));
        }

        let pb = match response.content_length() {
            Some(total) if show_progress => Some(progress_bar(total, &self.url)),
            _ => None,
        };

        let mut file = File::create(dest)
            .map_err(|e| GeoIpError::provision(format!("Failed to create {:?}: {}", dest, e)))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| GeoIpError::provision(format!("Failed to read chunk: {}", e)))?;

            file.write_all(&chunk)
                .and_then(|_| file.flush())
                .map_err(|e| GeoIpError::provision(format!("Failed to write {:?}: {}", dest, e)))?;

            downloaded += chunk.len() as u64;
            if let Some(ref pb) = pb {
                pb.set_position(downloaded);
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Download complete");
        }

        log::debug!("Downloaded {} bytes", downloaded);
        Ok(())
    }
}

fn progress_bar(total: u64, url: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("Downloading {}", url.split('/').next_back().unwrap_or("database")));
    pb
}

/// Gunzip `archive` into `dest` without holding the whole file in memory
fn decompress(archive: &Path, dest: &Path) -> Result<()> {
    let input = File::open(archive)
        .map_err(|e| GeoIpError::provision(format!("Failed to open {:?}: {}", archive, e)))?;
    let mut decoder = GzDecoder::new(BufReader::new(input));

    let output = File::create(dest)
        .map_err(|e| GeoIpError::provision(format!("Failed to create {:?}: {}", dest, e)))?;
    let mut writer = BufWriter::new(output);

    std::io::copy(&mut decoder, &mut writer)
        .map_err(|e| GeoIpError::provision(format!("Failed to decompress {:?}: {}", archive, e)))?;

    let output = writer
        .into_inner()
        .map_err(|e| GeoIpError::provision(format!("Failed to write {:?}: {}", dest, e.error())))?;
    output
        .sync_all()
        .map_err(|e| GeoIpError::provision(format!("Failed to sync {:?}: {}", dest, e)))?;

    Ok(())
}

/// Make sure the decompressed file is a readable MaxMind database
fn validate(file: &Path) -> Result<()> {
    let reader = maxminddb::Reader::open_readfile(file).map_err(|e| {
        GeoIpError::provision(format!("Downloaded file is not a valid MaxMind database: {}", e))
    })?;

    log::info!(
        "Verified {} database ({} nodes)",
        reader.metadata.database_type,
        reader.metadata.node_count
    );
    Ok(())
}
