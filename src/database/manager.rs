//! Database manager - owns the process-wide query handle
//!
//! One [`GeoIP2Database`] is shared by every request. It is opened lazily on
//! the first lookup and replaced wholesale by [`DatabaseManager::reload`]
//! after the file on disk has been refreshed. Lookups that already hold the
//! previous handle finish against it; new lookups see the new one.

use crate::database::geoip2::GeoIP2Database;
use crate::database::types::LocationRecord;
use crate::error::{GeoIpError, Result};
use arc_swap::ArcSwapOption;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Lookup service over the provisioned database file
///
/// # Thread Safety
///
/// DatabaseManager is thread-safe and can be shared across threads using Arc.
/// Reads never take a lock; the mutex only serializes opening the file.
pub struct DatabaseManager {
    path: PathBuf,
    locales: Vec<String>,
    handle: ArcSwapOption<GeoIP2Database>,
    open_lock: Mutex<()>,
}

impl DatabaseManager {
    /// Create a manager for the database at `path` without opening it
    pub fn new(path: PathBuf, locales: Vec<String>) -> Self {
        Self {
            path,
            locales,
            handle: ArcSwapOption::empty(),
            open_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a handle has been opened
    pub fn is_loaded(&self) -> bool {
        self.handle.load().is_some()
    }

    /// Get the shared handle, opening the database on first use
    fn handle(&self) -> Result<Arc<GeoIP2Database>> {
        if let Some(db) = self.handle.load_full() {
            return Ok(db);
        }

        let _guard = self
            .open_lock
            .lock()
            .map_err(|e| GeoIpError::query(format!("Failed to acquire open lock: {}", e)))?;

        // Another request may have opened it while we waited
        if let Some(db) = self.handle.load_full() {
            return Ok(db);
        }

        log::info!("opening connection to database");
        let db = Arc::new(GeoIP2Database::open(&self.path, &self.locales)?);
        self.handle.store(Some(Arc::clone(&db)));
        Ok(db)
    }

    /// Re-open the database file and swap the new handle in
    ///
    /// On failure the current handle, if any, stays in service.
    pub fn reload(&self) -> Result<()> {
        let _guard = self
            .open_lock
            .lock()
            .map_err(|e| GeoIpError::query(format!("Failed to acquire open lock: {}", e)))?;

        let db = GeoIP2Database::open(&self.path, &self.locales)?;
        self.handle.store(Some(Arc::new(db)));
        log::info!("Database handle reloaded from: {:?}", self.path);
        Ok(())
    }

    /// Look up a textual IPv4 or IPv6 address
    ///
    /// The text must be an address exactly as written; surrounding whitespace
    /// is rejected. IPv4-mapped IPv6 addresses are looked up as IPv4.
    ///
    /// # Returns
    ///
    /// * `Ok(LocationRecord)` - The address matched a network in the database
    /// * `Err(GeoIpError::AddressNotFound)` - No entry for the address
    /// * `Err(GeoIpError::InvalidIp)` - The text is not an IP address
    /// * `Err(GeoIpError::Query)` - The database could not be opened or read
    pub fn lookup(&self, ip: &str) -> Result<LocationRecord> {
        let addr: IpAddr = ip.parse().map_err(|_| GeoIpError::InvalidIp(ip.to_string()))?;

        match self.handle()?.lookup(addr.to_canonical()) {
            Err(GeoIpError::AddressNotFound(_)) => Err(GeoIpError::AddressNotFound(ip.to_string())),
            other => other,
        }
    }

    /// Hold the open lock so that a first lookup stalls until the guard drops
    #[cfg(test)]
    pub(crate) fn block_open(&self) -> std::sync::MutexGuard<'_, ()> {
        self.open_lock.lock().unwrap()
    }
}
