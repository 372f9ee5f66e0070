//! Lookup-and-extract pipeline behind the HTTP handlers

use crate::database::DatabaseManager;
use crate::error::{GeoIpError, Result};
use crate::response::{extract, FieldMapping, ResponseDocument};
use std::sync::Arc;
use std::time::Duration;

/// Per-request pipeline: Lookup Service, then Field Extraction
pub struct GeoIpService {
    database: Arc<DatabaseManager>,
    mapping: FieldMapping,
    lookup_timeout: Duration,
}

impl GeoIpService {
    pub fn new(database: Arc<DatabaseManager>, mapping: FieldMapping, lookup_timeout: Duration) -> Self {
        Self {
            database,
            mapping,
            lookup_timeout,
        }
    }

    pub fn database(&self) -> &Arc<DatabaseManager> {
        &self.database
    }

    /// Resolve `ip` into a success body
    ///
    /// The lookup runs on the blocking pool because the first call may have
    /// to read the database file from disk.
    pub async fn geoip(&self, ip: &str) -> Result<ResponseDocument> {
        log::info!("looking up IP address: {}", ip);

        let database = Arc::clone(&self.database);
        let query = ip.to_string();
        let task = tokio::task::spawn_blocking(move || database.lookup(&query));

        let record = match tokio::time::timeout(self.lookup_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(GeoIpError::query(format!("Lookup task failed: {}", e))),
            Err(_) => {
                return Err(GeoIpError::query(format!(
                    "Lookup timed out after {} ms",
                    self.lookup_timeout.as_millis()
                )));
            }
        };

        Ok(extract(&record, &self.mapping, ip))
    }
}
