//! GeoIP2 database implementation
//!
//! This module implements support for the MaxMind GeoIP2 / GeoLite2 City
//! database format through the `maxminddb` crate. Records are decoded into
//! borrowed `geoip2::City` values and copied into an owned [`LocationRecord`]
//! so they can outlive the reader they came from.

use crate::database::types::{
    City, Continent, Country, Location, LocationRecord, Postal, Subdivision, Subdivisions,
};
use crate::error::{GeoIpError, Result};
use maxminddb::{geoip2, MaxMindDBError};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

/// An opened GeoIP2 City database
///
/// The whole file is read into memory, so a handle keeps a consistent view
/// of the database even if the file on disk is replaced afterwards.
pub struct GeoIP2Database {
    reader: maxminddb::Reader<Vec<u8>>,
    locales: Vec<String>,
}

impl GeoIP2Database {
    /// Open a database file; `locales` picks which localized names to expose
    pub fn open(path: &Path, locales: &[String]) -> Result<Self> {
        log::info!("Loading GeoIP2 database from: {:?}", path);

        let reader = maxminddb::Reader::open_readfile(path)
            .map_err(|e| GeoIpError::query(format!("Failed to open GeoIP2 database {:?}: {}", path, e)))?;

        log::info!(
            "Successfully loaded {} database built at epoch {}",
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );

        Ok(Self {
            reader,
            locales: locales.to_vec(),
        })
    }

    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }

    /// Point lookup of a single address
    pub fn lookup(&self, ip: IpAddr) -> Result<LocationRecord> {
        match self.reader.lookup::<geoip2::City>(ip) {
            Ok(city) => Ok(record_from_city(&city, &self.locales)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Err(GeoIpError::AddressNotFound(ip.to_string())),
            Err(e) => Err(GeoIpError::query(format!("GeoIP2 lookup error: {}", e))),
        }
    }
}

/// Copy a decoded City record into an owned tree
pub fn record_from_city(city: &geoip2::City<'_>, locales: &[String]) -> LocationRecord {
    let continent = city.continent.as_ref().map(|c| Continent {
        code: c.code.map(str::to_string),
        name: localized(c.names.as_ref(), locales),
    });

    let country = city.country.as_ref().map(|c| Country {
        iso_code: c.iso_code.map(str::to_string),
        name: localized(c.names.as_ref(), locales),
        is_in_european_union: c.is_in_european_union,
    });

    let registered_country = city.registered_country.as_ref().map(|c| Country {
        iso_code: c.iso_code.map(str::to_string),
        name: localized(c.names.as_ref(), locales),
        is_in_european_union: c.is_in_european_union,
    });

    let city_name = city.city.as_ref().map(|c| City {
        name: localized(c.names.as_ref(), locales),
    });

    let subdivisions = city
        .subdivisions
        .as_ref()
        .filter(|subs| !subs.is_empty())
        .map(|subs| {
            Subdivisions(
                subs.iter()
                    .map(|sub| Subdivision {
                        iso_code: sub.iso_code.map(str::to_string),
                        name: localized(sub.names.as_ref(), locales),
                    })
                    .collect(),
            )
        });

    let location = city.location.as_ref().map(|l| Location {
        latitude: l.latitude,
        longitude: l.longitude,
        time_zone: l.time_zone.map(str::to_string),
        metro_code: l.metro_code,
        accuracy_radius: l.accuracy_radius,
    });

    let postal = city.postal.as_ref().map(|p| Postal {
        code: p.code.map(str::to_string),
    });

    LocationRecord {
        continent,
        country,
        registered_country,
        city: city_name,
        subdivisions,
        location,
        postal,
    }
}

/// First name available in the preferred locales
fn localized(names: Option<&BTreeMap<&str, &str>>, locales: &[String]) -> Option<String> {
    let names = names?;
    locales
        .iter()
        .find_map(|locale| names.get(locale.as_str()))
        .map(|s| s.to_string())
}
