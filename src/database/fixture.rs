//! Test-only writer for small MaxMind DB files
//!
//! Produces IPv4 or IPv6 databases with a 24-bit search tree and a data
//! section shaped like GeoLite2-City records, which is enough for `maxminddb`
//! to open and query them. IPv6 databases keep IPv4 networks under `::/96`,
//! like the published GeoLite2 files.

use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";
const DATA_SECTION_SEPARATOR: [u8; 16] = [0; 16];

/// A value in the MaxMind DB data section
#[derive(Debug, Clone)]
pub enum MmdbValue {
    Str(String),
    Double(f64),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Map(Vec<(String, MmdbValue)>),
    Array(Vec<MmdbValue>),
}

impl MmdbValue {
    pub fn str(s: &str) -> Self {
        MmdbValue::Str(s.to_string())
    }

    pub fn map<const N: usize>(entries: [(&str, MmdbValue); N]) -> Self {
        MmdbValue::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            MmdbValue::Str(s) => {
                control(out, 2, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            MmdbValue::Double(d) => {
                control(out, 3, 8);
                out.extend_from_slice(&d.to_be_bytes());
            }
            MmdbValue::U16(v) => uint(out, 5, u64::from(*v)),
            MmdbValue::U32(v) => uint(out, 6, u64::from(*v)),
            MmdbValue::U64(v) => uint(out, 9, *v),
            MmdbValue::Bool(b) => control(out, 14, usize::from(*b)),
            MmdbValue::Map(entries) => {
                control(out, 7, entries.len());
                for (key, value) in entries {
                    MmdbValue::Str(key.clone()).encode(out);
                    value.encode(out);
                }
            }
            MmdbValue::Array(items) => {
                control(out, 11, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

fn control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    let (size_bits, extra): (u8, Vec<u8>) = if size < 29 {
        (size as u8, Vec::new())
    } else if size < 285 {
        (29, vec![(size - 29) as u8])
    } else if size < 65_821 {
        (30, ((size - 285) as u16).to_be_bytes().to_vec())
    } else {
        (31, ((size - 65_821) as u32).to_be_bytes()[1..].to_vec())
    };

    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend(extra);
}

fn uint(out: &mut Vec<u8>, type_num: u8, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    control(out, type_num, bytes.len() - skip);
    out.extend_from_slice(&bytes[skip..]);
}

/// Builder for the fields of a GeoLite2-City record
#[derive(Debug, Clone, Default)]
pub struct CityFixture {
    pub city: Option<&'static str>,
    pub continent: Option<(&'static str, &'static str)>,
    pub country: Option<(&'static str, &'static str)>,
    pub subdivisions: Vec<(&'static str, &'static str)>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_zone: Option<&'static str>,
    pub postal: Option<&'static str>,
}

impl CityFixture {
    /// Springfield, Illinois, with every mapped attribute present
    pub fn springfield() -> Self {
        Self {
            city: Some("Springfield"),
            continent: Some(("NA", "North America")),
            country: Some(("US", "United States")),
            subdivisions: vec![("IL", "Illinois")],
            latitude: Some(39.7817),
            longitude: Some(-89.6501),
            time_zone: Some("America/Chicago"),
            postal: Some("62701"),
        }
    }

    /// A record that only knows its country
    pub fn country_only(iso_code: &'static str, name: &'static str) -> Self {
        Self {
            country: Some((iso_code, name)),
            ..Default::default()
        }
    }

    fn names(name: &str) -> MmdbValue {
        MmdbValue::map([("en", MmdbValue::str(name))])
    }

    pub fn to_value(&self) -> MmdbValue {
        let mut entries = Vec::new();

        if let Some(name) = self.city {
            entries.push((
                "city".to_string(),
                MmdbValue::map([("geoname_id", MmdbValue::U32(4_250_542)), ("names", Self::names(name))]),
            ));
        }
        if let Some((code, name)) = self.continent {
            entries.push((
                "continent".to_string(),
                MmdbValue::map([("code", MmdbValue::str(code)), ("names", Self::names(name))]),
            ));
        }
        if let Some((code, name)) = self.country {
            entries.push((
                "country".to_string(),
                MmdbValue::map([("iso_code", MmdbValue::str(code)), ("names", Self::names(name))]),
            ));
        }

        let mut location = Vec::new();
        if let Some(lat) = self.latitude {
            location.push(("latitude".to_string(), MmdbValue::Double(lat)));
        }
        if let Some(lon) = self.longitude {
            location.push(("longitude".to_string(), MmdbValue::Double(lon)));
        }
        if let Some(tz) = self.time_zone {
            location.push(("time_zone".to_string(), MmdbValue::str(tz)));
        }
        if !location.is_empty() {
            location.push(("accuracy_radius".to_string(), MmdbValue::U16(20)));
            entries.push(("location".to_string(), MmdbValue::Map(location)));
        }

        if let Some(code) = self.postal {
            entries.push(("postal".to_string(), MmdbValue::map([("code", MmdbValue::str(code))])));
        }
        if !self.subdivisions.is_empty() {
            let subs = self
                .subdivisions
                .iter()
                .map(|(code, name)| MmdbValue::map([("iso_code", MmdbValue::str(code)), ("names", Self::names(name))]))
                .collect();
            entries.push(("subdivisions".to_string(), MmdbValue::Array(subs)));
        }

        MmdbValue::Map(entries)
    }
}

#[derive(Clone, Copy)]
enum Record {
    Empty,
    Node(usize),
    Data(usize),
}

/// A City database assembled in memory
pub struct FixtureDatabase {
    ip_version: u16,
    networks: Vec<(IpAddr, u8, CityFixture)>,
}

impl Default for FixtureDatabase {
    fn default() -> Self {
        Self {
            ip_version: 4,
            networks: Vec::new(),
        }
    }
}

impl FixtureDatabase {
    /// IPv4-only database
    pub fn new() -> Self {
        Self::default()
    }

    /// IPv6 database that also answers IPv4 lookups
    pub fn ipv6() -> Self {
        Self {
            ip_version: 6,
            networks: Vec::new(),
        }
    }

    /// Add a network; prefixes must not overlap
    pub fn network(mut self, addr: IpAddr, prefix: u8, city: CityFixture) -> Self {
        let width = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        assert!((1..=width).contains(&prefix), "prefix must be 1..={}", width);
        assert!(
            self.ip_version == 6 || addr.is_ipv4(),
            "IPv6 networks need FixtureDatabase::ipv6()"
        );
        self.networks.push((addr, prefix, city));
        self
    }

    /// Address bits left-aligned in the tree's key space, with the prefix length in that space
    fn tree_key(&self, addr: IpAddr, prefix: u8) -> (u128, u32, u32) {
        match (addr, self.ip_version) {
            (IpAddr::V4(v4), 4) => (u128::from(u32::from(v4)), 32, u32::from(prefix)),
            (IpAddr::V4(v4), _) => (u128::from(u32::from(v4)), 128, 96 + u32::from(prefix)),
            (IpAddr::V6(v6), _) => (u128::from(v6), 128, u32::from(prefix)),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut nodes: Vec<[Record; 2]> = vec![[Record::Empty; 2]];
        let mut data = Vec::new();

        for (addr, prefix, city) in &self.networks {
            let offset = data.len();
            city.to_value().encode(&mut data);

            let (bits, width, prefix) = self.tree_key(*addr, *prefix);
            let mut node = 0;
            for depth in 0..prefix {
                let bit = ((bits >> (width - 1 - depth)) & 1) as usize;
                if depth + 1 == prefix {
                    nodes[node][bit] = Record::Data(offset);
                } else {
                    node = match nodes[node][bit] {
                        Record::Node(next) => next,
                        _ => {
                            nodes.push([Record::Empty; 2]);
                            let next = nodes.len() - 1;
                            nodes[node][bit] = Record::Node(next);
                            next
                        }
                    };
                }
            }
        }

        let node_count = nodes.len();
        let mut out = Vec::new();
        for pair in &nodes {
            for record in pair {
                let value = match *record {
                    Record::Empty => node_count,
                    Record::Node(next) => next,
                    Record::Data(offset) => node_count + DATA_SECTION_SEPARATOR.len() + offset,
                };
                out.extend_from_slice(&(value as u32).to_be_bytes()[1..]);
            }
        }
        out.extend_from_slice(&DATA_SECTION_SEPARATOR);
        out.extend_from_slice(&data);

        out.extend_from_slice(METADATA_MARKER);
        MmdbValue::map([
            ("binary_format_major_version", MmdbValue::U16(2)),
            ("binary_format_minor_version", MmdbValue::U16(0)),
            ("build_epoch", MmdbValue::U64(1_700_000_000)),
            ("database_type", MmdbValue::str("GeoLite2-City")),
            ("description", MmdbValue::map([("en", MmdbValue::str("geoip-rs test fixture"))])),
            ("ip_version", MmdbValue::U16(self.ip_version)),
            ("languages", MmdbValue::Array(vec![MmdbValue::str("en")])),
            ("node_count", MmdbValue::U32(node_count as u32)),
            ("record_size", MmdbValue::U16(24)),
        ])
        .encode(&mut out);

        out
    }

    /// Write `GeoLite2-City.mmdb` into `dir` and return its path
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join("GeoLite2-City.mmdb");
        std::fs::write(&path, self.to_bytes())?;
        Ok(path)
    }
}

/// Gzip arbitrary bytes, as served by the database download endpoint
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    encoder.finish().expect("gzip finish")
}
