//! Output field definitions
//!
//! A [`FieldMapping`] is an ordered table of output field names and the
//! dotted attribute paths they are read from.

use crate::database::{Attribute, Attributes, FieldValue};
use crate::error::{GeoIpError, Result};

/// Output fields of the GeoLite2-City response, in response order
pub const GEOLITE_CITY_FIELDS: &[(&str, &str)] = &[
    ("country_name", "country.name"),
    ("longitude", "location.longitude"),
    ("zip_code", "postal.code"),
    ("time_zone", "location.time_zone"),
    ("region_code", "subdivisions.most_specific.iso_code"),
    ("country_code", "country.iso_code"),
    ("latitude", "location.latitude"),
    ("city", "city.name"),
    ("region_name", "subdivisions.most_specific.name"),
];

/// One output field and its attribute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub name: String,
    pub segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path; every segment must be non-empty
    pub fn parse(name: &str, path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if name.is_empty() || segments.iter().any(String::is_empty) {
            return Err(GeoIpError::config(format!("Invalid field mapping '{}' -> '{}'", name, path)));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }
}

/// Ordered, immutable set of output fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    fields: Vec<FieldPath>,
}

impl FieldMapping {
    pub fn new<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields = entries
            .into_iter()
            .map(|(name, path)| FieldPath::parse(name, path))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { fields })
    }

    /// The fixed GeoLite2-City table
    pub fn geolite_city() -> Self {
        let fields = GEOLITE_CITY_FIELDS
            .iter()
            .map(|(name, path)| FieldPath {
                name: name.to_string(),
                segments: path.split('.').map(str::to_string).collect(),
            })
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::geolite_city()
    }
}

/// Walk `segments` from `root`, stopping at the first missing attribute
///
/// Returns `None` when an attribute is absent, when the path ends on a
/// nested record instead of a value, or when it continues past a value.
pub fn resolve(root: &dyn Attributes, segments: &[String]) -> Option<FieldValue> {
    let (last, parents) = segments.split_last()?;

    let mut current = root;
    for segment in parents {
        match current.attribute(segment)? {
            Attribute::Node(next) => current = next,
            Attribute::Value(_) => return None,
        }
    }

    match current.attribute(last)? {
        Attribute::Value(value) => Some(value),
        Attribute::Node(_) => None,
    }
}
