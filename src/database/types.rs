//! Type definitions for the database module
//!
//! [`LocationRecord`] is an owned copy of a GeoIP2 City record. Every level of
//! the tree is optional because database coverage is sparse: many networks
//! have a country but no city, no subdivision or no postal code.

use serde::Serialize;

use super::traits::{leaf, node, Attribute, Attributes};

/// Scalar value carried by a record leaf or a response field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Integer(i64),
    Bool(bool),
}

impl FieldValue {
    /// The value used for any field whose attribute is missing
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Result of a successful point lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRecord {
    pub continent: Option<Continent>,
    pub country: Option<Country>,
    pub registered_country: Option<Country>,
    pub city: Option<City>,
    pub subdivisions: Option<Subdivisions>,
    pub location: Option<Location>,
    pub postal: Option<Postal>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Continent {
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Country {
    pub iso_code: Option<String>,
    pub name: Option<String>,
    pub is_in_european_union: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct City {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subdivision {
    pub iso_code: Option<String>,
    pub name: Option<String>,
}

/// Subdivisions ordered from largest to smallest (e.g. England, then Greater London)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subdivisions(pub Vec<Subdivision>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_zone: Option<String>,
    pub metro_code: Option<u16>,
    pub accuracy_radius: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Postal {
    pub code: Option<String>,
}

impl Subdivisions {
    pub fn most_specific(&self) -> Option<&Subdivision> {
        self.0.last()
    }

    pub fn least_specific(&self) -> Option<&Subdivision> {
        self.0.first()
    }
}

impl Attributes for LocationRecord {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "continent" => node(&self.continent),
            "country" => node(&self.country),
            "registered_country" => node(&self.registered_country),
            "city" => node(&self.city),
            "subdivisions" => node(&self.subdivisions),
            "location" => node(&self.location),
            "postal" => node(&self.postal),
            _ => None,
        }
    }
}

impl Attributes for Continent {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "code" => leaf(&self.code),
            "name" => leaf(&self.name),
            _ => None,
        }
    }
}

impl Attributes for Country {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "iso_code" => leaf(&self.iso_code),
            "name" => leaf(&self.name),
            "is_in_european_union" => leaf(&self.is_in_european_union),
            _ => None,
        }
    }
}

impl Attributes for City {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "name" => leaf(&self.name),
            _ => None,
        }
    }
}

impl Attributes for Subdivision {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "iso_code" => leaf(&self.iso_code),
            "name" => leaf(&self.name),
            _ => None,
        }
    }
}

impl Attributes for Subdivisions {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let subdivision = match name {
            "most_specific" => self.most_specific(),
            "least_specific" => self.least_specific(),
            _ => None,
        };
        subdivision.map(|s| Attribute::Node(s as &dyn Attributes))
    }
}

impl Attributes for Location {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "latitude" => leaf(&self.latitude),
            "longitude" => leaf(&self.longitude),
            "time_zone" => leaf(&self.time_zone),
            "metro_code" => leaf(&self.metro_code),
            "accuracy_radius" => leaf(&self.accuracy_radius),
            _ => None,
        }
    }
}

impl Attributes for Postal {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "code" => leaf(&self.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(attr: Option<Attribute<'_>>) -> Option<FieldValue> {
        match attr? {
            Attribute::Value(v) => Some(v),
            Attribute::Node(_) => None,
        }
    }

    #[test]
    fn test_absent_branch_has_no_attribute() {
        let record = LocationRecord::default();
        assert!(!record.has_attribute("city"));
        assert!(!record.has_attribute("no_such_thing"));
    }

    #[test]
    fn test_subdivision_order() {
        let subdivisions = Subdivisions(vec![
            Subdivision { iso_code: Some("ENG".into()), name: Some("England".into()) },
            Subdivision { iso_code: Some("WSM".into()), name: Some("Westminster".into()) },
        ]);
        assert_eq!(subdivisions.least_specific().unwrap().iso_code.as_deref(), Some("ENG"));
        assert_eq!(subdivisions.most_specific().unwrap().iso_code.as_deref(), Some("WSM"));
        assert!(!Subdivisions::default().has_attribute("most_specific"));
    }

    #[test]
    fn test_location_leaves() {
        let location = Location {
            latitude: Some(39.8),
            metro_code: Some(623),
            ..Default::default()
        };
        assert_eq!(value(location.attribute("latitude")), Some(FieldValue::Float(39.8)));
        assert_eq!(value(location.attribute("metro_code")), Some(FieldValue::Integer(623)));
        assert!(location.attribute("longitude").is_none());
    }

    #[test]
    fn test_field_value_serializes_untagged() {
        let values = vec![
            FieldValue::from("US"),
            FieldValue::from(-89.6),
            FieldValue::from(0i64),
            FieldValue::empty(),
        ];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"["US",-89.6,0,""]"#);
    }
}
