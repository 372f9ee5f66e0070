//! Field extraction
//!
//! Projects a [`LocationRecord`] onto the flat response body. Each mapped
//! field is resolved on its own; a missing attribute yields `""` for that
//! field and never affects the others.

pub mod document;
pub mod mapping;

pub use document::{ErrorBody, ErrorDocument, ResponseDocument};
pub use mapping::{resolve, FieldMapping, FieldPath, GEOLITE_CITY_FIELDS};

use crate::database::{FieldValue, LocationRecord};

/// Value of the `metro_code` field in every success body
pub const METRO_CODE: i64 = 0;
/// Value of the `code` field in every success body
pub const CODE: i64 = 200;

/// Build the success body for `ip` from a looked-up record
pub fn extract(record: &LocationRecord, mapping: &FieldMapping, ip: &str) -> ResponseDocument {
    let mut document = ResponseDocument::new();

    for field in mapping.fields() {
        let value = resolve(record, &field.segments).unwrap_or_else(|| {
            log::debug!("{}: no attribute at {}", field.name, field.segments.join("."));
            FieldValue::empty()
        });
        document.insert(&field.name, value);
    }

    document.insert("ip", ip);
    document.insert("metro_code", METRO_CODE);
    document.insert("code", CODE);

    document
}
