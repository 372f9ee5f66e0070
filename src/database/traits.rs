//! Trait definitions for the database module
//!
//! Location records are walked by attribute name rather than by field access,
//! so that a dotted path such as `subdivisions.most_specific.iso_code` can be
//! resolved against any nested record type.

use super::types::FieldValue;

/// One step of a path walk: either another nested record or a leaf value
pub enum Attribute<'a> {
    Node(&'a dyn Attributes),
    Value(FieldValue),
}

/// Named-attribute access, implemented once per nested record type
pub trait Attributes {
    /// Look up a direct child attribute by name
    ///
    /// Returns `None` when the record type has no such attribute or when the
    /// attribute is absent for this particular record.
    fn attribute(&self, name: &str) -> Option<Attribute<'_>>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// Wrap an optional nested record as an attribute
pub(crate) fn node<T: Attributes>(value: &Option<T>) -> Option<Attribute<'_>> {
    value.as_ref().map(|v| Attribute::Node(v as &dyn Attributes))
}

/// Wrap an optional leaf value as an attribute
pub(crate) fn leaf<T: Clone + Into<FieldValue>>(value: &Option<T>) -> Option<Attribute<'static>> {
    value.clone().map(|v| Attribute::Value(v.into()))
}
