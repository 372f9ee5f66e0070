//! Response bodies
//!
//! [`ResponseDocument`] keeps its fields in insertion order so that the same
//! lookup always serializes to the same bytes.

use crate::database::FieldValue;
use indexmap::IndexMap;
use serde::Serialize;

/// Flat, ordered success body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseDocument {
    fields: IndexMap<String, FieldValue>,
}

impl ResponseDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value in place
    pub fn insert<V: Into<FieldValue>>(&mut self, name: &str, value: V) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `{"error": {"message": ...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDocument {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorDocument {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut doc = ResponseDocument::new();
        doc.insert("zeta", "z");
        doc.insert("alpha", 1.5);
        doc.insert("mid", 7i64);
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"zeta":"z","alpha":1.5,"mid":7}"#);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut doc = ResponseDocument::new();
        doc.insert("a", "1");
        doc.insert("b", "2");
        doc.insert("a", "3");
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&FieldValue::from("3")));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_error_document_shape() {
        let doc = ErrorDocument::new("The address 10.0.0.1 is not in the database.");
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({"error": {"message": "The address 10.0.0.1 is not in the database."}})
        );
    }
}
