//! Core types for document representation and serialization.
//!
//! A [`Document`] is an insertion-ordered JSON object. Equality is structural and does
//! not depend on key order, while iteration always follows insertion order.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value, to_value};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A schema-less record: an ordered mapping from string keys to JSON values.
pub type Document = Map<String, Value>;

/// The field backends reserve for their own record identity.
///
/// Backends add it on insert when the caller's document does not carry one. It is
/// always removed from documents handed back to callers.
pub const IDENTITY_FIELD: &str = "_id";

/// Parses JSON text into a document.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the text is not valid JSON and
/// [`DocumentStoreError::InvalidDocument`] if it is valid JSON but not an object.
pub fn parse_document(text: &str) -> DocumentStoreResult<Document> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(document) => Ok(document),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected a JSON object, found `{other}`"
        ))),
    }
}

/// Serializes a document to compact JSON text.
pub fn serialize_document(document: &Document) -> String {
    Value::Object(document.clone()).to_string()
}

/// Returns a copy of `document` without `field`, keeping the order of the other keys.
pub fn exclude_field(document: Document, field: &str) -> Document {
    document
        .into_iter()
        .filter(|(key, _)| key != field)
        .collect()
}

/// Extension trait converting serde types to and from [`Document`]s.
///
/// This trait is automatically implemented for every type that is both `Serialize`
/// and `DeserializeOwned`, so plain structs can be stored without hand-written
/// conversions.
///
/// # Example
///
/// ```ignore
/// use bagdb::document::DocumentExt;
///
/// #[derive(Serialize, Deserialize)]
/// struct Entry { id: u32, key: String }
///
/// let document = Entry { id: 1, key: "value 1".into() }.to_document()?;
/// ```
pub trait DocumentExt: Sized {
    /// Converts this value to a document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the value is not a JSON object.
    fn to_document(&self) -> DocumentStoreResult<Document>;

    /// Creates a value from a document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure does not match.
    fn from_document(document: Document) -> DocumentStoreResult<Self>;
}

impl<T: Serialize + DeserializeOwned> DocumentExt for T {
    fn to_document(&self) -> DocumentStoreResult<Document> {
        match to_value(self)? {
            Value::Object(document) => Ok(document),
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "expected a value serializing to an object, found `{other}`"
            ))),
        }
    }

    fn from_document(document: Document) -> DocumentStoreResult<Self> {
        Ok(from_value(Value::Object(document))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: u32,
        key: String,
    }

    #[test]
    fn parse_keeps_insertion_order() {
        let document = parse_document(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
        let keys: Vec<_> = document.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(matches!(
            parse_document("[1, 2]"),
            Err(DocumentStoreError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_document("{not json"),
            Err(DocumentStoreError::Serialization(_))
        ));
    }

    #[test]
    fn equality_ignores_key_order() {
        let left = parse_document(r#"{"a": 1, "b": "x"}"#).unwrap();
        let right = parse_document(r#"{"b": "x", "a": 1}"#).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn exclude_field_preserves_remaining_order() {
        let document = parse_document(r#"{"x": 1, "_id": "abc", "y": 2, "z": 3}"#).unwrap();
        let excluded = exclude_field(document, IDENTITY_FIELD);
        let keys: Vec<_> = excluded.keys().map(String::as_str).collect();
        assert_eq!(keys, ["x", "y", "z"]);
    }

    #[test]
    fn serialize_is_parseable() {
        let document = json!({"id": 1, "nested": {"k": [1, 2]}})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(parse_document(&serialize_document(&document)).unwrap(), document);
    }

    #[test]
    fn typed_values_convert() {
        let entry = Entry { id: 7, key: "seven".into() };
        let document = entry.to_document().unwrap();
        assert_eq!(document.get("id"), Some(&json!(7)));
        assert_eq!(Entry::from_document(document).unwrap(), entry);
        assert!(42u32.to_document().is_err());
    }
}
