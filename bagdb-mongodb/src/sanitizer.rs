//! Field name sanitization for MongoDB compatibility.
//!
//! MongoDB restricts field names: dots address nested fields, a leading dollar sign
//! marks an operator, and null bytes terminate keys. Documents are free-form, so
//! keys are percent-escaped on the way in (`%` itself included, so any key
//! round-trips) and restored on the way out. Values are stored untouched.

use serde_json::Value;

use bagdb_core::document::Document;


/// Escapes and restores document keys that MongoDB would reject or misread.
pub(crate) struct KeySanitizer;

impl KeySanitizer {
    /// Escape sequences, the escape character itself first.
    const ESCAPES: [(char, &'static str); 4] = [
        ('%', "%25"),
        ('.', "%2E"),
        ('$', "%24"),
        ('\0', "%00"),
    ];

    /// Recursively escapes the keys of a document, including documents nested in arrays.
    pub(crate) fn sanitize_document(document: &Document) -> Document {
        document
            .iter()
            .map(|(k, v)| (Self::sanitize_key(k), Self::sanitize_value(v)))
            .collect()
    }

    fn sanitize_value(value: &Value) -> Value {
        match value {
            Value::Object(document) => Value::Object(Self::sanitize_document(document)),
            Value::Array(values) => Value::Array(
                values
                    .iter()
                    .map(Self::sanitize_value)
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    /// Escapes problematic characters in a single key.
    pub(crate) fn sanitize_key(input: &str) -> String {
        let mut sanitized = String::with_capacity(input.len());
        for c in input.chars() {
            match Self::ESCAPES.iter().find(|(target, _)| *target == c) {
                Some((_, escape)) => sanitized.push_str(escape),
                None => sanitized.push(c),
            }
        }
        sanitized
    }

    /// Recursively restores the keys of a document read back from MongoDB.
    ///
    /// This is the inverse of [`sanitize_document`](Self::sanitize_document).
    pub(crate) fn restore_document(document: Document) -> Document {
        document
            .into_iter()
            .map(|(k, v)| (Self::restore_key(&k), Self::restore_value(v)))
            .collect()
    }

    fn restore_value(value: Value) -> Value {
        match value {
            Value::Object(document) => Value::Object(Self::restore_document(document)),
            Value::Array(values) => Value::Array(
                values
                    .into_iter()
                    .map(Self::restore_value)
                    .collect(),
            ),
            other => other,
        }
    }

    /// Reverts the escapes of a single key.
    ///
    /// Unknown `%` sequences are kept as they are.
    pub(crate) fn restore_key(input: &str) -> String {
        let mut restored = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(index) = rest.find('%') {
            restored.push_str(&rest[..index]);
            rest = &rest[index..];

            match Self::ESCAPES.iter().find(|(_, escape)| rest.starts_with(escape)) {
                Some((target, escape)) => {
                    restored.push(*target);
                    rest = &rest[escape.len()..];
                }
                None => {
                    restored.push('%');
                    rest = &rest[1..];
                }
            }
        }

        restored.push_str(rest);
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_escaped_at_every_depth() {
        let document = json!({
            "a.b": 1,
            "$set": {"x.y": "keep.this$"},
            "list": [{"k.k": true}, "plain.value"],
        })
        .as_object()
        .cloned()
        .unwrap();

        let sanitized = KeySanitizer::sanitize_document(&document);

        assert_eq!(
            Value::Object(sanitized.clone()),
            json!({
                "a%2Eb": 1,
                "%24set": {"x%2Ey": "keep.this$"},
                "list": [{"k%2Ek": true}, "plain.value"],
            })
        );
        assert_eq!(KeySanitizer::restore_document(sanitized), document);
    }

    #[test]
    fn keys_resembling_escapes_round_trip() {
        let document = json!({
            "my__dot__key": 1,
            "cost__dollar__": 2,
            "100%": 3,
            "%2E": 4,
            "%%24.$\0": 5,
        })
        .as_object()
        .cloned()
        .unwrap();

        let sanitized = KeySanitizer::sanitize_document(&document);

        assert!(sanitized.keys().all(|key| !key.contains(['.', '$', '\0'])));
        assert_eq!(sanitized.get("100%25"), Some(&json!(3)));
        assert_eq!(KeySanitizer::restore_document(sanitized), document);
    }

    #[test]
    fn stray_percent_signs_are_kept_on_restore() {
        assert_eq!(KeySanitizer::restore_key("50%off"), "50%off");
        assert_eq!(KeySanitizer::restore_key("trailing%"), "trailing%");
    }

    #[test]
    fn ordinary_keys_are_untouched() {
        assert_eq!(KeySanitizer::sanitize_key("payload"), "payload");
        assert_eq!(KeySanitizer::sanitize_key("_id"), "_id");
        assert_eq!(KeySanitizer::restore_key("payload"), "payload");
    }
}
