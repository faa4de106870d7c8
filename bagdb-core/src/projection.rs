//! Projection of backend-native documents into caller documents.
//!
//! Backends hand back documents in their own representation and with their own
//! identity field attached. Projection converts them into [`Document`]s and strips
//! [`IDENTITY_FIELD`] so the caller never sees backend-assigned identity.

use crate::{
    backend::NativeDocument,
    document::{Document, IDENTITY_FIELD, exclude_field},
    error::DocumentStoreResult,
};

/// Projects an optional native document.
///
/// `None` stays `None`. Otherwise the document is converted and the identity field
/// is removed, whether the backend added it or the caller supplied it.
///
/// # Errors
///
/// Returns an error if the native document cannot be converted.
pub fn project<N: NativeDocument>(native: Option<N>) -> DocumentStoreResult<Option<Document>> {
    native
        .map(|native| Ok(exclude_field(native.into_document()?, IDENTITY_FIELD)))
        .transpose()
}

/// Projects every native document in backend iteration order.
///
/// # Errors
///
/// Returns the first conversion error encountered.
pub fn project_all<N: NativeDocument>(
    natives: impl IntoIterator<Item = N>,
) -> DocumentStoreResult<Vec<Document>> {
    natives
        .into_iter()
        .map(|native| Ok(exclude_field(native.into_document()?, IDENTITY_FIELD)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn absent_stays_absent() {
        assert_eq!(project::<Document>(None).unwrap(), None);
    }

    #[test]
    fn identity_is_removed() {
        let native = document(json!({"_id": "0f3c", "id": 1, "key": "value 1"}));
        assert_eq!(
            project(Some(native)).unwrap(),
            Some(document(json!({"id": 1, "key": "value 1"})))
        );
    }

    #[test]
    fn documents_without_identity_pass_through() {
        let native = document(json!({"id": 1, "nested": {"_id": "kept"}}));
        assert_eq!(project(Some(native.clone())).unwrap(), Some(native));
    }

    #[test]
    fn sequences_keep_order() {
        let projected = project_all(vec![
            document(json!({"_id": 1, "n": "first"})),
            document(json!({"_id": 2, "n": "second"})),
        ])
        .unwrap();
        assert_eq!(
            projected,
            vec![document(json!({"n": "first"})), document(json!({"n": "second"}))]
        );
    }
}
