//! Filter translation from bagdb filters to MongoDB query syntax.

use bson::{Bson, Document, doc, ser::serialize_to_bson};
use serde_json::Value;

use bagdb_core::{
    error::DocumentStoreError,
    query::{Filter, FilterVisitor},
};

use crate::sanitizer::KeySanitizer;


/// Translates bagdb filters into MongoDB query documents.
///
/// Field names are escaped the same way stored keys are, so criteria keep
/// addressing the fields they were written against.
pub(crate) struct MongoFilterTranslator;

impl MongoFilterTranslator {
    pub(crate) fn translate(filter: &Filter) -> Result<Document, DocumentStoreError> {
        MongoFilterTranslator.visit_filter(filter)
    }
}

impl FilterVisitor for MongoFilterTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(doc! {})
    }

    fn visit_eq(&mut self, field: &str, value: &Value) -> Result<Self::Output, Self::Error> {
        let value: Bson = match value {
            Value::Object(document) => serialize_to_bson(&KeySanitizer::sanitize_document(document)),
            _ => serialize_to_bson(value),
        }
        .map_err(|e| DocumentStoreError::Translation(e.to_string()))?;

        Ok(doc! {
            KeySanitizer::sanitize_key(field): { "$eq": value },
        })
    }

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": filters
                .iter()
                .map(|filter| self.visit_filter(filter))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
