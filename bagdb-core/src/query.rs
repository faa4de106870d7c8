//! Equality-query translation for document stores.
//!
//! Criteria are plain documents: every key/value pair means "field `key` equals
//! `value`" and all pairs must hold. [`translate`] turns such a document into a
//! [`Filter`], which backends render into their native query language through the
//! [`FilterVisitor`] trait.
//!
//! ```ignore
//! use bagdb::query::{translate, Filter};
//!
//! let criteria = parse_document(r#"{"id": 3, "payload": "medium"}"#)?;
//! assert_eq!(
//!     translate(Some(&criteria)),
//!     Filter::And(vec![Filter::eq("id", 3), Filter::eq("payload", "medium")]),
//! );
//! ```
//!
//! Only equality and conjunction are expressible. There is no OR, negation, range
//! or nested-document matching.

use serde_json::Value;

use crate::{
    document::{Document, parse_document},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// A backend-independent filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Matches documents whose `field` equals `value`.
    Eq {
        /// The field name to compare.
        field: String,
        /// The value the field must equal.
        value: Value,
    },
    /// Logical AND of equality filters, kept in criteria key order.
    And(Vec<Filter>),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if this filter matches every document.
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }
}

/// Translates optional criteria into a filter.
///
/// Absent or empty criteria match everything, a single pair becomes one equality,
/// and several pairs become the conjunction of their equalities in key order.
pub fn translate(criteria: Option<&Document>) -> Filter {
    let Some(criteria) = criteria else {
        return Filter::All;
    };

    let mut equalities = criteria
        .iter()
        .map(|(field, value)| Filter::eq(field.as_str(), value.clone()))
        .collect::<Vec<_>>();

    match equalities.len() {
        0 => Filter::All,
        1 => equalities.remove(0),
        _ => Filter::And(equalities),
    }
}

/// Parses optional JSON criteria text and translates it.
///
/// # Errors
///
/// Text that is not valid JSON, or that is not a JSON object, is rejected with
/// [`DocumentStoreError::Translation`] rather than widened to match everything.
pub fn translate_json(criteria: Option<&str>) -> DocumentStoreResult<Filter> {
    match criteria {
        None => Ok(Filter::All),
        Some(text) => parse_document(text)
            .map(|document| translate(Some(&document)))
            .map_err(|err| DocumentStoreError::Translation(format!("invalid criteria `{text}`: {err}"))),
    }
}

/// Conversion into a [`Filter`] for the criteria arguments of collection operations.
pub trait IntoCriteria {
    /// Converts this value into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Translation`] for unparseable criteria text.
    fn into_filter(self) -> DocumentStoreResult<Filter>;
}

impl IntoCriteria for Filter {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        Ok(self)
    }
}

impl IntoCriteria for &Document {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        Ok(translate(Some(self)))
    }
}

impl IntoCriteria for Document {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        Ok(translate(Some(&self)))
    }
}

impl IntoCriteria for Option<&Document> {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        Ok(translate(self))
    }
}

impl IntoCriteria for &str {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        translate_json(Some(self))
    }
}

impl IntoCriteria for &String {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        translate_json(Some(self.as_str()))
    }
}

impl IntoCriteria for Option<&str> {
    fn into_filter(self) -> DocumentStoreResult<Filter> {
        translate_json(self)
    }
}

/// Renders a [`Filter`] into some backend-specific output.
pub trait FilterVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error>;
    fn visit_eq(&mut self, field: &str, value: &Value) -> Result<Self::Output, Self::Error>;
    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error>;

    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        match filter {
            Filter::All => self.visit_all(),
            Filter::Eq { field, value } => self.visit_eq(field, value),
            Filter::And(filters) => self.visit_and(filters),
        }
    }
}
