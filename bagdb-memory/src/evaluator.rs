//! Filter evaluation for in-memory document matching.
//!
//! Equality follows document-database semantics rather than raw JSON equality:
//! numbers compare by value regardless of integer/float representation, and
//! nested objects compare without regard to key order. Two integers always compare
//! exactly; only a float on either side falls back to `f64`.

use std::collections::HashMap;
use serde_json::{Number, Value};

use bagdb_core::{
    document::Document,
    error::DocumentStoreError,
    query::{Filter, FilterVisitor},
};


/// Comparable representation of JSON values.
///
/// Numbers compare by value, so `2` and `2.0` are equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Value> for Comparable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Bool(value) => Comparable::Bool(*value),
            Value::Number(value) => Comparable::Number(value),
            Value::String(value) => Comparable::String(value),
            Value::Array(values) => Comparable::Array(
                values
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Value::Object(map) => Comparable::Map(
                map
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => numbers_equal(a, b),
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    // a negative integer and one above i64::MAX
    if !a.is_f64() && !b.is_f64() {
        return false;
    }

    a.as_f64() == b.as_f64()
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn matches(document: &'a Document, filter: &Filter) -> bool {
        DocumentEvaluator::new(document)
            .visit_filter(filter)
            .unwrap_or(false)
    }
}

impl<'a> FilterVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(true)
    }

    fn visit_eq(&mut self, field: &str, value: &Value) -> Result<Self::Output, Self::Error> {
        Ok(
            self.document
                .get(field)
                .is_some_and(|field_value| Comparable::from(field_value) == Comparable::from(value))
        )
    }

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        for filter in filters {
            if !self.visit_filter(filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
