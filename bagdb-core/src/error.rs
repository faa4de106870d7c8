//! Error types and result types for document store operations.
//!
//! Every fallible operation in the workspace returns [`DocumentStoreResult<T>`]. The
//! variants separate resolution failures (configuration, connection) from failures
//! of individual CRUD calls so callers can branch on "did I get a usable store".

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// A required configuration option is missing or semantically invalid.
    ///
    /// Raised before any connection attempt is made.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The endpoint is malformed or could not be reached.
    ///
    /// Failed resolutions are never cached, so resolving the same endpoint again
    /// starts over from scratch.
    #[error("Connection error: {0}")]
    Connection(String),
    /// Query criteria could not be turned into a filter (e.g. the text is not a JSON object).
    #[error("Translation error: {0}")]
    Translation(String),
    /// The underlying backend rejected an insert, find, delete, drop or count.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Serialization/deserialization error when converting between document formats.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A backend-native document could not be read as a document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl DocumentStoreError {
    /// Returns `true` if this error came from configuration resolution.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DocumentStoreError::Configuration(_))
    }

    /// Returns `true` if this error came from endpoint resolution.
    pub fn is_connection(&self) -> bool {
        matches!(self, DocumentStoreError::Connection(_))
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
