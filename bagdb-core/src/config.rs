//! Configuration documents for resolving collections.
//!
//! A configuration is a JSON object with camelCase keys:
//!
//! | Key | Meaning |
//! |---|---|
//! | `collectionName` | collection to open; required unless `collectionNames` is given |
//! | `connectionString` | endpoint; defaults to the backend's local endpoint |
//! | `databaseName` | database; defaults to `collectionName` |
//! | `collectionNames` | several collections to open in the same database |
//!
//! ```ignore
//! let config = StoreConfig::from_json(r#"{"collectionName": "bongo"}"#)?;
//! let collections = store.connect_config(&config).await?;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
    registry::Endpoint,
};

/// The recognized options of a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_names: Option<Vec<String>>,
}

/// A configuration with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub endpoint: Endpoint,
    pub database_name: String,
    /// Collections to open, `collectionName` first, without duplicates.
    pub collection_names: Vec<String>,
}

impl StoreConfig {
    /// Creates a configuration for a single collection.
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: Some(collection_name.into()),
            ..Self::default()
        }
    }

    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }

    pub fn with_collection_names<I, S>(mut self, collection_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collection_names = Some(collection_names.into_iter().map(Into::into).collect());
        self
    }

    /// Reads a configuration from a document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Configuration`] if a recognized option has the
    /// wrong type.
    pub fn from_document(document: &Document) -> DocumentStoreResult<Self> {
        serde_json::from_value(Value::Object(document.clone()))
            .map_err(|err| DocumentStoreError::Configuration(err.to_string()))
    }

    /// Reads a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Configuration`] if the text is not a valid
    /// configuration object.
    pub fn from_json(text: &str) -> DocumentStoreResult<Self> {
        serde_json::from_str(text).map_err(|err| DocumentStoreError::Configuration(err.to_string()))
    }

    /// Applies defaults and validates the configuration.
    ///
    /// `default_endpoint` is used when no connection string is given.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Configuration`] if no collection is named, a
    /// name is empty, or the database cannot be determined.
    pub fn resolve(&self, default_endpoint: &str) -> DocumentStoreResult<ResolvedConfig> {
        let collection_name = non_empty("collectionName", self.collection_name.as_deref())?;

        let mut collection_names = Vec::new();
        for name in collection_name
            .into_iter()
            .chain(self.collection_names.iter().flatten().map(String::as_str))
        {
            if name.is_empty() {
                return Err(DocumentStoreError::Configuration(
                    "collection names must not be empty".into(),
                ));
            }
            if !collection_names.iter().any(|known| known == name) {
                collection_names.push(name.to_string());
            }
        }

        if collection_names.is_empty() {
            return Err(DocumentStoreError::Configuration(
                "missing 'collectionName'".into(),
            ));
        }

        let database_name = non_empty("databaseName", self.database_name.as_deref())?
            .or(collection_name)
            .ok_or_else(|| {
                DocumentStoreError::Configuration(
                    "missing 'databaseName' (required when only 'collectionNames' is given)".into(),
                )
            })?;

        let endpoint = non_empty("connectionString", self.connection_string.as_deref())?
            .unwrap_or(default_endpoint);

        Ok(ResolvedConfig {
            endpoint: Endpoint::new(endpoint),
            database_name: database_name.to_string(),
            collection_names,
        })
    }
}

fn non_empty<'a>(key: &str, value: Option<&'a str>) -> DocumentStoreResult<Option<&'a str>> {
    match value {
        Some("") => Err(DocumentStoreError::Configuration(format!("'{key}' must not be empty"))),
        other => Ok(other),
    }
}
