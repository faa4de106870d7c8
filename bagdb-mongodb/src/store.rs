use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document as BsonDocument, doc, de::deserialize_from_bson, ser::serialize_to_bson};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use bagdb_core::{
    backend::{CollectionBackend, NativeDocument, StoreBackend, StoreBackendBuilder, StoreClient},
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
    query::Filter,
    registry::Endpoint,
};

use crate::{query::MongoFilterTranslator, sanitizer::KeySanitizer};


/// The MongoDB driver.
///
/// Holds the client options applied to every endpoint it connects to. Connection
/// strings use the standard `mongodb://` or `mongodb+srv://` forms.
#[derive(Debug, Clone, Default)]
pub struct MongoDbStore {
    server_selection_timeout: Option<Duration>,
    app_name: Option<String>,
}

impl MongoDbStore {
    pub fn builder() -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::default()
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    type Client = MongoDbClient;

    const DEFAULT_ENDPOINT: &'static str = "mongodb://localhost:27017";

    async fn connect(&self, endpoint: &Endpoint) -> DocumentStoreResult<Self::Client> {
        let mut options = ClientOptions::parse(endpoint.as_str())
            .await
            .map_err(|e| DocumentStoreError::Connection(e.to_string()))?;

        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }

        debug!("Creating MongoDB client for '{}'", endpoint);

        Ok(MongoDbClient {
            client: Client::with_options(options)
                .map_err(|e| DocumentStoreError::Connection(e.to_string()))?,
        })
    }
}

/// A pooled MongoDB client.
///
/// The driver multiplexes its own connection pool behind this handle, so clones
/// share every socket.
#[derive(Debug, Clone)]
pub struct MongoDbClient {
    client: Client,
}

impl MongoDbClient {
    /// Returns the underlying driver client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl StoreClient for MongoDbClient {
    type Collection = MongoDbCollection;

    async fn ping(&self) -> DocumentStoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocumentStoreError::Connection(e.to_string()))?;

        Ok(())
    }

    fn collection(&self, database: &str, collection: &str) -> Self::Collection {
        MongoDbCollection {
            collection: self.client
                .database(database)
                .collection(collection),
        }
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// One MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoDbCollection {
    collection: MongoCollection<BsonDocument>,
}

impl MongoDbCollection {
    fn prepare_document(document: &Document) -> DocumentStoreResult<BsonDocument> {
        match serialize_to_bson(&KeySanitizer::sanitize_document(document))
            .map_err(|e| DocumentStoreError::Serialization(e.to_string()))?
        {
            Bson::Document(document) => Ok(document),
            other => Err(DocumentStoreError::InvalidDocument(
                format!("Expected document, found {:?}", other.element_type())
            )),
        }
    }
}

#[async_trait]
impl CollectionBackend for MongoDbCollection {
    type Native = MongoDbDocument;

    async fn insert_one(&self, document: Document) -> DocumentStoreResult<()> {
        self.collection
            .insert_one(Self::prepare_document(&document)?)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> DocumentStoreResult<Vec<Self::Native>> {
        let mut options = FindOptions::default();

        if let Some(limit) = limit {
            options.limit = Some(limit as i64);
        }

        Ok(
            self.collection
                .find(MongoFilterTranslator::translate(filter)?)
                .with_options(options)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .try_collect::<Vec<BsonDocument>>()
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .into_iter()
                .map(MongoDbDocument)
                .collect()
        )
    }

    async fn delete_one(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        Ok(
            self.collection
                .delete_one(MongoFilterTranslator::translate(filter)?)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .deleted_count
        )
    }

    async fn delete_many(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        Ok(
            self.collection
                .delete_many(MongoFilterTranslator::translate(filter)?)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .deleted_count
        )
    }

    async fn drop_collection(&self) -> DocumentStoreResult<()> {
        self.collection
            .drop()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> DocumentStoreResult<u64> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }
}

/// A document as returned by MongoDB, keys still escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct MongoDbDocument(pub BsonDocument);

impl NativeDocument for MongoDbDocument {
    fn into_document(self) -> DocumentStoreResult<Document> {
        match deserialize_from_bson::<Value>(Bson::Document(self.0))
            .map_err(|e| DocumentStoreError::Serialization(e.to_string()))?
        {
            Value::Object(document) => Ok(KeySanitizer::restore_document(document)),
            _ => Err(DocumentStoreError::InvalidDocument("Expected document".into())),
        }
    }
}

/// Builder for [`MongoDbStore`].
#[derive(Debug, Default)]
pub struct MongoDbStoreBuilder {
    server_selection_timeout: Option<Duration>,
    app_name: Option<String>,
}

impl MongoDbStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long the driver waits for a suitable server before failing an operation,
    /// including the reachability check made when an endpoint is first resolved.
    pub fn server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(MongoDbStore {
            server_selection_timeout: self.server_selection_timeout,
            app_name: self.app_name,
        })
    }
}
