//! In-memory storage implementation for document stores.
//!
//! Each `memory://<host>` endpoint addresses its own in-process "server": a map of
//! databases to collections, each collection a vector of documents kept in
//! insertion order. All state sits behind async-safe read-write locks.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use bagdb_core::{
    backend::{CollectionBackend, StoreBackend, StoreBackendBuilder, StoreClient},
    document::{Document, IDENTITY_FIELD},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Filter,
    registry::Endpoint,
};

use crate::evaluator::{Comparable, DocumentEvaluator};

const SCHEME: &str = "memory://";

type CollectionMap = HashMap<String, Vec<Document>>;
type DatabaseMap = HashMap<String, CollectionMap>;
type ServerMap = HashMap<String, Arc<RwLock<DatabaseMap>>>;


/// Thread-safe in-memory document storage driver.
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state; clones
/// share the same servers, reachability settings and connection counter.
///
/// # Example
///
/// ```ignore
/// use bagdb_memory::InMemoryStore;
/// use bagdb::backend::{StoreBackend, StoreClient, CollectionBackend};
///
/// let store = InMemoryStore::new();
/// let client = store.connect(&"memory://localhost".into()).await?;
/// let entries = client.collection("Test", "Test");
/// entries.insert_one(document).await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// host -> databases
    servers: Arc<RwLock<ServerMap>>,
    /// Hosts whose ping currently fails
    unreachable: Arc<RwLock<HashSet<String>>>,
    /// Number of successful `connect` calls
    connections: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new in-memory driver with no servers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns how many clients this driver has connected.
    ///
    /// Together with an [`EndpointRegistry`](bagdb_core::registry::EndpointRegistry)
    /// this shows whether connections are being pooled.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Makes `host` reachable or unreachable for subsequent pings.
    pub async fn set_reachable(&self, host: &str, reachable: bool) {
        let mut unreachable = self.unreachable.write().await;

        if reachable {
            unreachable.remove(host);
        } else {
            unreachable.insert(host.to_string());
        }
    }

    fn host(endpoint: &Endpoint) -> DocumentStoreResult<&str> {
        let rest = endpoint
            .as_str()
            .strip_prefix(SCHEME)
            .ok_or_else(|| DocumentStoreError::Connection(format!(
                "invalid endpoint '{endpoint}': expected a '{SCHEME}' connection string"
            )))?;

        match rest.split('/').next() {
            Some(host) if !host.is_empty() => Ok(host),
            _ => Err(DocumentStoreError::Connection(format!(
                "invalid endpoint '{endpoint}': missing host"
            ))),
        }
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    type Client = InMemoryClient;

    const DEFAULT_ENDPOINT: &'static str = "memory://localhost";

    async fn connect(&self, endpoint: &Endpoint) -> DocumentStoreResult<Self::Client> {
        let host = Self::host(endpoint)?;
        let databases = self.servers
            .write()
            .await
            .entry(host.to_string())
            .or_default()
            .clone();

        self.connections.fetch_add(1, Ordering::SeqCst);
        debug!(%endpoint, "connected in-memory client");

        Ok(InMemoryClient {
            host: host.to_string(),
            databases,
            unreachable: self.unreachable.clone(),
        })
    }
}


/// A client of one in-memory server.
#[derive(Clone, Debug)]
pub struct InMemoryClient {
    host: String,
    databases: Arc<RwLock<DatabaseMap>>,
    unreachable: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryClient {
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl StoreClient for InMemoryClient {
    type Collection = InMemoryCollection;

    async fn ping(&self) -> DocumentStoreResult<()> {
        if self.unreachable.read().await.contains(&self.host) {
            return Err(DocumentStoreError::Connection(format!(
                "in-memory server '{}' is unreachable",
                self.host
            )));
        }

        Ok(())
    }

    fn collection(&self, database: &str, collection: &str) -> Self::Collection {
        InMemoryCollection {
            database: database.to_string(),
            collection: collection.to_string(),
            databases: self.databases.clone(),
        }
    }
}


/// One collection of an in-memory server.
///
/// Nothing is created until the first insert, so an untouched collection reads as empty.
#[derive(Clone, Debug)]
pub struct InMemoryCollection {
    database: String,
    collection: String,
    databases: Arc<RwLock<DatabaseMap>>,
}

impl InMemoryCollection {
    fn duplicate_identity(&self, documents: &[Document], id: &Value) -> bool {
        documents.iter().any(|existing| {
            existing
                .get(IDENTITY_FIELD)
                .is_some_and(|existing| Comparable::from(existing) == Comparable::from(id))
        })
    }
}

#[async_trait]
impl CollectionBackend for InMemoryCollection {
    type Native = Document;

    async fn insert_one(&self, document: Document) -> DocumentStoreResult<()> {
        let mut databases = self.databases.write().await;
        let documents = databases
            .entry(self.database.clone())
            .or_default()
            .entry(self.collection.clone())
            .or_default();

        let stored = match document.get(IDENTITY_FIELD) {
            Some(id) => {
                if self.duplicate_identity(documents, id) {
                    return Err(DocumentStoreError::Backend(format!(
                        "duplicate key in {}.{}: {IDENTITY_FIELD} {id}",
                        self.database, self.collection
                    )));
                }
                document
            }
            None => Document::from_iter(
                [(IDENTITY_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()))]
                    .into_iter()
                    .chain(document),
            ),
        };

        documents.push(stored);

        Ok(())
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> DocumentStoreResult<Vec<Document>> {
        let databases = self.databases.read().await;
        let documents = match databases
            .get(&self.database)
            .and_then(|collections| collections.get(&self.collection))
        {
            Some(documents) => documents,
            None => return Ok(vec![]),
        };

        Ok(
            documents
                .iter()
                .filter(|document| DocumentEvaluator::matches(document, filter))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect()
        )
    }

    async fn delete_one(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        let mut databases = self.databases.write().await;
        let documents = match databases
            .get_mut(&self.database)
            .and_then(|collections| collections.get_mut(&self.collection))
        {
            Some(documents) => documents,
            None => return Ok(0),
        };

        match documents
            .iter()
            .position(|document| DocumentEvaluator::matches(document, filter))
        {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        let mut databases = self.databases.write().await;
        let documents = match databases
            .get_mut(&self.database)
            .and_then(|collections| collections.get_mut(&self.collection))
        {
            Some(documents) => documents,
            None => return Ok(0),
        };

        let before = documents.len();
        documents.retain(|document| !DocumentEvaluator::matches(document, filter));

        Ok((before - documents.len()) as u64)
    }

    async fn drop_collection(&self) -> DocumentStoreResult<()> {
        let mut databases = self.databases.write().await;

        if let Some(collections) = databases.get_mut(&self.database) {
            collections.remove(&self.collection);

            if collections.is_empty() {
                databases.remove(&self.database);
            }
        }

        Ok(())
    }

    async fn count(&self) -> DocumentStoreResult<u64> {
        Ok(
            self.databases
                .read()
                .await
                .get(&self.database)
                .and_then(|collections| collections.get(&self.collection))
                .map_or(0, |documents| documents.len() as u64)
        )
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryStore::builder()
///     .unreachable("down")
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    unreachable: HashSet<String>,
}

impl InMemoryStoreBuilder {
    /// Starts the store with `host` unreachable.
    pub fn unreachable(mut self, host: impl Into<String>) -> Self {
        self.unreachable.insert(host.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore {
            unreachable: Arc::new(RwLock::new(self.unreachable)),
            ..InMemoryStore::default()
        })
    }
}
