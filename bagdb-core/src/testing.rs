//! A small counting backend used by the unit tests of this crate.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    backend::{CollectionBackend, StoreBackend, StoreClient},
    document::{Document, IDENTITY_FIELD},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Filter,
    registry::Endpoint,
};

type Collections = HashMap<(String, String), Vec<Document>>;

#[derive(Debug, Default)]
struct Counters {
    connects: AtomicUsize,
    pings: AtomicUsize,
    shutdowns: AtomicUsize,
    unreachable: AtomicBool,
}

#[derive(Debug, Default)]
pub(crate) struct StubBackend {
    counters: Arc<Counters>,
    data: Arc<RwLock<Collections>>,
    slow: bool,
}

impl StubBackend {
    pub(crate) fn slow() -> Self {
        Self {
            slow: true,
            ..Self::default()
        }
    }

    pub(crate) fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn pings(&self) -> usize {
        self.counters.pings.load(Ordering::SeqCst)
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.counters.shutdowns.load(Ordering::SeqCst)
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.counters.unreachable.store(!reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreBackend for StubBackend {
    type Client = StubClient;

    const DEFAULT_ENDPOINT: &'static str = "stub://localhost";

    async fn connect(&self, endpoint: &Endpoint) -> DocumentStoreResult<StubClient> {
        if !endpoint.as_str().starts_with("stub://") {
            return Err(DocumentStoreError::Connection(format!("unsupported endpoint {endpoint}")));
        }

        if self.slow {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let id = self.counters.connects.fetch_add(1, Ordering::SeqCst);

        Ok(StubClient {
            id,
            counters: self.counters.clone(),
            data: self.data.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StubClient {
    id: usize,
    counters: Arc<Counters>,
    data: Arc<RwLock<Collections>>,
}

impl StubClient {
    pub(crate) fn id(&self) -> usize {
        self.id
    }
}

#[async_trait]
impl StoreClient for StubClient {
    type Collection = StubCollection;

    async fn ping(&self) -> DocumentStoreResult<()> {
        self.counters.pings.fetch_add(1, Ordering::SeqCst);

        if self.counters.unreachable.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Connection("stub unreachable".into()));
        }

        Ok(())
    }

    fn collection(&self, database: &str, collection: &str) -> StubCollection {
        StubCollection {
            key: (database.to_string(), collection.to_string()),
            data: self.data.clone(),
        }
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct StubCollection {
    key: (String, String),
    data: Arc<RwLock<Collections>>,
}

fn matches(document: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq { field, value } => document.get(field) == Some(value),
        Filter::And(filters) => filters.iter().all(|filter| matches(document, filter)),
    }
}

#[async_trait]
impl CollectionBackend for StubCollection {
    type Native = Document;

    async fn insert_one(&self, document: Document) -> DocumentStoreResult<()> {
        if document.get("reject") == Some(&Value::Bool(true)) {
            return Err(DocumentStoreError::Backend("rejected by stub".into()));
        }

        let mut data = self.data.write().await;
        let documents = data.entry(self.key.clone()).or_default();
        let mut stored = Document::new();

        if !document.contains_key(IDENTITY_FIELD) {
            stored.insert(IDENTITY_FIELD.into(), documents.len().into());
        }

        stored.extend(document);
        documents.push(stored);

        Ok(())
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> DocumentStoreResult<Vec<Document>> {
        Ok(self
            .data
            .read()
            .await
            .get(&self.key)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, filter))
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_one(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        let mut data = self.data.write().await;
        let Some(documents) = data.get_mut(&self.key) else {
            return Ok(0);
        };

        match documents.iter().position(|document| matches(document, filter)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> DocumentStoreResult<u64> {
        let mut data = self.data.write().await;
        let Some(documents) = data.get_mut(&self.key) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|document| !matches(document, filter));

        Ok((before - documents.len()) as u64)
    }

    async fn drop_collection(&self) -> DocumentStoreResult<()> {
        self.data.write().await.remove(&self.key);
        Ok(())
    }

    async fn count(&self) -> DocumentStoreResult<u64> {
        Ok(self
            .data
            .read()
            .await
            .get(&self.key)
            .map_or(0, |documents| documents.len() as u64))
    }
}
