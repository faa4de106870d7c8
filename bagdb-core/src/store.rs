//! Main document store interface: the composition root that owns the endpoint
//! registry and hands out [`Collection`]s.
//!
//! # Example
//!
//! ```ignore
//! use bagdb::{prelude::*, memory::InMemoryStore};
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!
//! let entries = store.open_local("Test").await?;
//! entries.put(&parse_document(r#"{"id": 1}"#)?).await?;
//! assert_eq!(entries.name(), "Test.Test");
//! ```

use std::collections::HashMap;

use crate::{
    backend::StoreBackend,
    collection::Collection,
    config::StoreConfig,
    error::DocumentStoreResult,
    handle::CollectionHandle,
    registry::{Endpoint, EndpointRegistry},
};

/// A document store bound to one backend driver.
///
/// The store owns the [`EndpointRegistry`], so every collection opened through it
/// shares pooled clients. Create one store per application and pass it by
/// reference to whatever needs collections.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    registry: EndpointRegistry<B>,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            registry: EndpointRegistry::new(backend),
        }
    }

    /// Returns the registry holding this store's pooled clients.
    pub fn registry(&self) -> &EndpointRegistry<B> {
        &self.registry
    }

    /// Opens `collection` in `database` on `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`](crate::error::DocumentStoreError::Connection)
    /// if the endpoint is malformed or unreachable.
    pub async fn open(
        &self,
        endpoint: impl Into<Endpoint>,
        database: &str,
        collection: &str,
    ) -> DocumentStoreResult<Collection<B>> {
        let handle = CollectionHandle::open(&self.registry, &endpoint.into(), database, collection).await?;

        Ok(Collection::new(handle))
    }

    /// Opens several collections of one database on `endpoint`, keyed by collection name.
    ///
    /// The endpoint is resolved once for all of them. A name listed more than once
    /// opens a single collection.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub async fn open_many<S: AsRef<str>>(
        &self,
        endpoint: impl Into<Endpoint>,
        database: &str,
        collections: &[S],
    ) -> DocumentStoreResult<HashMap<String, Collection<B>>> {
        let endpoint = endpoint.into();
        let client = self.registry.resolve(&endpoint).await?;

        let mut opened = HashMap::with_capacity(collections.len());

        for name in collections {
            let name: &str = name.as_ref();

            if opened.contains_key(name) {
                continue;
            }

            let handle = CollectionHandle::bind(&client, endpoint.clone(), database, name);
            opened.insert(name.to_string(), Collection::new(handle));
        }

        Ok(opened)
    }

    /// Opens `collection` on the backend's default endpoint, in a database of the same name.
    pub async fn open_local(&self, collection: &str) -> DocumentStoreResult<Collection<B>> {
        self.open(B::DEFAULT_ENDPOINT, collection, collection).await
    }

    /// Opens several collections of `database` on the backend's default endpoint.
    pub async fn open_local_many<S: AsRef<str>>(
        &self,
        database: &str,
        collections: &[S],
    ) -> DocumentStoreResult<HashMap<String, Collection<B>>> {
        self.open_many(B::DEFAULT_ENDPOINT, database, collections).await
    }

    /// Opens the collections named by a configuration, keyed by collection name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Configuration`](crate::error::DocumentStoreError::Configuration)
    /// before any connection attempt if the configuration is incomplete, otherwise the
    /// errors of [`open_many`](Self::open_many).
    pub async fn connect_config(
        &self,
        config: &StoreConfig,
    ) -> DocumentStoreResult<HashMap<String, Collection<B>>> {
        let resolved = config.resolve(B::DEFAULT_ENDPOINT)?;

        self.open_many(
            resolved.endpoint,
            &resolved.database_name,
            &resolved.collection_names,
        )
        .await
    }

    /// Shuts down every pooled client.
    ///
    /// Collections opened from this store must not be used afterwards.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.registry.shutdown().await
    }
}
