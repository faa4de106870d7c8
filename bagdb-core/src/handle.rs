//! Binding of a (database, collection) pair to a backend collection reference.

use std::fmt;

use crate::{
    backend::{StoreBackend, StoreClient},
    error::DocumentStoreResult,
    registry::{Endpoint, EndpointRegistry},
};

/// A named (database, collection) pair bound to one backend collection.
///
/// Handles are never mutated after they are opened. Only the client connection
/// behind them is pooled; every handle owns its own collection reference.
#[derive(Debug)]
pub struct CollectionHandle<B: StoreBackend> {
    endpoint: Endpoint,
    database: String,
    collection: String,
    backend: <B::Client as StoreClient>::Collection,
}

impl<B: StoreBackend> CollectionHandle<B> {
    /// Opens `collection` in `database` on `endpoint`.
    ///
    /// The client comes from `registry`, so handles opened against the same endpoint
    /// share one connection. Database and collection are created lazily by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`](crate::error::DocumentStoreError::Connection)
    /// if the endpoint cannot be resolved.
    pub async fn open(
        registry: &EndpointRegistry<B>,
        endpoint: &Endpoint,
        database: &str,
        collection: &str,
    ) -> DocumentStoreResult<Self> {
        let client = registry.resolve(endpoint).await?;

        Ok(Self::bind(&client, endpoint.clone(), database, collection))
    }

    pub(crate) fn bind(client: &B::Client, endpoint: Endpoint, database: &str, collection: &str) -> Self {
        Self {
            endpoint,
            database: database.to_string(),
            collection: collection.to_string(),
            backend: client.collection(database, collection),
        }
    }

    /// Returns the display name, `"{database}.{collection}"`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Returns the backend collection reference.
    pub fn backend(&self) -> &<B::Client as StoreClient>::Collection {
        &self.backend
    }
}

impl<B: StoreBackend> fmt::Display for CollectionHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}
