//! Storage backend abstraction for the document store.
//!
//! A backend is described by three layers of capability, mirroring how document
//! database drivers are usually shaped:
//!
//! - [`StoreBackend`]: the driver itself, able to connect to an [`Endpoint`]
//! - [`StoreClient`]: one live connection, able to verify reachability and hand out
//!   collection references
//! - [`CollectionBackend`]: one collection, supporting insert/find/delete/drop/count
//!
//! Documents come back from a backend in its native representation
//! ([`NativeDocument`]) and are projected into caller documents by
//! [`crate::projection`].
//!
//! # Examples
//!
//! ```ignore
//! use bagdb::backend::{StoreBackend, StoreClient, CollectionBackend};
//!
//! let client = backend.connect(&Endpoint::new("memory://localhost")).await?;
//! client.ping().await?;
//!
//! let users = client.collection("app", "users");
//! users.insert_one(document).await?;
//! assert_eq!(users.count().await?, 1);
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    document::Document,
    error::DocumentStoreResult,
    query::Filter,
    registry::Endpoint,
};

/// A backend driver able to open client connections.
///
/// Implementations must be thread-safe. A driver is normally owned by an
/// [`EndpointRegistry`](crate::registry::EndpointRegistry), which calls
/// [`connect`](StoreBackend::connect) at most once per endpoint for as long as the
/// resulting client stays pooled.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug + 'static {
    /// The connection type produced by this driver.
    type Client: StoreClient;

    /// The endpoint used when a configuration does not name one.
    const DEFAULT_ENDPOINT: &'static str;

    /// Establishes a client for `endpoint`.
    ///
    /// Connecting is not required to contact the server; reachability is checked
    /// separately through [`StoreClient::ping`].
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`](crate::error::DocumentStoreError::Connection)
    /// if the endpoint is malformed or the client cannot be created.
    async fn connect(&self, endpoint: &Endpoint) -> DocumentStoreResult<Self::Client>;
}

/// A live client connection to one endpoint.
///
/// Clients are cheap to clone; clones share the same underlying connection.
#[async_trait]
pub trait StoreClient: Clone + Send + Sync + Debug + 'static {
    /// The collection reference type handed out by this client.
    type Collection: CollectionBackend;

    /// Verifies that the endpoint is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`](crate::error::DocumentStoreError::Connection)
    /// if the server cannot be reached.
    async fn ping(&self) -> DocumentStoreResult<()>;

    /// Returns a reference to `collection` in `database`.
    ///
    /// Databases and collections are created lazily by the backend, so this never
    /// fails. A missing collection is indistinguishable from an empty one until
    /// something is written to it.
    fn collection(&self, database: &str, collection: &str) -> Self::Collection;

    /// Cleanly shuts down the client, releasing its resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()> {
        Ok(())
    }
}

/// Operations on a single backend collection.
#[async_trait]
pub trait CollectionBackend: Send + Sync + Debug + 'static {
    /// The representation documents are returned in.
    type Native: NativeDocument;

    /// Inserts one document, letting the backend add its identity field if absent.
    async fn insert_one(&self, document: Document) -> DocumentStoreResult<()>;

    /// Finds documents matching `filter` in the backend's natural order, returning
    /// at most `limit` of them when a limit is given.
    async fn find(
        &self,
        filter: &Filter,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Self::Native>>;

    /// Deletes the first document matching `filter`, returning how many were removed.
    async fn delete_one(&self, filter: &Filter) -> DocumentStoreResult<u64>;

    /// Deletes every document matching `filter`, returning how many were removed.
    async fn delete_many(&self, filter: &Filter) -> DocumentStoreResult<u64>;

    /// Drops the collection and all of its documents.
    ///
    /// # Warning
    ///
    /// This operation is irreversible.
    async fn drop_collection(&self) -> DocumentStoreResult<()>;

    /// Counts the documents currently in the collection.
    async fn count(&self) -> DocumentStoreResult<u64>;
}

/// A document in a backend's own representation.
pub trait NativeDocument: Send + 'static {
    /// Converts this native document into a caller [`Document`], identity field included.
    fn into_document(self) -> DocumentStoreResult<Document>;
}

impl NativeDocument for Document {
    fn into_document(self) -> DocumentStoreResult<Document> {
        Ok(self)
    }
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend,
{
    type Client = B::Client;

    const DEFAULT_ENDPOINT: &'static str = B::DEFAULT_ENDPOINT;

    async fn connect(&self, endpoint: &Endpoint) -> DocumentStoreResult<Self::Client> {
        (**self).connect(endpoint).await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
