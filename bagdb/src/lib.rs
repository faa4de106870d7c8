//! Main bagdb crate providing a uniform interface over document stores.
//!
//! This crate is the primary entry point for users of bagdb. It re-exports the
//! core types from the sub-crates and provides access to the storage backends.
//!
//! # Features
//!
//! - **Schema-less documents** - Store and retrieve arbitrary JSON objects
//! - **Equality criteria** - Select documents with a criteria document or its JSON text
//! - **Pooled endpoints** - One verified client per endpoint, shared by every collection
//! - **Configuration documents** - Resolve collections from `collectionName`/`databaseName`
//!   style configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use bagdb::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!     let entries = store.open("memory://localhost", "Test", "Test").await?;
//!
//!     entries
//!         .put(&parse_document(r#"{"id": 1, "payload": "small"}"#)?).await?
//!         .put(&parse_document(r#"{"id": 2, "payload": "medium"}"#)?).await?;
//!
//!     // Criteria may be a document, its JSON text, a filter, or `None` for everything
//!     let medium = entries.get(r#"{"payload": "medium"}"#).await?;
//!     println!("{:?}", medium.map(|document| serialize_document(&document)));
//!
//!     entries.delete_all().await?;
//!     store.shutdown().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Collections can also be resolved from a configuration document:
//!
//! ```ignore
//! let config = StoreConfig::from_json(r#"{"databaseName": "mvn-test", "collectionNames": ["bongo"]}"#)?;
//! let collections = store.connect_config(&config).await?;
//! let bongo = &collections["bongo"];
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use bagdb_core::{
    backend, collection, config, document, error, handle, projection, query, registry, store,
};

// Re-exported so callers can build documents without a direct dependency
pub use serde_json;

/// In-memory storage backend implementations.
pub mod memory {
    pub use bagdb_memory::{InMemoryClient, InMemoryCollection, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use bagdb_mongodb::{MongoDbClient, MongoDbCollection, MongoDbDocument, MongoDbStore, MongoDbStoreBuilder};
}
