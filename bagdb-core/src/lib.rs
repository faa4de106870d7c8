//! A uniform access layer over schema-less document stores.
//!
//! This crate is the core of the bagdb project and provides:
//!
//! - **Documents** ([`document`]) - The ordered JSON document model and serde conversions
//! - **Query translation** ([`query`]) - Equality criteria to backend-independent filters
//! - **Result projection** ([`projection`]) - Native documents to caller documents, identity masked
//! - **Backend abstraction** ([`backend`]) - Traits implemented by concrete drivers
//! - **Endpoint registry** ([`registry`]) - Pooling of verified clients per endpoint
//! - **Collection handles** ([`handle`]) - (database, collection) bindings
//! - **Collections** ([`collection`]) - The CRUD adapter
//! - **Configuration** ([`config`]) - Configuration documents for resolving collections
//! - **Document store** ([`store`]) - The composition root owning the registry
//! - **Error handling** ([`error`]) - Error taxonomy and result types
//!
//! # Example
//!
//! ```ignore
//! use bagdb::{prelude::*, memory::InMemoryStore};
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//! let entries = store.open("memory://localhost", "Test", "Test").await?;
//!
//! entries.put(&parse_document(r#"{"id": 2, "payload": "medium"}"#)?).await?;
//!
//! let found = entries.get(r#"{"payload": "medium"}"#).await?;
//! ```

pub mod backend;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod handle;
pub mod projection;
pub mod query;
pub mod registry;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
