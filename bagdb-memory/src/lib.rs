//! In-memory document storage backend for bagdb.
//!
//! This crate provides a thread-safe, in-memory implementation of the backend
//! traits. It is intended for development and tests, and doubles as a stand-in
//! for a real server when exercising connection pooling.
//!
//! # Features
//!
//! - **Named servers** - every `memory://<host>` endpoint gets its own isolated data
//! - **Natural order** - collections iterate in insertion order
//! - **Identity injection** - documents without `_id` get a UUID v4 identity on insert
//! - **Test hooks** - a connection counter and per-host reachability switch
//!
//! # Quick Start
//!
//! ```ignore
//! use bagdb::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!     let entries = store.open_local("Test").await?;
//!
//!     entries.put(&parse_document(r#"{"id": 1, "key": "value 1"}"#)?).await?;
//!     assert_eq!(entries.count().await?, 1);
//!
//!     Ok(())
//! }
//! ```

pub mod store;
pub mod evaluator;

pub use store::{InMemoryClient, InMemoryCollection, InMemoryStore, InMemoryStoreBuilder};
