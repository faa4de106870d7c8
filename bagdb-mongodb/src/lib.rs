//! MongoDB backend implementation for bagdb.
//!
//! This crate provides a MongoDB-based implementation of the backend traits,
//! storing documents in MongoDB collections through the official async driver.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bagdb = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to self-hosted MongoDB or MongoDB Atlas
//! - **Driver pooling** - Each resolved endpoint keeps one driver client with its own pool
//! - **Key escaping** - Dots, dollar signs and null bytes in field names are escaped on
//!   write and restored on read
//!
//! # Connection
//!
//! Endpoints are MongoDB connection strings. When a configuration names none, the
//! local server at `mongodb://localhost:27017` is used.
//!
//! # Example
//!
//! ```ignore
//! use bagdb::{prelude::*, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(MongoDbStore::builder().build().await?);
//!     let entries = store.open_local("Test").await?;
//!
//!     println!("{} holds {} documents", entries.name(), entries.count().await?);
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod store;
mod query;
mod sanitizer;

pub use store::{MongoDbClient, MongoDbCollection, MongoDbDocument, MongoDbStore, MongoDbStoreBuilder};
