//! Convenient re-exports of commonly used types from bagdb.
//!
//! ```ignore
//! use bagdb::prelude::*;
//! ```

pub use bagdb_core::{
    backend::{StoreBackend, StoreBackendBuilder, StoreClient, CollectionBackend, NativeDocument},
    collection::Collection,
    config::StoreConfig,
    document::{Document, DocumentExt, IDENTITY_FIELD, parse_document, serialize_document},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, IntoCriteria},
    registry::Endpoint,
    store::DocumentStore,
};
