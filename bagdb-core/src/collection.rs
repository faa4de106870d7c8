//! The document store adapter: CRUD operations on one collection.
//!
//! A [`Collection`] wraps a [`CollectionHandle`] and exposes the uniform document
//! surface. Read and delete calls translate their criteria into a
//! [`Filter`](crate::query::Filter), every call issues exactly one backend request
//! (`put_many` issues one per document, in order), and returned documents are
//! projected so the backend identity field never leaks.
//!
//! # Example
//!
//! ```ignore
//! let entries = store.open_local("Test").await?;
//!
//! entries
//!     .put(&parse_document(r#"{"id": 1, "payload": "full"}"#)?).await?
//!     .put(&parse_document(r#"{"id": 2, "payload": "medium"}"#)?).await?;
//!
//! let medium = entries.get_many(r#"{"payload": "medium"}"#).await?;
//! assert_eq!(medium.len(), 1);
//! ```

use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

use crate::{
    backend::{CollectionBackend, StoreBackend},
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    handle::CollectionHandle,
    projection::{project, project_all},
    query::{Filter, IntoCriteria},
};

/// CRUD access to one collection of schema-less documents.
///
/// Write operations return `&Self` so calls can be chained. "Nothing matched" is
/// never an error: `get` returns `None` and deletes simply remove nothing.
#[derive(Debug)]
pub struct Collection<B: StoreBackend> {
    handle: CollectionHandle<B>,
}

impl<B: StoreBackend> Collection<B> {
    pub(crate) fn new(handle: CollectionHandle<B>) -> Self {
        info!(collection = %handle, "Connected to '{}'", handle);
        Self { handle }
    }

    /// Returns the stable display name, `"{database}.{collection}"`.
    pub fn name(&self) -> String {
        self.handle.name()
    }

    /// Returns the underlying collection handle.
    pub fn handle(&self) -> &CollectionHandle<B> {
        &self.handle
    }

    /// Inserts one document.
    ///
    /// The caller's document is not modified; the backend may add its identity
    /// field to the stored copy.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the insert fails.
    pub async fn put(&self, document: &Document) -> DocumentStoreResult<&Self> {
        self.handle
            .backend()
            .insert_one(document.clone())
            .await?;

        Ok(self)
    }

    /// Inserts documents one at a time, in order.
    ///
    /// # Errors
    ///
    /// The first failing insert aborts the remaining ones. Documents inserted
    /// before the failure stay in the collection.
    pub async fn put_many<'d>(
        &self,
        documents: impl IntoIterator<Item = &'d Document>,
    ) -> DocumentStoreResult<&Self> {
        for document in documents {
            self.put(document).await?;
        }

        Ok(self)
    }

    /// Serializes `value` and inserts it as a document.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not serialize to an object or the insert fails.
    pub async fn put_value<T: Serialize + DeserializeOwned>(&self, value: &T) -> DocumentStoreResult<&Self> {
        self.put(&value.to_document()?).await
    }

    /// Returns the first document matching `criteria`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Translation`](crate::error::DocumentStoreError::Translation)
    /// for unparseable criteria, or the backend's error.
    pub async fn get(&self, criteria: impl IntoCriteria) -> DocumentStoreResult<Option<Document>> {
        let filter = criteria.into_filter()?;
        let found = self
            .handle
            .backend()
            .find(&filter, Some(1))
            .await?;

        project(found.into_iter().next())
    }

    /// Returns the first document matching `criteria` deserialized as `T`.
    pub async fn get_as<T: DeserializeOwned + Serialize>(
        &self,
        criteria: impl IntoCriteria,
    ) -> DocumentStoreResult<Option<T>> {
        self.get(criteria)
            .await?
            .map(T::from_document)
            .transpose()
    }

    /// Returns every document matching `criteria`, in the backend's natural order.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn get_many(&self, criteria: impl IntoCriteria) -> DocumentStoreResult<Vec<Document>> {
        let filter = criteria.into_filter()?;

        project_all(
            self.handle
                .backend()
                .find(&filter, None)
                .await?,
        )
    }

    /// Returns every document matching `criteria` deserialized as `T`.
    pub async fn get_many_as<T: DeserializeOwned + Serialize>(
        &self,
        criteria: impl IntoCriteria,
    ) -> DocumentStoreResult<Vec<T>> {
        self.get_many(criteria)
            .await?
            .into_iter()
            .map(T::from_document)
            .collect()
    }

    /// Returns every document in the collection. An empty collection yields an empty vector.
    pub async fn get_all(&self) -> DocumentStoreResult<Vec<Document>> {
        self.get_many(Filter::All).await
    }

    /// Removes the first document matching `criteria`, if any.
    pub async fn delete(&self, criteria: impl IntoCriteria) -> DocumentStoreResult<&Self> {
        let filter = criteria.into_filter()?;
        self.handle
            .backend()
            .delete_one(&filter)
            .await?;

        Ok(self)
    }

    /// Removes every document matching `criteria`.
    pub async fn delete_many(&self, criteria: impl IntoCriteria) -> DocumentStoreResult<&Self> {
        let filter = criteria.into_filter()?;
        self.handle
            .backend()
            .delete_many(&filter)
            .await?;

        Ok(self)
    }

    /// Removes every document, leaving an empty collection.
    pub async fn delete_all(&self) -> DocumentStoreResult<&Self> {
        self.delete_many(Filter::All).await
    }

    /// Destroys the collection and everything in it.
    ///
    /// # Warning
    ///
    /// This operation is irreversible.
    pub async fn drop(self) -> DocumentStoreResult<()> {
        self.handle
            .backend()
            .drop_collection()
            .await?;

        info!(collection = %self.handle, "Dropped '{}'", self.handle);

        Ok(())
    }

    /// Returns the number of documents currently in the collection.
    pub async fn count(&self) -> DocumentStoreResult<u64> {
        self.handle.backend().count().await
    }

    /// Releases this adapter.
    ///
    /// The pooled client stays open; its lifetime belongs to the
    /// [`EndpointRegistry`](crate::registry::EndpointRegistry).
    pub fn close(self) {
        info!(collection = %self.handle, "Closed '{}'", self.handle);
    }
}
