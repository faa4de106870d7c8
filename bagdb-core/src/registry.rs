//! Pooling of verified backend clients keyed by endpoint identity.
//!
//! The [`EndpointRegistry`] is the only shared mutable state of the document store.
//! It is an explicit object owned by the application's composition root (normally a
//! [`DocumentStore`](crate::store::DocumentStore)) and passed by reference to every
//! [`CollectionHandle`](crate::handle::CollectionHandle) that needs a client.
//!
//! Each endpoint gets its own slot guarded by an async lock. The lock is held while a
//! client is connected and pinged, so concurrent resolutions of the same endpoint
//! never open two connections, while different endpoints resolve independently.
//! A slot whose resolution failed is removed again once no other caller holds it.

use mea::rwlock::RwLock;
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, warn};

use crate::{
    backend::{StoreBackend, StoreClient},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// The identity of a connection target: its connection string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self(connection_string.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

type Slot<C> = Arc<RwLock<Option<C>>>;

/// Caches one verified client per distinct [`Endpoint`].
#[derive(Debug)]
pub struct EndpointRegistry<B: StoreBackend> {
    backend: B,
    slots: RwLock<HashMap<Endpoint, Slot<B::Client>>>,
}

impl<B: StoreBackend> EndpointRegistry<B> {
    /// Creates an empty registry around a backend driver.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the backend driver used to open new clients.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolves the client for `endpoint`, connecting and verifying it on first use.
    ///
    /// A cache hit returns the pooled client without contacting the backend. A miss
    /// connects, pings and only then pools the client; if either step fails nothing
    /// is cached and the next call starts over.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`] if the endpoint is malformed or
    /// unreachable.
    pub async fn resolve(&self, endpoint: &Endpoint) -> DocumentStoreResult<B::Client> {
        let slot = self.slot(endpoint).await;

        if let Some(client) = slot.read().await.as_ref() {
            debug!(%endpoint, "reusing pooled client");
            return Ok(client.clone());
        }

        let mut pooled = slot.write().await;

        // another caller may have connected while we waited for the write lock
        if let Some(client) = pooled.as_ref() {
            debug!(%endpoint, "reusing pooled client");
            return Ok(client.clone());
        }

        match self.connect(endpoint).await {
            Ok(client) => {
                debug!(%endpoint, "pooled new client");
                *pooled = Some(client.clone());

                Ok(client)
            }
            Err(err) => {
                drop(pooled);
                self.release(endpoint, slot).await;

                Err(err)
            }
        }
    }

    async fn connect(&self, endpoint: &Endpoint) -> DocumentStoreResult<B::Client> {
        let client = self
            .backend
            .connect(endpoint)
            .await
            .map_err(connection_error)
            .inspect_err(|err| warn!(%endpoint, error = %err, "failed to connect"))?;

        client
            .ping()
            .await
            .map_err(connection_error)
            .inspect_err(|err| warn!(%endpoint, error = %err, "failed to verify endpoint"))?;

        Ok(client)
    }

    /// Removes the empty slot of a failed resolution unless another caller still holds it.
    async fn release(&self, endpoint: &Endpoint, slot: Slot<B::Client>) {
        let mut slots = self.slots.write().await;

        // one reference in the map, one here
        let unused = slots.get(endpoint).is_some_and(|current| Arc::ptr_eq(current, &slot))
            && Arc::strong_count(&slot) == 2
            && slot.read().await.is_none();

        if unused {
            slots.remove(endpoint);
        }

        // released under the map lock so a concurrent release sees the final count
        drop(slot);
    }

    /// Returns `true` if a verified client for `endpoint` is pooled.
    pub async fn contains(&self, endpoint: &Endpoint) -> bool {
        let slot = self.slots.read().await.get(endpoint).cloned();

        match slot {
            Some(slot) => slot.read().await.is_some(),
            None => false,
        }
    }

    /// Returns the number of pooled clients.
    pub async fn len(&self) -> usize {
        let slots = self.slots.read().await.values().cloned().collect::<Vec<_>>();
        let mut count = 0;

        for slot in slots {
            if slot.read().await.is_some() {
                count += 1;
            }
        }

        count
    }

    /// Returns `true` if no client is pooled.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Shuts down every pooled client.
    ///
    /// All clients are shut down even if one of them fails; the first error is returned.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        let slots = std::mem::take(&mut *self.slots.write().await);
        let mut result = Ok(());

        for (endpoint, slot) in slots {
            let Some(client) = slot.write().await.take() else {
                continue;
            };

            debug!(%endpoint, "shutting down client");

            if let Err(err) = client.shutdown().await {
                warn!(%endpoint, error = %err, "failed to shut down client");

                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        result
    }

    #[cfg(test)]
    async fn slot_count(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn slot(&self, endpoint: &Endpoint) -> Slot<B::Client> {
        if let Some(slot) = self.slots.read().await.get(endpoint) {
            return slot.clone();
        }

        self.slots
            .write()
            .await
            .entry(endpoint.clone())
            .or_default()
            .clone()
    }
}

fn connection_error(err: DocumentStoreError) -> DocumentStoreError {
    match err {
        DocumentStoreError::Connection(_) => err,
        other => DocumentStoreError::Connection(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubBackend;

    #[tokio::test]
    async fn first_resolution_connects_and_pings() {
        let registry = EndpointRegistry::new(StubBackend::default());
        let endpoint = Endpoint::new("stub://one");

        registry.resolve(&endpoint).await.unwrap();

        assert_eq!(registry.backend().connects(), 1);
        assert_eq!(registry.backend().pings(), 1);
        assert!(registry.contains(&endpoint).await);
    }

    #[tokio::test]
    async fn cache_hits_do_not_reconnect() {
        let registry = EndpointRegistry::new(StubBackend::default());
        let endpoint = Endpoint::new("stub://one");

        let first = registry.resolve(&endpoint).await.unwrap();
        let second = registry.resolve(&endpoint).await.unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(registry.backend().connects(), 1);
        assert_eq!(registry.backend().pings(), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_endpoints_get_distinct_clients() {
        let registry = EndpointRegistry::new(StubBackend::default());

        let one = registry.resolve(&Endpoint::new("stub://one")).await.unwrap();
        let two = registry.resolve(&Endpoint::new("stub://two")).await.unwrap();

        assert_ne!(one.id(), two.id());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn malformed_endpoint_is_a_connection_error() {
        let registry = EndpointRegistry::new(StubBackend::default());
        let endpoint = Endpoint::new("bongo");

        let err = registry.resolve(&endpoint).await.unwrap_err();

        assert!(err.is_connection());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn failed_verification_is_not_cached() {
        let registry = EndpointRegistry::new(StubBackend::default());
        let endpoint = Endpoint::new("stub://flaky");

        registry.backend().set_reachable(false);
        assert!(registry.resolve(&endpoint).await.unwrap_err().is_connection());
        assert!(!registry.contains(&endpoint).await);

        registry.backend().set_reachable(true);
        registry.resolve(&endpoint).await.unwrap();

        assert_eq!(registry.backend().connects(), 2);
        assert!(registry.contains(&endpoint).await);
    }

    #[tokio::test]
    async fn failed_resolutions_leave_no_slots_behind() {
        let registry = EndpointRegistry::new(StubBackend::default());

        for i in 0..100 {
            let endpoint = Endpoint::new(format!("bad{i}"));
            assert!(registry.resolve(&endpoint).await.unwrap_err().is_connection());
        }

        registry.backend().set_reachable(false);
        for i in 0..100 {
            let endpoint = Endpoint::new(format!("stub://down{i}"));
            assert!(registry.resolve(&endpoint).await.unwrap_err().is_connection());
        }

        assert!(registry.is_empty().await);
        assert_eq!(registry.slot_count().await, 0);

        registry.backend().set_reachable(true);
        registry.resolve(&Endpoint::new("stub://down0")).await.unwrap();
        assert_eq!(registry.slot_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failures_leave_no_slots_behind() {
        let registry = Arc::new(EndpointRegistry::new(StubBackend::slow()));
        registry.backend().set_reachable(false);

        let tasks = (0..16)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let endpoint = Endpoint::new(format!("stub://{}", i % 2));
                    registry.resolve(&endpoint).await.map(|client| client.id())
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            assert!(task.await.unwrap().unwrap_err().is_connection());
        }

        assert_eq!(registry.slot_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolution_opens_one_connection_per_endpoint() {
        let registry = Arc::new(EndpointRegistry::new(StubBackend::slow()));

        let tasks = (0..16)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let endpoint = Endpoint::new(format!("stub://{}", i % 2));
                    registry.resolve(&endpoint).await.map(|client| client.id())
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(registry.backend().connects(), 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn shutdown_releases_every_client() {
        let backend = Arc::new(StubBackend::default());
        let registry = EndpointRegistry::new(backend.clone());

        registry.resolve(&Endpoint::new("stub://one")).await.unwrap();
        registry.resolve(&Endpoint::new("stub://two")).await.unwrap();
        registry.shutdown().await.unwrap();

        assert_eq!(backend.shutdowns(), 2);
    }
}
