use bagdb::{memory::InMemoryStore, prelude::*};
use futures::future::try_join_all;
use std::sync::Arc;

async fn store() -> DocumentStore<InMemoryStore> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    DocumentStore::new(InMemoryStore::builder().build().await.unwrap())
}

#[tokio::test]
async fn collections_on_one_endpoint_share_a_client() {
    let store = store().await;

    let first = store.open("memory://localhost", "Test", "first").await.unwrap();
    let second = store.open("memory://localhost", "Test", "second").await.unwrap();
    let again = store.open_local("Test").await.unwrap();

    assert_eq!(store.registry().backend().connections(), 1);
    assert_eq!(store.registry().len().await, 1);
    assert_eq!(first.name(), "Test.first");
    assert_eq!(second.name(), "Test.second");
    assert_eq!(again.name(), "Test.Test");
}

#[tokio::test]
async fn distinct_endpoints_are_isolated() {
    let store = store().await;

    let local = store.open("memory://localhost", "Test", "Test").await.unwrap();
    let remote = store.open("memory://remote", "Test", "Test").await.unwrap();

    local.put(&parse_document(r#"{"id": 1}"#).unwrap()).await.unwrap();

    assert_eq!(store.registry().backend().connections(), 2);
    assert_eq!(local.count().await.unwrap(), 1);
    assert_eq!(remote.count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_opens_connect_once() {
    let store = Arc::new(store().await);

    let opened = try_join_all((0..16).map(|i| {
        let store = store.clone();
        async move { store.open("memory://localhost", "Test", &format!("c{i}")).await }
    }))
    .await
    .unwrap();

    assert_eq!(opened.len(), 16);
    assert_eq!(store.registry().backend().connections(), 1);
}

#[tokio::test]
async fn malformed_endpoints_fail_to_connect() {
    let store = store().await;

    for endpoint in ["bongo", "memory://", "mongodb://bongo"] {
        let error = store.open(endpoint, "bongo", "bongo").await.unwrap_err();
        assert!(error.is_connection(), "{endpoint}: {error:?}");
    }

    assert!(store.registry().is_empty().await);
}

#[tokio::test]
async fn unreachable_endpoints_are_retried() {
    let store = store().await;
    store.registry().backend().set_reachable("bongo", false).await;

    let error = store.open("memory://bongo", "bongo", "bongo").await.unwrap_err();
    assert!(error.is_connection());
    assert!(!store.registry().contains(&Endpoint::new("memory://bongo")).await);

    store.registry().backend().set_reachable("bongo", true).await;

    let collection = store.open("memory://bongo", "bongo", "bongo").await.unwrap();
    assert_eq!(collection.count().await.unwrap(), 0);
    assert_eq!(store.registry().backend().connections(), 2);
}

#[tokio::test]
async fn minimum_configuration_is_usable() {
    let store = store().await;
    let config = StoreConfig::from_json(r#"{"collectionName": "bongo"}"#).unwrap();

    let collections = store.connect_config(&config).await.unwrap();
    let bongo = &collections["bongo"];

    bongo.put(&parse_document(r#"{"xxx": "yyy"}"#).unwrap()).await.unwrap();
    assert_eq!(bongo.count().await.unwrap(), 1);
    assert_eq!(bongo.name(), "bongo.bongo");
}

#[tokio::test]
async fn configuration_with_collection_names() {
    let store = store().await;
    let config = StoreConfig::from_json(
        r#"{"databaseName": "mvn-test", "collectionNames": ["bongo", "dingo"]}"#,
    )
    .unwrap();

    let collections = store.connect_config(&config).await.unwrap();

    assert_eq!(collections.len(), 2);
    assert_eq!(collections["bongo"].name(), "mvn-test.bongo");
    assert_eq!(collections["dingo"].name(), "mvn-test.dingo");
    assert_eq!(store.registry().backend().connections(), 1);
}

#[tokio::test]
async fn incomplete_configurations_fail_before_connecting() {
    let store = store().await;

    for text in [r#"{"connectionString": "xxx"}"#, r#"{"databaseName": "Test"}"#, "{}"] {
        let config = StoreConfig::from_json(text).unwrap();
        let error = store.connect_config(&config).await.unwrap_err();
        assert!(error.is_configuration(), "{text}: {error:?}");
    }

    assert_eq!(store.registry().backend().connections(), 0);
}

#[tokio::test]
async fn configuration_endpoint_is_honored() {
    let store = store().await;
    let config = StoreConfig::new("bongo").with_connection_string("bongo");

    let error = store.connect_config(&config).await.unwrap_err();

    assert!(error.is_connection());
}
