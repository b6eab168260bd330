//! Live loader round-trip tests using testcontainers.

use mongodb::bson::doc;
use mongodb_api_loader::{
    DocumentStore, LoadResult, Loader, LoaderConfig, LoaderError, NullDispatcher, OwnedRequest,
    ParameterContainer, ProcessEvent, QueryError, ServerRequest,
};
use std::sync::Arc;
use testcontainers_modules::mongo::Mongo;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

struct RequestEvent {
    request: OwnedRequest,
}

impl ProcessEvent for RequestEvent {
    fn request(&self) -> &dyn ServerRequest {
        &self.request
    }
}

/// Seeds the articles collection with three documents.
async fn setup_test_data(connection_string: &str) {
    let client = mongodb::Client::with_uri_str(connection_string)
        .await
        .expect("Failed to connect to MongoDB");

    let articles = client
        .database("apidb")
        .collection::<mongodb::bson::Document>("articles");

    articles
        .insert_many(vec![
            doc! { "_id": "a1", "title": "First", "author": "alice" },
            doc! { "_id": "a2", "title": "Second", "author": "bob" },
            doc! { "_id": "a3", "title": "Third", "author": "alice" },
        ])
        .await
        .expect("Failed to insert articles");
}

async fn start_store() -> (
    testcontainers_modules::testcontainers::ContainerAsync<Mongo>,
    DocumentStore,
) {
    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container");

    let port = container
        .get_host_port_ipv4(27017)
        .await
        .expect("Failed to get MongoDB port");

    let connection_string = format!("mongodb://localhost:{port}/apidb");
    setup_test_data(&connection_string).await;

    let store = DocumentStore::connect(&connection_string)
        .await
        .expect("Failed to create document store");

    (container, store)
}

fn item_loader(store: DocumentStore) -> Loader {
    Loader::new(
        store,
        LoaderConfig::new(
            "articles".to_string(),
            "_id".to_string(),
            ParameterContainer::Attributes,
            "id".to_string(),
        ),
    )
    .expect("valid configuration")
}

fn event_with_id(id: &str) -> Arc<dyn ProcessEvent> {
    Arc::new(RequestEvent {
        request: OwnedRequest::new().with_attributes(doc! { "id": id }),
    })
}

#[tokio::test]
async fn test_collection_phase_returns_every_document() {
    let (_container, store) = start_store().await;
    let loader = item_loader(store);

    let mut context = loader.query_building_context(event_with_id("unused"));
    let result = loader
        .run_phase("loader.collection", &mut context, &NullDispatcher)
        .await
        .expect("collection phase");

    let documents = result.into_collection().expect("collection result");
    assert_eq!(documents.len(), 3);
    assert!(documents.iter().any(|d| d.get_str("title") == Ok("Second")));
}

#[tokio::test]
async fn test_item_phase_returns_single_document_by_identifier() {
    let (_container, store) = start_store().await;
    let loader = item_loader(store);

    let mut context = loader.query_building_context(event_with_id("a2"));
    let result = loader
        .run_phase("loader.item", &mut context, &NullDispatcher)
        .await
        .expect("item phase");

    let document = result.into_item().expect("item result");
    assert_eq!(document.get_str("_id"), Ok("a2"));
    assert_eq!(document.get_str("title"), Ok("Second"));
}

#[tokio::test]
async fn test_item_phase_passes_through_no_result() {
    let (_container, store) = start_store().await;
    let loader = item_loader(store);

    let mut context = loader.query_building_context(event_with_id("missing"));
    let error = loader
        .run_phase("loader.item", &mut context, &NullDispatcher)
        .await
        .expect_err("no match must fail");

    assert!(matches!(
        error,
        LoaderError::Query(QueryError::NoResult)
    ));
}

#[tokio::test]
async fn test_item_phase_passes_through_non_unique_result() {
    let (_container, store) = start_store().await;

    // Filter on a non-unique field so two documents match.
    let loader = Loader::new(
        store,
        LoaderConfig::new(
            "articles".to_string(),
            "author".to_string(),
            ParameterContainer::Attributes,
            "id".to_string(),
        ),
    )
    .expect("valid configuration");

    let mut context = loader.query_building_context(event_with_id("alice"));
    let error = loader
        .run_phase("loader.item", &mut context, &NullDispatcher)
        .await
        .expect_err("duplicate match must fail");

    assert!(matches!(
        error,
        LoaderError::Query(QueryError::NonUniqueResult)
    ));
}

#[tokio::test]
async fn test_identifier_value_is_used_verbatim() {
    let (_container, store) = start_store().await;

    // Body-sourced identifier, same semantics as routing attributes.
    let loader = Loader::new(
        store,
        LoaderConfig::new(
            "articles".to_string(),
            "_id".to_string(),
            ParameterContainer::Body,
            "article".to_string(),
        ),
    )
    .expect("valid configuration");

    let event = Arc::new(RequestEvent {
        request: OwnedRequest::new().with_parsed_body(doc! { "article": "a3" }),
    });

    let mut context = loader.query_building_context(event);
    let result = loader
        .run_phase("loader.item", &mut context, &NullDispatcher)
        .await
        .expect("item phase");

    assert!(matches!(
        result,
        LoadResult::Item(document) if document.get_str("title") == Ok("Third")
    ));
}

#[tokio::test]
async fn test_ping_succeeds_against_live_store() {
    let (_container, store) = start_store().await;

    store.ping().await.expect("store reachable");
}
