//! Full sync flows against the in-memory host

use serde_json::json;
use std::sync::Arc;
use syncline_field::ItemId;
use syncline_host::{
    keys, MessageVariant, NoopObserver, PluginHost, SyncConfig, SyncEngine, SyncRequest,
};
use syncline_reconcile::{FieldValue, SourceItem};
use syncline_test_utils::{
    field_id, item_with, reference_source_field, text_source_field, MemoryHost,
};

fn engine_with(host: &Arc<MemoryHost>, config: SyncConfig) -> SyncEngine {
    SyncEngine::new(Arc::clone(host) as Arc<dyn PluginHost>, config)
}

async fn sync_titles(engine: &SyncEngine, titles: &[&str]) {
    let source_fields = vec![text_source_field("title"), text_source_field("body")];
    let configs = engine.configure_fields(&source_fields).await.unwrap();
    let items: Vec<SourceItem> = titles
        .iter()
        .map(|title| item_with(&[("title", json!(*title)), ("body", json!("x"))]))
        .collect();

    engine
        .run_sync(
            SyncRequest {
                data_source_id: "posts",
                slug_field: field_id("title"),
                configs: &configs,
                items: &items,
            },
            &mut NoopObserver,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn first_sync_populates_collection_and_persists_keys() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    sync_titles(&engine, &["Hello World"]).await;

    let expected = ItemId::from_slug("hello-world");
    assert_eq!(host.stored_item_ids(), vec![expected]);

    let item = host.stored_item(expected).unwrap();
    assert_eq!(item.slug, "hello-world");
    assert_eq!(
        item.field_data.get(&field_id("body")),
        Some(&FieldValue::PlainText("x".to_string()))
    );

    assert_eq!(
        host.stored_plugin_data(keys::DATA_SOURCE_ID).as_deref(),
        Some("posts")
    );
    assert_eq!(
        host.stored_plugin_data(keys::SLUG_FIELD_ID),
        Some(field_id("title").to_string())
    );
    assert_eq!(host.stored_fields().len(), 2);
}

#[tokio::test]
async fn resync_removes_items_that_left_the_source() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    sync_titles(&engine, &["a", "b", "c"]).await;
    assert_eq!(host.stored_item_ids().len(), 3);

    sync_titles(&engine, &["a", "c"]).await;
    let mut expected = vec![ItemId::from_slug("a"), ItemId::from_slug("c")];
    expected.sort_unstable();
    assert_eq!(host.stored_item_ids(), expected);
}

#[tokio::test]
async fn resync_with_unchanged_source_is_idempotent() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    sync_titles(&engine, &["Hello World", "Second"]).await;
    let first = host.stored_item_ids();

    sync_titles(&engine, &["Hello World", "Second"]).await;
    assert_eq!(host.stored_item_ids(), first);
}

#[tokio::test]
async fn mutations_arrive_in_contract_order() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    sync_titles(&engine, &["a", "b"]).await;
    sync_titles(&engine, &["a"]).await;

    let calls = host.mutation_calls();
    let set_fields = calls.iter().rposition(|c| *c == "set_fields").unwrap();
    let remove = calls.iter().rposition(|c| *c == "remove_items").unwrap();
    let add = calls.iter().rposition(|c| *c == "add_items").unwrap();
    assert!(set_fields < remove, "set_fields must precede remove_items");
    assert!(remove < add, "remove_items must precede add_items");
}

#[tokio::test]
async fn reference_fields_resolve_against_sibling_collections() {
    let host = Arc::new(MemoryHost::new());
    let author_id = ItemId::from_slug("jane-doe");
    host.seed_collection("col-authors", "Authors", Some("authors"));
    host.seed_collection_slugs("col-authors", &[("jane-doe", author_id)]);

    let engine = engine_with(&host, SyncConfig::new());
    let source_fields = vec![
        text_source_field("title"),
        reference_source_field("author", "authors"),
    ];
    let configs = engine.configure_fields(&source_fields).await.unwrap();
    assert!(configs[1].is_active(), "reference should have resolved");

    let items = vec![item_with(&[
        ("title", json!("Post")),
        ("author", json!("jane-doe")),
    ])];
    let report = engine
        .run_sync(
            SyncRequest {
                data_source_id: "posts",
                slug_field: field_id("title"),
                configs: &configs,
                items: &items,
            },
            &mut NoopObserver,
        )
        .await
        .unwrap();

    assert_eq!(report.added, 1);
    let item = host.stored_item(ItemId::from_slug("post")).unwrap();
    assert_eq!(
        item.field_data.get(&field_id("author")),
        Some(&FieldValue::CollectionReference(author_id))
    );
}

#[tokio::test]
async fn failed_add_batches_are_reported_not_fatal() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new().with_batch_size(1));

    let source_fields = vec![text_source_field("title")];
    let configs = engine.configure_fields(&source_fields).await.unwrap();
    let items = vec![
        item_with(&[("title", json!("one"))]),
        item_with(&[("title", json!("two"))]),
    ];

    host.fail_adds(true);
    let report = engine
        .run_sync(
            SyncRequest {
                data_source_id: "posts",
                slug_field: field_id("title"),
                configs: &configs,
                items: &items,
            },
            &mut NoopObserver,
        )
        .await
        .unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.failed_batches, 2);
    // The sync configuration still persists so the next launch can retry.
    assert_eq!(
        host.stored_plugin_data(keys::DATA_SOURCE_ID).as_deref(),
        Some("posts")
    );
}

#[tokio::test]
async fn missing_data_source_notifies_without_mutating() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    let source_fields = vec![text_source_field("title")];
    let configs = engine.configure_fields(&source_fields).await.unwrap();

    let result = engine
        .sync_and_notify(
            SyncRequest {
                data_source_id: "  ",
                slug_field: field_id("title"),
                configs: &configs,
                items: &[],
            },
            &mut NoopObserver,
        )
        .await;

    assert!(result.is_err());
    assert!(host.mutation_calls().is_empty());
    let notifications = host.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].1, MessageVariant::Error);
    assert!(host.close_message().is_none());
}

#[tokio::test]
async fn saved_sync_round_trips_for_auto_resync() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    assert!(engine.saved_sync().await.unwrap().is_none());
    sync_titles(&engine, &["Hello"]).await;

    let saved = engine.saved_sync().await.unwrap().unwrap();
    assert_eq!(saved.data_source_id, "posts");
    assert_eq!(saved.slug_field, field_id("title"));
}

#[tokio::test]
async fn successful_sync_notifies_with_counts() {
    let host = Arc::new(MemoryHost::new());
    let engine = engine_with(&host, SyncConfig::new());

    let source_fields = vec![text_source_field("title")];
    let configs = engine.configure_fields(&source_fields).await.unwrap();
    let items = vec![
        item_with(&[("title", json!("kept"))]),
        item_with(&[("title", json!(null))]),
    ];

    engine
        .sync_and_notify(
            SyncRequest {
                data_source_id: "posts",
                slug_field: field_id("title"),
                configs: &configs,
                items: &items,
            },
            &mut NoopObserver,
        )
        .await
        .unwrap();

    let notifications = host.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].0, "Synced 1 items (skipped: 1)");
    assert_eq!(notifications[0].1, MessageVariant::Success);
}
