//! Integration tests for bootstrap rehydration: durable `active` rows must
//! become live registry entries in a fresh process without re-activation.

mod helpers;

use std::sync::Arc;

use bookhub_entity::plugin::{NewHookRegistration, PluginState};
use bookhub_plugin::store::{MemoryStore, PluginStore};
use bookhub_plugin_sdk::prelude::*;

use helpers::{NOTES_ENTRY, TestHost, write_package};

#[tokio::test]
async fn test_rehydration_restores_persisted_registrations() {
    let store = Arc::new(MemoryStore::new());

    // Seed durable state directly: an active plugin with two registrations
    // whose persisted priorities invert the plugin's own defaults.
    let record = store.get_or_create_plugin("notes", "0.1.0").await.unwrap();
    store
        .set_plugin_state(record.id, PluginState::Active)
        .await
        .unwrap();
    for (handler_ref, priority) in [("notes.primary", 7), ("notes.fallback", 3)] {
        store
            .insert_registration(&NewHookRegistration {
                plugin_id: record.id,
                hook: "book.data.get".to_string(),
                handler_ref: handler_ref.to_string(),
                priority,
                active: true,
            })
            .await
            .unwrap();
    }

    // Fresh registry/dispatcher/manager over the same store — a new process.
    let root = helpers::scratch_root();
    write_package(&root, "notes", NOTES_ENTRY);
    let host = TestHost::with_store_and_root(store, root).await;

    host.manager.rehydrate(&host.root).await.unwrap();

    // Both registrations are live, ordered by persisted priority, without
    // activate ever running in this process.
    assert_eq!(
        host.listener_ids(HookPoint::BookDataGet).await,
        vec!["notes.fallback", "notes.primary"]
    );

    // The restored callables actually dispatch.
    let payload = HookPayload::new(HookPoint::BookDataGet).with_message("note");
    let result = host.manager.dispatcher().fetch_first(&payload).await;
    assert_eq!(result, Some(HookValue::Text("primary note".to_string())));
}

#[tokio::test]
async fn test_rehydration_skips_inactive_rows() {
    let store = Arc::new(MemoryStore::new());

    let record = store.get_or_create_plugin("notes", "0.1.0").await.unwrap();
    store
        .set_plugin_state(record.id, PluginState::Active)
        .await
        .unwrap();
    store
        .insert_registration(&NewHookRegistration {
            plugin_id: record.id,
            hook: "book.data.get".to_string(),
            handler_ref: "notes.primary".to_string(),
            priority: 5,
            active: true,
        })
        .await
        .unwrap();
    store
        .insert_registration(&NewHookRegistration {
            plugin_id: record.id,
            hook: "book.data.get".to_string(),
            handler_ref: "notes.fallback".to_string(),
            priority: 10,
            active: false,
        })
        .await
        .unwrap();

    let root = helpers::scratch_root();
    write_package(&root, "notes", NOTES_ENTRY);
    let host = TestHost::with_store_and_root(store, root).await;

    host.manager.rehydrate(&host.root).await.unwrap();

    assert_eq!(
        host.listener_ids(HookPoint::BookDataGet).await,
        vec!["notes.primary"]
    );
}

#[tokio::test]
async fn test_rehydration_ignores_plugins_not_marked_active() {
    let store = Arc::new(MemoryStore::new());

    let record = store.get_or_create_plugin("notes", "0.1.0").await.unwrap();
    store
        .set_plugin_state(record.id, PluginState::Inactive)
        .await
        .unwrap();

    let root = helpers::scratch_root();
    write_package(&root, "notes", NOTES_ENTRY);
    let host = TestHost::with_store_and_root(store, root).await;

    host.manager.rehydrate(&host.root).await.unwrap();

    assert!(host.listener_ids(HookPoint::BookDataGet).await.is_empty());
}

#[tokio::test]
async fn test_rehydration_skips_stale_handler_refs() {
    let store = Arc::new(MemoryStore::new());

    let record = store.get_or_create_plugin("notes", "0.1.0").await.unwrap();
    store
        .set_plugin_state(record.id, PluginState::Active)
        .await
        .unwrap();
    // A handler the current plugin build no longer exposes.
    store
        .insert_registration(&NewHookRegistration {
            plugin_id: record.id,
            hook: "book.data.get".to_string(),
            handler_ref: "notes.removed-in-v2".to_string(),
            priority: 1,
            active: true,
        })
        .await
        .unwrap();
    store
        .insert_registration(&NewHookRegistration {
            plugin_id: record.id,
            hook: "book.data.get".to_string(),
            handler_ref: "notes.primary".to_string(),
            priority: 5,
            active: true,
        })
        .await
        .unwrap();

    let root = helpers::scratch_root();
    write_package(&root, "notes", NOTES_ENTRY);
    let host = TestHost::with_store_and_root(store, root).await;

    host.manager.rehydrate(&host.root).await.unwrap();

    assert_eq!(
        host.listener_ids(HookPoint::BookDataGet).await,
        vec!["notes.primary"]
    );
}
