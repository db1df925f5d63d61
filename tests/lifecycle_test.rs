//! Integration tests for the plugin lifecycle state machine.

mod helpers;

use bookhub_entity::plugin::PluginState;
use bookhub_plugin::PluginError;
use bookhub_plugin::store::PluginStore;
use bookhub_plugin_sdk::prelude::*;

use helpers::{BAD_ACTIVATE_ENTRY, BAD_INSTALL_ENTRY, NOTES_ENTRY, TestHost, write_package};

#[tokio::test]
async fn test_lifecycle_round_trip_restores_ordered_set() {
    let host = TestHost::new().await;
    write_package(&host.root, "notes", NOTES_ENTRY);

    let descriptors = host.manager.discover(&host.root).unwrap();
    assert_eq!(descriptors.len(), 1);
    let descriptor = &descriptors[0];
    assert_eq!(descriptor.state, PluginState::Discovered);

    host.manager.install(descriptor).await.unwrap();
    host.manager.activate(descriptor).await.unwrap();

    let before = host.listener_ids(HookPoint::BookDataGet).await;
    assert_eq!(before, vec!["notes.primary", "notes.fallback"]);

    host.manager.deactivate(descriptor).await.unwrap();
    assert!(host.listener_ids(HookPoint::BookDataGet).await.is_empty());

    // Durable rows survive deactivation, merely suspended.
    let record = host.store.find_plugin("notes").await.unwrap().unwrap();
    assert_eq!(record.state, PluginState::Inactive);
    let rows = host
        .store
        .list_registrations_for_plugin(record.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| !row.active));

    host.manager.activate(descriptor).await.unwrap();
    let after = host.listener_ids(HookPoint::BookDataGet).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_activate_twice_does_not_duplicate() {
    let host = TestHost::new().await;
    write_package(&host.root, "notes", NOTES_ENTRY);

    let descriptors = host.manager.discover(&host.root).unwrap();
    let descriptor = &descriptors[0];

    host.manager.install(descriptor).await.unwrap();
    host.manager.activate(descriptor).await.unwrap();
    host.manager.activate(descriptor).await.unwrap();

    assert_eq!(
        host.listener_ids(HookPoint::BookDataGet).await,
        vec!["notes.primary", "notes.fallback"]
    );

    let record = host.store.find_plugin("notes").await.unwrap().unwrap();
    let rows = host
        .store
        .list_registrations_for_plugin(record.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_failed_install_commits_nothing() {
    let host = TestHost::new().await;
    write_package(&host.root, "bad-install", BAD_INSTALL_ENTRY);

    let descriptors = host.manager.discover(&host.root).unwrap();
    let result = host.manager.install(&descriptors[0]).await;
    assert!(matches!(result, Err(PluginError::Install { .. })));

    // Nothing half-written survives, and the plugin is not installed.
    let record = host.store.find_plugin("bad-install").await.unwrap().unwrap();
    assert_eq!(record.state, PluginState::Discovered);
    assert!(
        host.store
            .get_setting(record.id, "half-written")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_activate_requires_install() {
    let host = TestHost::new().await;
    write_package(&host.root, "notes", NOTES_ENTRY);

    let descriptors = host.manager.discover(&host.root).unwrap();
    let result = host.manager.activate(&descriptors[0]).await;
    assert!(matches!(result, Err(PluginError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_uninstall_destroys_rows_and_rediscovery_starts_over() {
    let host = TestHost::new().await;
    write_package(&host.root, "notes", NOTES_ENTRY);

    let descriptors = host.manager.discover(&host.root).unwrap();
    let descriptor = &descriptors[0];

    host.manager.install(descriptor).await.unwrap();
    host.manager.activate(descriptor).await.unwrap();
    host.manager.deactivate(descriptor).await.unwrap();
    host.manager.uninstall(descriptor).await.unwrap();

    let record = host.store.find_plugin("notes").await.unwrap().unwrap();
    assert_eq!(record.state, PluginState::Uninstalled);
    assert!(
        host.store
            .list_registrations_for_plugin(record.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        host.store
            .get_setting(record.id, "greeting")
            .await
            .unwrap()
            .is_none()
    );
    assert!(host.listener_ids(HookPoint::BookDataGet).await.is_empty());

    let rediscovered = host.manager.discover(&host.root).unwrap();
    assert_eq!(rediscovered.len(), 1);
    assert_eq!(rediscovered[0].state, PluginState::Discovered);
}

#[tokio::test]
async fn test_uninstall_while_active_is_rejected() {
    let host = TestHost::new().await;
    write_package(&host.root, "notes", NOTES_ENTRY);

    let descriptors = host.manager.discover(&host.root).unwrap();
    let descriptor = &descriptors[0];

    host.manager.install(descriptor).await.unwrap();
    host.manager.activate(descriptor).await.unwrap();

    let result = host.manager.uninstall(descriptor).await;
    assert!(matches!(result, Err(PluginError::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_activate_all_isolates_failing_plugin() {
    let host = TestHost::new().await;
    write_package(&host.root, "bad-activate", BAD_ACTIVATE_ENTRY);
    write_package(&host.root, "notes", NOTES_ENTRY);

    host.manager.activate_all(&host.root).await.unwrap();

    // The healthy plugin is live despite its neighbor failing.
    assert_eq!(
        host.listener_ids(HookPoint::BookDataGet).await,
        vec!["notes.primary", "notes.fallback"]
    );
    let notes = host.store.find_plugin("notes").await.unwrap().unwrap();
    assert_eq!(notes.state, PluginState::Active);

    let bad = host.store.find_plugin("bad-activate").await.unwrap().unwrap();
    assert_ne!(bad.state, PluginState::Active);
}

#[tokio::test]
async fn test_activate_all_respects_operator_deactivation() {
    let host = TestHost::new().await;
    write_package(&host.root, "notes", NOTES_ENTRY);

    host.manager.activate_all(&host.root).await.unwrap();
    let descriptors = host.manager.discover(&host.root).unwrap();
    host.manager.deactivate(&descriptors[0]).await.unwrap();

    // A second bootstrap pass must not resurrect the plugin.
    host.manager.activate_all(&host.root).await.unwrap();
    assert!(host.listener_ids(HookPoint::BookDataGet).await.is_empty());
    let record = host.store.find_plugin("notes").await.unwrap().unwrap();
    assert_eq!(record.state, PluginState::Inactive);
}

#[tokio::test]
async fn test_missing_entry_point_fails_loudly() {
    let host = TestHost::new().await;
    write_package(&host.root, "ghost", "ghost_plugin_entry");

    let descriptors = host.manager.discover(&host.root).unwrap();
    let result = host.manager.install(&descriptors[0]).await;
    assert!(matches!(result, Err(PluginError::MissingEntry { .. })));
}
