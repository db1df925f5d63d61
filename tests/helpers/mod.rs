//! Shared fixtures for integration tests: an in-memory host and small
//! test plugins exercising the lifecycle paths.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use bookhub_plugin::manager::PluginManager;
use bookhub_plugin::store::{MemoryStore, PluginStore};
use bookhub_plugin_sdk::prelude::*;

/// Entry symbol of the well-behaved test plugin.
pub const NOTES_ENTRY: &str = "notes_plugin";
/// Entry symbol of the plugin whose `on_install` fails.
pub const BAD_INSTALL_ENTRY: &str = "bad_install_plugin";
/// Entry symbol of the plugin whose `on_activate` fails.
pub const BAD_ACTIVATE_ENTRY: &str = "bad_activate_plugin";

/// A small, well-behaved plugin serving the `book.data.get` chain with
/// two handlers at different priorities.
#[derive(Debug)]
pub struct NotesPlugin;

/// Builder for [`NotesPlugin`].
pub fn create_notes(_ctx: PluginContext) -> Arc<dyn Plugin> {
    Arc::new(NotesPlugin)
}

#[async_trait]
impl Plugin for NotesPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "notes".to_string(),
            version: "0.1.0".to_string(),
            description: "Test note provider".to_string(),
            author: "tests".to_string(),
        }
    }

    fn subscriptions(&self) -> Vec<HookSubscription> {
        vec![
            HookSubscription::with_priority(
                HookPoint::BookDataGet,
                ClosureHandler::shared("notes", "notes.primary", |payload, _value| async move {
                    if payload.message.as_deref() == Some("note") {
                        Ok(Some(HookValue::Text("primary note".to_string())))
                    } else {
                        Ok(None)
                    }
                }),
                5,
            ),
            HookSubscription::with_priority(
                HookPoint::BookDataGet,
                ClosureHandler::shared("notes", "notes.fallback", |_payload, _value| async move {
                    Ok(None)
                }),
                10,
            ),
        ]
    }

    async fn on_install(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.settings.set("greeting", "hello").await?;
        Ok(())
    }

    async fn on_activate(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "notes activated").await?;
        Ok(())
    }

    async fn on_deactivate(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "notes deactivated").await?;
        Ok(())
    }

    async fn on_uninstall(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "notes uninstalled").await?;
        Ok(())
    }
}

/// A plugin whose one-time setup always fails.
#[derive(Debug)]
pub struct BadInstallPlugin;

/// Builder for [`BadInstallPlugin`].
pub fn create_bad_install(_ctx: PluginContext) -> Arc<dyn Plugin> {
    Arc::new(BadInstallPlugin)
}

#[async_trait]
impl Plugin for BadInstallPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "bad-install".to_string(),
            version: "0.1.0".to_string(),
            description: "Always fails setup".to_string(),
            author: "tests".to_string(),
        }
    }

    fn subscriptions(&self) -> Vec<HookSubscription> {
        Vec::new()
    }

    async fn on_install(&self, ctx: &PluginContext) -> AppResult<()> {
        // Write something first so install failure must clean it up.
        ctx.settings.set("half-written", "yes").await?;
        Err(AppError::internal("schema creation failed"))
    }

    async fn on_activate(&self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn on_deactivate(&self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn on_uninstall(&self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }
}

/// A plugin whose activation always fails.
#[derive(Debug)]
pub struct BadActivatePlugin;

/// Builder for [`BadActivatePlugin`].
pub fn create_bad_activate(_ctx: PluginContext) -> Arc<dyn Plugin> {
    Arc::new(BadActivatePlugin)
}

#[async_trait]
impl Plugin for BadActivatePlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "bad-activate".to_string(),
            version: "0.1.0".to_string(),
            description: "Always fails activation".to_string(),
            author: "tests".to_string(),
        }
    }

    fn subscriptions(&self) -> Vec<HookSubscription> {
        vec![HookSubscription::new(
            HookPoint::BookDataGet,
            ClosureHandler::shared("bad-activate", "bad-activate.noop", |_p, _v| async move {
                Ok(None)
            }),
        )]
    }

    async fn on_install(&self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn on_activate(&self, _ctx: &PluginContext) -> AppResult<()> {
        Err(AppError::internal("refused to start"))
    }

    async fn on_deactivate(&self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn on_uninstall(&self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }
}

/// Test host: a manager over an in-memory store with every test builder
/// registered, plus a scratch plugin directory.
pub struct TestHost {
    /// Shared durable store.
    pub store: Arc<MemoryStore>,
    /// The manager under test.
    pub manager: PluginManager,
    /// Plugin package directory.
    pub root: PathBuf,
}

/// Creates a unique scratch plugin directory.
pub fn scratch_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("bookhub-it-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("create plugin dir");
    root
}

impl TestHost {
    /// Fresh host with its own store and scratch directory.
    pub async fn new() -> Self {
        Self::with_store_and_root(Arc::new(MemoryStore::new()), scratch_root()).await
    }

    /// Host over an existing store and plugin directory — used to simulate
    /// a fresh process against surviving durable state.
    pub async fn with_store_and_root(store: Arc<MemoryStore>, root: PathBuf) -> Self {
        let manager = PluginManager::new(store.clone() as Arc<dyn PluginStore>);
        manager
            .register_builder(NOTES_ENTRY, Arc::new(create_notes))
            .await;
        manager
            .register_builder(BAD_INSTALL_ENTRY, Arc::new(create_bad_install))
            .await;
        manager
            .register_builder(BAD_ACTIVATE_ENTRY, Arc::new(create_bad_activate))
            .await;

        Self {
            store,
            manager,
            root,
        }
    }

    /// Lists handler ids currently live on a hook, in dispatch order.
    pub async fn listener_ids(&self, hook: HookPoint) -> Vec<String> {
        self.manager
            .hook_registry()
            .listeners(&hook)
            .await
            .iter()
            .map(|h| h.id().to_string())
            .collect()
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Writes a plugin package (directory + manifest) under `root`.
pub fn write_package(root: &Path, name: &str, entry: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).expect("create package dir");
    let manifest = serde_json::json!({
        "name": name,
        "version": "0.1.0",
        "entry": entry,
    });
    std::fs::write(dir.join("plugin.json"), manifest.to_string()).expect("write manifest");
}
