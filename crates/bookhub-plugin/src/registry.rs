//! Plugin registry — the plugin contract and the store of live instances.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use bookhub_core::result::AppResult;
use bookhub_entity::plugin::PluginState;

use crate::api::context::PluginContext;
use crate::discovery::PluginDescriptor;
use crate::hooks::definitions::HookPoint;
use crate::hooks::registry::HookHandler;

/// Metadata about a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Stable unique plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
}

/// One hook subscription declared by a plugin: which hook point, which
/// handler, at which priority. The manager turns these into registry
/// entries and durable registration rows.
#[derive(Debug, Clone)]
pub struct HookSubscription {
    /// The hook point to subscribe to.
    pub hook: HookPoint,
    /// Priority (lower = runs earlier).
    pub priority: i32,
    /// The handler to invoke.
    pub handler: Arc<dyn HookHandler>,
}

impl HookSubscription {
    /// Creates a subscription using the handler's default priority.
    pub fn new(hook: HookPoint, handler: Arc<dyn HookHandler>) -> Self {
        let priority = handler.default_priority();
        Self {
            hook,
            priority,
            handler,
        }
    }

    /// Creates a subscription with an explicit priority.
    pub fn with_priority(hook: HookPoint, handler: Arc<dyn HookHandler>, priority: i32) -> Self {
        Self {
            hook,
            priority,
            handler,
        }
    }
}

/// Trait that all plugins must implement.
///
/// Lifecycle hooks are side-effecting; each receives the [`PluginContext`]
/// the plugin was constructed with, for symmetry with plugins that hold no
/// state of their own.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Returns the hook subscriptions this plugin wants live while active.
    fn subscriptions(&self) -> Vec<HookSubscription>;

    /// One-time setup (e.g. seed default settings). Must be atomic or
    /// self-cleaning: a failure aborts the install with nothing committed.
    async fn on_install(&self, ctx: &PluginContext) -> AppResult<()>;

    /// Called when the plugin is activated, before its subscriptions are
    /// registered.
    async fn on_activate(&self, ctx: &PluginContext) -> AppResult<()>;

    /// Called when the plugin is deactivated. Data is preserved.
    async fn on_deactivate(&self, ctx: &PluginContext) -> AppResult<()>;

    /// Final cleanup before the plugin's durable data is destroyed.
    async fn on_uninstall(&self, ctx: &PluginContext) -> AppResult<()>;
}

/// Registry of live plugin instances and their descriptors.
#[derive(Debug)]
pub struct PluginRegistry {
    /// Plugin name → live instance.
    plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
    /// Plugin name → descriptor (state, record id, package dir).
    descriptors: RwLock<HashMap<String, PluginDescriptor>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) a live plugin instance with its descriptor.
    pub async fn insert(&self, descriptor: PluginDescriptor, plugin: Arc<dyn Plugin>) {
        let name = descriptor.name.clone();
        let info = plugin.info();

        let mut plugins = self.plugins.write().await;
        let mut descriptors = self.descriptors.write().await;

        info!(plugin = %name, version = %info.version, "Plugin instance registered");

        plugins.insert(name.clone(), plugin);
        descriptors.insert(name, descriptor);
    }

    /// Removes a plugin instance and its descriptor.
    pub async fn remove(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        let mut plugins = self.plugins.write().await;
        let mut descriptors = self.descriptors.write().await;
        descriptors.remove(name);
        plugins.remove(name)
    }

    /// Gets a live plugin instance by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        let plugins = self.plugins.read().await;
        plugins.get(name).cloned()
    }

    /// Gets a plugin's descriptor by name.
    pub async fn descriptor(&self, name: &str) -> Option<PluginDescriptor> {
        let descriptors = self.descriptors.read().await;
        descriptors.get(name).cloned()
    }

    /// Updates the tracked lifecycle state of a plugin.
    pub async fn set_state(&self, name: &str, state: PluginState) {
        let mut descriptors = self.descriptors.write().await;
        if let Some(descriptor) = descriptors.get_mut(name) {
            descriptor.state = state;
        }
    }

    /// Lists all tracked descriptors, sorted by plugin name.
    pub async fn list(&self) -> Vec<PluginDescriptor> {
        let descriptors = self.descriptors.read().await;
        let mut all: Vec<PluginDescriptor> = descriptors.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Checks whether a plugin is tracked.
    pub async fn contains(&self, name: &str) -> bool {
        let plugins = self.plugins.read().await;
        plugins.contains_key(name)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
