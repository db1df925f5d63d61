//! Plugin manager — lifecycle orchestration bridging durable plugin
//! metadata and the in-memory hook registry.
//!
//! Per-plugin lifecycle: `Discovered → Installed → Active ⇄ Inactive →
//! Uninstalled`. Administrative operations (`install`, `activate`,
//! `deactivate`, `uninstall`) fail loudly; the fleet-level entry points
//! (`activate_all`, `rehydrate`) isolate per-plugin failures and continue.
//!
//! Because the hook registry is in-memory, one of `activate_all` /
//! `rehydrate` must run at every process start, before the first dispatch,
//! for previously-activated plugins to have any effect.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use bookhub_core::result::AppResult;
use bookhub_entity::plugin::{NewHookRegistration, PluginState};

use crate::api::context::PluginContext;
use crate::api::services::{StoreLogService, StoreSettingsService};
use crate::discovery::{self, PluginDescriptor};
use crate::error::PluginError;
use crate::hooks::definitions::HookPoint;
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::{HookHandler, HookRegistry};
use crate::registry::{Plugin, PluginRegistry};
use crate::store::PluginStore;

/// Constructor for a statically linked plugin, resolved by manifest
/// `entry` symbol. Receives the context (dispatcher + storage-backed
/// services) the instance will live with.
pub type PluginBuilder = Arc<dyn Fn(PluginContext) -> Arc<dyn Plugin> + Send + Sync>;

/// Manages the full lifecycle of plugins.
pub struct PluginManager {
    /// Hook registry.
    hook_registry: Arc<HookRegistry>,
    /// Hook dispatcher.
    dispatcher: Arc<HookDispatcher>,
    /// Live plugin instances and descriptors.
    plugins: Arc<PluginRegistry>,
    /// Durable storage collaborator.
    store: Arc<dyn PluginStore>,
    /// Entry symbol → statically linked constructor.
    builders: RwLock<HashMap<String, PluginBuilder>>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager").finish()
    }
}

impl PluginManager {
    /// Creates a new plugin manager over a storage collaborator.
    pub fn new(store: Arc<dyn PluginStore>) -> Self {
        let hook_registry = Arc::new(HookRegistry::new());
        let dispatcher = Arc::new(HookDispatcher::new(hook_registry.clone()));

        Self {
            hook_registry,
            dispatcher,
            plugins: Arc::new(PluginRegistry::new()),
            store,
            builders: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a statically linked plugin constructor under an entry
    /// symbol. Manifests whose `entry` has no builder fail activation.
    pub async fn register_builder(&self, entry: &str, builder: PluginBuilder) {
        let mut builders = self.builders.write().await;
        builders.insert(entry.to_string(), builder);
    }

    /// Scans a directory tree for plugin packages.
    ///
    /// Touches neither durable storage nor the hook registry; malformed
    /// packages are logged and skipped inside discovery.
    pub fn discover(&self, dir: &Path) -> AppResult<Vec<PluginDescriptor>> {
        discovery::discover(dir)
    }

    /// Runs a plugin's one-time setup and persists its descriptor row.
    ///
    /// On failure the plugin stays out of the installed set and any
    /// settings the partial setup wrote are removed.
    pub async fn install(&self, descriptor: &PluginDescriptor) -> Result<(), PluginError> {
        let (plugin, ctx, record_id, state) = self.instantiate(descriptor).await?;

        match state {
            PluginState::Installed | PluginState::Active | PluginState::Inactive => {
                debug!(plugin = %descriptor.name, state = %state, "Plugin already installed");
                self.track(descriptor, plugin, record_id, state).await;
                return Ok(());
            }
            PluginState::Discovered | PluginState::Uninstalled => {}
        }

        if let Err(cause) = plugin.on_install(&ctx).await {
            // Self-cleaning: drop whatever the failed setup managed to write.
            let _ = self.store.delete_settings_for_plugin(record_id).await;
            let _ = self.store.delete_registrations_for_plugin(record_id).await;
            return Err(PluginError::Install {
                plugin: descriptor.name.clone(),
                cause,
            });
        }

        self.store
            .set_plugin_state(record_id, PluginState::Installed)
            .await?;
        self.track(descriptor, plugin, record_id, PluginState::Installed)
            .await;

        info!(plugin = %descriptor.name, version = %descriptor.version, "Plugin installed");
        Ok(())
    }

    /// Activates a plugin: runs `on_activate`, registers its subscriptions
    /// in the hook registry, and persists each registration.
    ///
    /// Idempotent — activating an active plugin clears and re-registers
    /// rather than duplicating.
    pub async fn activate(&self, descriptor: &PluginDescriptor) -> Result<(), PluginError> {
        let name = &descriptor.name;
        let record = self
            .store
            .find_plugin(name)
            .await?
            .ok_or_else(|| PluginError::InvalidTransition {
                plugin: name.clone(),
                from: PluginState::Discovered,
                to: PluginState::Active,
            })?;

        if !record.state.can_transition_to(PluginState::Active) {
            return Err(PluginError::InvalidTransition {
                plugin: name.clone(),
                from: record.state,
                to: PluginState::Active,
            });
        }

        let (plugin, ctx) = match self.plugins.get(name).await {
            Some(plugin) => (plugin, self.context_for(record.id)),
            None => {
                let (plugin, ctx, _, _) = self.instantiate(descriptor).await?;
                (plugin, ctx)
            }
        };

        plugin
            .on_activate(&ctx)
            .await
            .map_err(|cause| PluginError::Activation {
                plugin: name.clone(),
                cause,
            })?;

        self.hook_registry.clear_plugin(name).await;
        self.store.delete_registrations_for_plugin(record.id).await?;

        let subscriptions = plugin.subscriptions();
        for subscription in &subscriptions {
            self.hook_registry
                .register(
                    subscription.hook,
                    subscription.handler.clone(),
                    subscription.priority,
                )
                .await;
            self.store
                .insert_registration(&NewHookRegistration {
                    plugin_id: record.id,
                    hook: subscription.hook.as_str().to_string(),
                    handler_ref: subscription.handler.id().to_string(),
                    priority: subscription.priority,
                    active: true,
                })
                .await?;
        }

        self.store
            .set_plugin_state(record.id, PluginState::Active)
            .await?;
        self.track(descriptor, plugin, record.id, PluginState::Active)
            .await;

        info!(
            plugin = %name,
            hooks = subscriptions.len(),
            "Plugin activated"
        );
        Ok(())
    }

    /// Deactivates a plugin: suspends its durable registrations, runs
    /// `on_deactivate`, and clears its entries from the hook registry.
    /// Settings and other plugin data are preserved.
    pub async fn deactivate(&self, descriptor: &PluginDescriptor) -> Result<(), PluginError> {
        let name = &descriptor.name;
        let record = self
            .store
            .find_plugin(name)
            .await?
            .ok_or_else(|| PluginError::Unknown { name: name.clone() })?;

        if !record.state.can_transition_to(PluginState::Inactive) {
            return Err(PluginError::InvalidTransition {
                plugin: name.clone(),
                from: record.state,
                to: PluginState::Inactive,
            });
        }

        let plugin = self
            .plugins
            .get(name)
            .await
            .ok_or_else(|| PluginError::Unknown { name: name.clone() })?;

        self.store.set_registrations_active(record.id, false).await?;

        let ctx = self.context_for(record.id);
        if let Err(e) = plugin.on_deactivate(&ctx).await {
            warn!(plugin = %name, error = %e, "on_deactivate returned error");
        }

        self.hook_registry.clear_plugin(name).await;
        self.store
            .set_plugin_state(record.id, PluginState::Inactive)
            .await?;
        self.plugins.set_state(name, PluginState::Inactive).await;

        info!(plugin = %name, "Plugin deactivated");
        Ok(())
    }

    /// Uninstalls a plugin: runs `on_uninstall`, then destroys its durable
    /// registrations and settings. Terminal; re-discovery starts over.
    pub async fn uninstall(&self, descriptor: &PluginDescriptor) -> Result<(), PluginError> {
        let name = &descriptor.name;
        let record = self
            .store
            .find_plugin(name)
            .await?
            .ok_or_else(|| PluginError::Unknown { name: name.clone() })?;

        if !record.state.can_transition_to(PluginState::Uninstalled) {
            return Err(PluginError::InvalidTransition {
                plugin: name.clone(),
                from: record.state,
                to: PluginState::Uninstalled,
            });
        }

        if let Some(plugin) = self.plugins.get(name).await {
            let ctx = self.context_for(record.id);
            if let Err(e) = plugin.on_uninstall(&ctx).await {
                warn!(plugin = %name, error = %e, "on_uninstall returned error");
            }
        }

        self.store.delete_registrations_for_plugin(record.id).await?;
        self.store.delete_settings_for_plugin(record.id).await?;
        self.store
            .set_plugin_state(record.id, PluginState::Uninstalled)
            .await?;

        self.hook_registry.clear_plugin(name).await;
        self.plugins.remove(name).await;

        info!(plugin = %name, "Plugin uninstalled");
        Ok(())
    }

    /// Bootstrap entry point: discovers every plugin package under `dir`
    /// and brings each to its persisted lifecycle target — fresh plugins
    /// are installed and activated, previously-active plugins are
    /// rehydrated from their durable registrations, operator-deactivated
    /// plugins are left inactive. One plugin's failure is logged and does
    /// not stop the rest.
    pub async fn activate_all(&self, dir: &Path) -> AppResult<()> {
        let descriptors = self.discover(dir)?;
        info!(count = descriptors.len(), "Activating discovered plugins");

        for descriptor in &descriptors {
            if let Err(e) = self.bring_up(descriptor).await {
                error!(
                    plugin = %descriptor.name,
                    error = %e,
                    "Plugin failed to activate; continuing with remaining plugins"
                );
            }
        }
        Ok(())
    }

    /// Restores live registry entries for every discovered plugin whose
    /// durable state is `Active`, without re-running `on_activate`.
    ///
    /// This is the bridge between durable state and the in-memory
    /// registry; without it, event delivery for persisted plugins silently
    /// drops to zero while storage still claims they are active.
    pub async fn rehydrate(&self, dir: &Path) -> AppResult<()> {
        let descriptors = self.discover(dir)?;

        for descriptor in &descriptors {
            match self.rehydrate_descriptor(descriptor).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(plugin = %descriptor.name, "No active durable state to rehydrate");
                }
                Err(e) => {
                    error!(
                        plugin = %descriptor.name,
                        error = %e,
                        "Failed to rehydrate plugin; continuing with remaining plugins"
                    );
                }
            }
        }
        Ok(())
    }

    /// Rehydrates one plugin. Returns `false` when storage holds no
    /// `Active` row for it.
    pub async fn rehydrate_descriptor(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<bool, PluginError> {
        let name = &descriptor.name;
        let Some(record) = self.store.find_plugin(name).await? else {
            return Ok(false);
        };
        if record.state != PluginState::Active {
            return Ok(false);
        }

        let (plugin, _ctx, record_id, _) = self.instantiate(descriptor).await?;
        let subscriptions = plugin.subscriptions();
        let rows = self.store.list_registrations_for_plugin(record_id).await?;

        let mut restored = 0usize;
        for row in rows.iter().filter(|r| r.active) {
            let Ok(hook) = row.hook.parse::<HookPoint>() else {
                warn!(
                    plugin = %name,
                    hook = %row.hook,
                    "Persisted registration references unknown hook; skipping"
                );
                continue;
            };
            let Some(subscription) = subscriptions.iter().find(|s| s.handler.id() == row.handler_ref)
            else {
                warn!(
                    plugin = %name,
                    handler = %row.handler_ref,
                    "Persisted registration has no matching handler; skipping"
                );
                continue;
            };
            self.hook_registry
                .register(hook, subscription.handler.clone(), row.priority)
                .await;
            restored += 1;
        }

        self.track(descriptor, plugin, record_id, PluginState::Active)
            .await;

        info!(plugin = %name, restored, "Plugin registrations rehydrated");
        Ok(true)
    }

    /// Returns the hook dispatcher for firing hooks.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    /// Returns the hook registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hook_registry
    }

    /// Returns the live plugin registry.
    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    /// Returns the storage collaborator.
    pub fn store(&self) -> &Arc<dyn PluginStore> {
        &self.store
    }

    /// Brings one discovered plugin to its persisted lifecycle target.
    async fn bring_up(&self, descriptor: &PluginDescriptor) -> Result<(), PluginError> {
        let state = self
            .store
            .find_plugin(&descriptor.name)
            .await?
            .map(|record| record.state);

        match state {
            None | Some(PluginState::Discovered) | Some(PluginState::Uninstalled) => {
                self.install(descriptor).await?;
                self.activate(descriptor).await
            }
            Some(PluginState::Installed) => self.activate(descriptor).await,
            Some(PluginState::Active) => self.rehydrate_descriptor(descriptor).await.map(|_| ()),
            Some(PluginState::Inactive) => {
                debug!(plugin = %descriptor.name, "Plugin deactivated by operator; leaving inactive");
                Ok(())
            }
        }
    }

    /// Resolves the descriptor's entry symbol, ensures a durable row
    /// exists, and constructs the plugin instance with its context.
    async fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
    ) -> Result<(Arc<dyn Plugin>, PluginContext, uuid::Uuid, PluginState), PluginError> {
        let builder = {
            let builders = self.builders.read().await;
            builders.get(&descriptor.entry).cloned()
        }
        .ok_or_else(|| PluginError::MissingEntry {
            plugin: descriptor.name.clone(),
            entry: descriptor.entry.clone(),
        })?;

        let record = self
            .store
            .get_or_create_plugin(&descriptor.name, &descriptor.version)
            .await?;
        let ctx = self.context_for(record.id);
        let plugin = builder(ctx.clone());

        Ok((plugin, ctx, record.id, record.state))
    }

    /// Builds a plugin-scoped context over the shared store and dispatcher.
    fn context_for(&self, plugin_id: uuid::Uuid) -> PluginContext {
        PluginContext {
            hooks: self.dispatcher.clone(),
            settings: Arc::new(StoreSettingsService::new(self.store.clone(), plugin_id)),
            logs: Arc::new(StoreLogService::new(self.store.clone(), plugin_id)),
        }
    }

    /// Records a live instance and its descriptor under the given state.
    async fn track(
        &self,
        descriptor: &PluginDescriptor,
        plugin: Arc<dyn Plugin>,
        record_id: uuid::Uuid,
        state: PluginState,
    ) {
        let mut tracked = descriptor.clone();
        tracked.state = state;
        tracked.record_id = Some(record_id);
        self.plugins.insert(tracked, plugin).await;
    }
}
