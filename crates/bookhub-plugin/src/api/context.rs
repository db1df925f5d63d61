//! Plugin context — services and resources available to plugins.

use std::sync::Arc;

use async_trait::async_trait;

use bookhub_core::result::AppResult;

use crate::hooks::dispatcher::HookDispatcher;

/// Context passed to plugin constructors and lifecycle hooks.
///
/// Gives a plugin its dispatcher handle (for firing hooks of its own) and
/// narrow, plugin-scoped views of durable settings and diagnostics.
#[derive(Clone)]
pub struct PluginContext {
    /// Hook dispatcher.
    pub hooks: Arc<HookDispatcher>,
    /// Settings accessor, scoped to the owning plugin.
    pub settings: Arc<dyn PluginSettingsService>,
    /// Diagnostic log writer, scoped to the owning plugin.
    pub logs: Arc<dyn PluginLogService>,
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext").finish()
    }
}

/// Settings operations available to plugins.
#[async_trait]
pub trait PluginSettingsService: Send + Sync {
    /// Reads a setting.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    /// Writes a setting (upsert).
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// Diagnostic logging available to plugins.
#[async_trait]
pub trait PluginLogService: Send + Sync {
    /// Appends a diagnostic record.
    async fn append(&self, level: &str, message: &str) -> AppResult<()>;
}
