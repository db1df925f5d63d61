//! Store-backed implementations of the plugin context services.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use bookhub_core::result::AppResult;

use crate::store::PluginStore;

use super::context::{PluginLogService, PluginSettingsService};

/// Settings service scoped to one plugin's rows in the store.
pub struct StoreSettingsService {
    store: Arc<dyn PluginStore>,
    plugin_id: Uuid,
}

impl StoreSettingsService {
    /// Creates a settings service for a plugin.
    pub fn new(store: Arc<dyn PluginStore>, plugin_id: Uuid) -> Self {
        Self { store, plugin_id }
    }
}

#[async_trait]
impl PluginSettingsService for StoreSettingsService {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.store.get_setting(self.plugin_id, key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.store.put_setting(self.plugin_id, key, value).await
    }
}

/// Log service scoped to one plugin's stream in the store.
pub struct StoreLogService {
    store: Arc<dyn PluginStore>,
    plugin_id: Uuid,
}

impl StoreLogService {
    /// Creates a log service for a plugin.
    pub fn new(store: Arc<dyn PluginStore>, plugin_id: Uuid) -> Self {
        Self { store, plugin_id }
    }
}

#[async_trait]
impl PluginLogService for StoreLogService {
    async fn append(&self, level: &str, message: &str) -> AppResult<()> {
        self.store.append_log(self.plugin_id, level, message).await
    }
}
