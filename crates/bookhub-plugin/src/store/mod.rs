//! Durable-storage collaborator for the plugin lifecycle.
//!
//! The engine only ever talks to [`PluginStore`]; the Postgres
//! implementation lives in `bookhub-database`, and [`MemoryStore`] backs
//! tests and database-less deployments.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use bookhub_core::result::AppResult;
use bookhub_entity::plugin::{
    HookRegistrationRow, NewHookRegistration, PluginLogEntry, PluginRecord, PluginState,
};

pub use memory::MemoryStore;

/// Narrow persistence surface required by the plugin manager.
///
/// Every method must be individually atomic; the manager composes them
/// into idempotent, self-cleaning lifecycle operations so a failure
/// between calls cannot leave state a retry would not repair.
#[async_trait]
pub trait PluginStore: Send + Sync + std::fmt::Debug {
    /// Returns the plugin row for `name`, creating it in `Discovered`
    /// state when missing. The version is updated on every call.
    async fn get_or_create_plugin(&self, name: &str, version: &str) -> AppResult<PluginRecord>;

    /// Looks up a plugin row by name.
    async fn find_plugin(&self, name: &str) -> AppResult<Option<PluginRecord>>;

    /// Updates a plugin's lifecycle state.
    async fn set_plugin_state(&self, plugin_id: Uuid, state: PluginState) -> AppResult<()>;

    /// Lists every persisted plugin row.
    async fn list_plugins(&self) -> AppResult<Vec<PluginRecord>>;

    /// Persists a hook registration and returns its row id.
    async fn insert_registration(&self, registration: &NewHookRegistration) -> AppResult<i64>;

    /// Lists a plugin's registrations in insertion order.
    async fn list_registrations_for_plugin(
        &self,
        plugin_id: Uuid,
    ) -> AppResult<Vec<HookRegistrationRow>>;

    /// Flips the `active` flag on all of a plugin's registrations.
    async fn set_registrations_active(&self, plugin_id: Uuid, active: bool) -> AppResult<()>;

    /// Deletes all of a plugin's registrations, returning the count removed.
    async fn delete_registrations_for_plugin(&self, plugin_id: Uuid) -> AppResult<u64>;

    /// Reads a plugin setting.
    async fn get_setting(&self, plugin_id: Uuid, key: &str) -> AppResult<Option<String>>;

    /// Writes a plugin setting (upsert).
    async fn put_setting(&self, plugin_id: Uuid, key: &str, value: &str) -> AppResult<()>;

    /// Deletes all of a plugin's settings, returning the count removed.
    async fn delete_settings_for_plugin(&self, plugin_id: Uuid) -> AppResult<u64>;

    /// Appends a diagnostic log entry for a plugin.
    async fn append_log(&self, plugin_id: Uuid, level: &str, message: &str) -> AppResult<()>;

    /// Lists a plugin's most recent log entries, newest first.
    async fn list_logs(&self, plugin_id: Uuid, limit: i64) -> AppResult<Vec<PluginLogEntry>>;
}
