//! In-memory plugin store.
//!
//! Backs tests and database-less deployments. State lives for the process
//! lifetime only, so registrations stored here are transient and vanish
//! on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bookhub_core::result::AppResult;
use bookhub_entity::plugin::{
    HookRegistrationRow, NewHookRegistration, PluginLogEntry, PluginRecord, PluginState,
};

use super::PluginStore;

#[derive(Debug, Default)]
struct Inner {
    plugins: Vec<PluginRecord>,
    registrations: Vec<HookRegistrationRow>,
    settings: HashMap<(Uuid, String), String>,
    logs: Vec<PluginLogEntry>,
    next_registration_id: i64,
    next_log_id: i64,
}

/// Process-local [`PluginStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginStore for MemoryStore {
    async fn get_or_create_plugin(&self, name: &str, version: &str) -> AppResult<PluginRecord> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.plugins.iter_mut().find(|p| p.name == name) {
            record.version = version.to_string();
            record.updated_at = Utc::now();
            return Ok(record.clone());
        }

        let now = Utc::now();
        let record = PluginRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            version: version.to_string(),
            state: PluginState::Discovered,
            created_at: now,
            updated_at: now,
        };
        inner.plugins.push(record.clone());
        Ok(record)
    }

    async fn find_plugin(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.plugins.iter().find(|p| p.name == name).cloned())
    }

    async fn set_plugin_state(&self, plugin_id: Uuid, state: PluginState) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.plugins.iter_mut().find(|p| p.id == plugin_id) {
            record.state = state;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_plugins(&self) -> AppResult<Vec<PluginRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.plugins.clone())
    }

    async fn insert_registration(&self, registration: &NewHookRegistration) -> AppResult<i64> {
        let mut inner = self.inner.write().await;

        // Upsert on (plugin_id, hook, handler_ref), matching the unique
        // constraint the SQL store enforces.
        if let Some(row) = inner.registrations.iter_mut().find(|r| {
            r.plugin_id == registration.plugin_id
                && r.hook == registration.hook
                && r.handler_ref == registration.handler_ref
        }) {
            row.priority = registration.priority;
            row.active = registration.active;
            return Ok(row.id);
        }

        inner.next_registration_id += 1;
        let id = inner.next_registration_id;
        inner.registrations.push(HookRegistrationRow {
            id,
            plugin_id: registration.plugin_id,
            hook: registration.hook.clone(),
            handler_ref: registration.handler_ref.clone(),
            priority: registration.priority,
            active: registration.active,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_registrations_for_plugin(
        &self,
        plugin_id: Uuid,
    ) -> AppResult<Vec<HookRegistrationRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<HookRegistrationRow> = inner
            .registrations
            .iter()
            .filter(|r| r.plugin_id == plugin_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn set_registrations_active(&self, plugin_id: Uuid, active: bool) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        for row in inner
            .registrations
            .iter_mut()
            .filter(|r| r.plugin_id == plugin_id)
        {
            row.active = active;
        }
        Ok(())
    }

    async fn delete_registrations_for_plugin(&self, plugin_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.registrations.len();
        inner.registrations.retain(|r| r.plugin_id != plugin_id);
        Ok((before - inner.registrations.len()) as u64)
    }

    async fn get_setting(&self, plugin_id: Uuid, key: &str) -> AppResult<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner.settings.get(&(plugin_id, key.to_string())).cloned())
    }

    async fn put_setting(&self, plugin_id: Uuid, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .settings
            .insert((plugin_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn delete_settings_for_plugin(&self, plugin_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.settings.len();
        inner.settings.retain(|(id, _), _| *id != plugin_id);
        Ok((before - inner.settings.len()) as u64)
    }

    async fn append_log(&self, plugin_id: Uuid, level: &str, message: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.next_log_id += 1;
        let id = inner.next_log_id;
        inner.logs.push(PluginLogEntry {
            id,
            plugin_id,
            level: level.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_logs(&self, plugin_id: Uuid, limit: i64) -> AppResult<Vec<PluginLogEntry>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<PluginLogEntry> = inner
            .logs
            .iter()
            .filter(|l| l.plugin_id == plugin_id)
            .cloned()
            .collect();
        rows.sort_by_key(|l| std::cmp::Reverse(l.id));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.get_or_create_plugin("ratings", "1.0.0").await.unwrap();
        let second = store.get_or_create_plugin("ratings", "1.1.0").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.version, "1.1.0");
    }

    #[tokio::test]
    async fn test_registration_rows_keep_insertion_order() {
        let store = MemoryStore::new();
        let plugin = store.get_or_create_plugin("ratings", "1.0.0").await.unwrap();

        for handler_ref in ["a", "b", "c"] {
            store
                .insert_registration(&NewHookRegistration {
                    plugin_id: plugin.id,
                    hook: "book.data.modify".to_string(),
                    handler_ref: handler_ref.to_string(),
                    priority: 10,
                    active: true,
                })
                .await
                .unwrap();
        }

        let rows = store.list_registrations_for_plugin(plugin.id).await.unwrap();
        let refs: Vec<&str> = rows.iter().map(|r| r.handler_ref.as_str()).collect();
        assert_eq!(refs, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_delete_scopes_to_plugin() {
        let store = MemoryStore::new();
        let p1 = store.get_or_create_plugin("one", "1.0.0").await.unwrap();
        let p2 = store.get_or_create_plugin("two", "1.0.0").await.unwrap();

        store.put_setting(p1.id, "k", "v").await.unwrap();
        store.put_setting(p2.id, "k", "v").await.unwrap();

        assert_eq!(store.delete_settings_for_plugin(p1.id).await.unwrap(), 1);
        assert_eq!(store.get_setting(p2.id, "k").await.unwrap().as_deref(), Some("v"));
    }
}
