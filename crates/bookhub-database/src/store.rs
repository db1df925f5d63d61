//! PostgreSQL implementation of the plugin store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bookhub_core::error::{AppError, ErrorKind};
use bookhub_core::result::AppResult;
use bookhub_entity::plugin::{
    HookRegistrationRow, NewHookRegistration, PluginLogEntry, PluginRecord, PluginState,
};
use bookhub_plugin::store::PluginStore;

/// Durable [`PluginStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgPluginStore {
    pool: PgPool,
}

impl PgPluginStore {
    /// Create a new store over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PluginStore for PgPluginStore {
    async fn get_or_create_plugin(&self, name: &str, version: &str) -> AppResult<PluginRecord> {
        sqlx::query_as::<_, PluginRecord>(
            "INSERT INTO plugins (name, version) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET version = EXCLUDED.version, updated_at = NOW() \
             RETURNING *",
        )
        .bind(name)
        .bind(version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert plugin", e))
    }

    async fn find_plugin(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>("SELECT * FROM plugins WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find plugin", e))
    }

    async fn set_plugin_state(&self, plugin_id: Uuid, state: PluginState) -> AppResult<()> {
        sqlx::query("UPDATE plugins SET state = $2, updated_at = NOW() WHERE id = $1")
            .bind(plugin_id)
            .bind(state)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update plugin state", e)
            })?;
        Ok(())
    }

    async fn list_plugins(&self) -> AppResult<Vec<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>("SELECT * FROM plugins ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list plugins", e))
    }

    async fn insert_registration(&self, registration: &NewHookRegistration) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO hook_registrations (plugin_id, hook, handler_ref, priority, active) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (plugin_id, hook, handler_ref) \
             DO UPDATE SET priority = EXCLUDED.priority, active = EXCLUDED.active \
             RETURNING id",
        )
        .bind(registration.plugin_id)
        .bind(&registration.hook)
        .bind(&registration.handler_ref)
        .bind(registration.priority)
        .bind(registration.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert hook registration", e)
        })
    }

    async fn list_registrations_for_plugin(
        &self,
        plugin_id: Uuid,
    ) -> AppResult<Vec<HookRegistrationRow>> {
        sqlx::query_as::<_, HookRegistrationRow>(
            "SELECT * FROM hook_registrations WHERE plugin_id = $1 ORDER BY id",
        )
        .bind(plugin_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list hook registrations", e)
        })
    }

    async fn set_registrations_active(&self, plugin_id: Uuid, active: bool) -> AppResult<()> {
        sqlx::query("UPDATE hook_registrations SET active = $2 WHERE plugin_id = $1")
            .bind(plugin_id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to update hook registration activity",
                    e,
                )
            })?;
        Ok(())
    }

    async fn delete_registrations_for_plugin(&self, plugin_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM hook_registrations WHERE plugin_id = $1")
            .bind(plugin_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete hook registrations", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn get_setting(&self, plugin_id: Uuid, key: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM plugin_settings WHERE plugin_id = $1 AND key = $2",
        )
        .bind(plugin_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read plugin setting", e))
    }

    async fn put_setting(&self, plugin_id: Uuid, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO plugin_settings (plugin_id, key, value) VALUES ($1, $2, $3) \
             ON CONFLICT (plugin_id, key) \
             DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(plugin_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to write plugin setting", e)
        })?;
        Ok(())
    }

    async fn delete_settings_for_plugin(&self, plugin_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM plugin_settings WHERE plugin_id = $1")
            .bind(plugin_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete plugin settings", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn append_log(&self, plugin_id: Uuid, level: &str, message: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO plugin_logs (plugin_id, level, message) VALUES ($1, $2, $3)")
            .bind(plugin_id)
            .bind(level)
            .bind(message)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to append plugin log", e)
            })?;
        Ok(())
    }

    async fn list_logs(&self, plugin_id: Uuid, limit: i64) -> AppResult<Vec<PluginLogEntry>> {
        sqlx::query_as::<_, PluginLogEntry>(
            "SELECT * FROM plugin_logs WHERE plugin_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(plugin_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list plugin logs", e))
    }
}
