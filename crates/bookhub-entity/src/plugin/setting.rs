//! Plugin settings rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A key-value setting owned by a plugin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PluginSetting {
    /// Owning plugin.
    pub plugin_id: Uuid,
    /// Setting key, unique per plugin.
    pub key: String,
    /// Setting value.
    pub value: String,
    /// When the setting was last written.
    pub updated_at: DateTime<Utc>,
}
