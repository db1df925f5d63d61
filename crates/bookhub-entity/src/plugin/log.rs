//! Plugin diagnostic log rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An append-only diagnostic record written by or about a plugin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PluginLogEntry {
    /// Surrogate identifier.
    pub id: i64,
    /// Owning plugin.
    pub plugin_id: Uuid,
    /// Severity: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
    /// Log message.
    pub message: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
