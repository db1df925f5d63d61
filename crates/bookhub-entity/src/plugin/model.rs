//! Plugin descriptor row model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::state::PluginState;

/// A plugin as persisted in durable storage.
///
/// The row exists from first install onward; `Discovered` plugins live
/// only in memory until installed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PluginRecord {
    /// Surrogate identifier.
    pub id: Uuid,
    /// Stable unique plugin name (matches the manifest).
    pub name: String,
    /// Version string at last install/activate.
    pub version: String,
    /// Current lifecycle state.
    pub state: PluginState,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}
