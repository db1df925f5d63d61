//! Durable hook registration rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted hook registration.
///
/// `handler_ref` is the handler's stable callback reference (its `id()`);
/// rehydration matches rows back to live handlers by this string. `active`
/// rows are turned into registry entries at bootstrap; inactive rows are
/// kept so deactivate/reactivate loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HookRegistrationRow {
    /// Surrogate identifier. Row insertion order doubles as the stable
    /// tie-break for equal priorities across restarts.
    pub id: i64,
    /// Owning plugin.
    pub plugin_id: Uuid,
    /// Dot-convention hook name (e.g. `scrape.fetch.custom`).
    pub hook: String,
    /// Stable callback reference of the handler.
    pub handler_ref: String,
    /// Dispatch priority (lower runs first).
    pub priority: i32,
    /// Whether the registration participates in dispatch.
    pub active: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to persist a new hook registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHookRegistration {
    /// Owning plugin.
    pub plugin_id: Uuid,
    /// Dot-convention hook name.
    pub hook: String,
    /// Stable callback reference of the handler.
    pub handler_ref: String,
    /// Dispatch priority (lower runs first).
    pub priority: i32,
    /// Whether the registration participates in dispatch.
    pub active: bool,
}
