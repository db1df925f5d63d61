//! Plugin lifecycle error taxonomy.
//!
//! Listener failures never appear here: they are caught and logged at the
//! dispatcher boundary. This enum covers the administrative path, where
//! surfacing failure to the operator is correct.

use thiserror::Error;

use bookhub_core::error::AppError;
use bookhub_entity::plugin::PluginState;

/// Errors raised by plugin discovery and lifecycle operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin package on disk is malformed (missing or invalid manifest).
    #[error("plugin package '{path}' is malformed: {reason}")]
    Discovery {
        /// Package directory.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The plugin's `on_install` hook failed; nothing was committed.
    #[error("plugin '{plugin}' failed during install: {cause}")]
    Install {
        /// Plugin name.
        plugin: String,
        /// Underlying failure.
        cause: AppError,
    },

    /// The plugin's `on_activate` hook failed; lifecycle state unchanged.
    #[error("plugin '{plugin}' failed during activation: {cause}")]
    Activation {
        /// Plugin name.
        plugin: String,
        /// Underlying failure.
        cause: AppError,
    },

    /// The manifest names an entry symbol no statically linked builder
    /// was registered for.
    #[error("plugin '{plugin}' has no linked entry point '{entry}'")]
    MissingEntry {
        /// Plugin name.
        plugin: String,
        /// Entry symbol from the manifest.
        entry: String,
    },

    /// The plugin is not known to the manager.
    #[error("plugin '{name}' is not registered with the manager")]
    Unknown {
        /// Plugin name.
        name: String,
    },

    /// The requested lifecycle transition is not legal.
    #[error("plugin '{plugin}' cannot transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Plugin name.
        plugin: String,
        /// Current state.
        from: PluginState,
        /// Requested state.
        to: PluginState,
    },

    /// The durable-storage collaborator failed; propagated loudly.
    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::Storage(e) => e,
            other => AppError::plugin(other.to_string()),
        }
    }
}
