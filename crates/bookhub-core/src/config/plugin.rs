//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory containing plugin packages (one sub-directory per plugin,
    /// each with a `plugin.json` manifest).
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Whether to discover and activate plugins on startup.
    #[serde(default = "default_true")]
    pub auto_activate: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            auto_activate: default_true(),
        }
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_true() -> bool {
    true
}
