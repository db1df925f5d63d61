//! Plugin lifecycle state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a plugin.
///
/// Transitions: `Discovered → Installed → Active ⇄ Inactive → Uninstalled`.
/// `Uninstalled` is terminal; a plugin found again on disk after uninstall
/// re-enters at `Discovered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "plugin_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    /// Found on disk, never installed.
    Discovered,
    /// One-time setup ran; not yet receiving events.
    Installed,
    /// Registrations live; receiving events.
    Active,
    /// Registrations suspended; data preserved.
    Inactive,
    /// Removed; registrations and settings destroyed.
    Uninstalled,
}

impl PluginState {
    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: PluginState) -> bool {
        use PluginState::*;
        matches!(
            (self, next),
            (Discovered, Installed)
                | (Installed, Active)
                | (Active, Inactive)
                | (Inactive, Active)
                // activate is idempotent
                | (Active, Active)
                | (Inactive, Uninstalled)
                | (Installed, Uninstalled)
        )
    }

    /// Whether the plugin's registrations should be live in the registry.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Installed => "installed",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Uninstalled => "uninstalled",
        }
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(PluginState::Discovered.can_transition_to(PluginState::Installed));
        assert!(PluginState::Installed.can_transition_to(PluginState::Active));
        assert!(PluginState::Active.can_transition_to(PluginState::Inactive));
        assert!(PluginState::Inactive.can_transition_to(PluginState::Active));
        assert!(PluginState::Inactive.can_transition_to(PluginState::Uninstalled));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!PluginState::Discovered.can_transition_to(PluginState::Active));
        assert!(!PluginState::Uninstalled.can_transition_to(PluginState::Active));
        assert!(!PluginState::Active.can_transition_to(PluginState::Uninstalled));
        assert!(!PluginState::Active.can_transition_to(PluginState::Discovered));
    }

    #[test]
    fn test_activate_is_idempotent() {
        assert!(PluginState::Active.can_transition_to(PluginState::Active));
    }
}
