//! Manifest-based plugin discovery.
//!
//! A plugin package is a directory containing a `plugin.json` manifest.
//! Discovery reads manifests only; resolving the manifest's `entry` symbol
//! to a statically linked builder happens later, in the manager. Package
//! directories are visited in lexical order so registration sequence is
//! deterministic across processes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use bookhub_core::result::AppResult;
use bookhub_entity::plugin::PluginState;

use crate::error::PluginError;

/// Manifest file name expected inside each plugin package directory.
pub const MANIFEST_FILE: &str = "plugin.json";

/// Plugin package manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Stable unique plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Entry symbol resolved against the manager's builder registry.
    pub entry: String,
    /// Plugin description.
    #[serde(default)]
    pub description: Option<String>,
    /// Author or maintainer.
    #[serde(default)]
    pub author: Option<String>,
}

impl PluginManifest {
    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PluginError> {
        let manifest: PluginManifest =
            serde_json::from_str(json).map_err(|e| PluginError::Discovery {
                path: MANIFEST_FILE.to_string(),
                reason: e.to_string(),
            })?;
        if manifest.name.is_empty() || manifest.entry.is_empty() {
            return Err(PluginError::Discovery {
                path: MANIFEST_FILE.to_string(),
                reason: "manifest requires non-empty 'name' and 'entry'".to_string(),
            });
        }
        Ok(manifest)
    }

    /// Loads a manifest from a package directory.
    pub fn from_dir(dir: &Path) -> Result<Self, PluginError> {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| PluginError::Discovery {
            path: dir.display().to_string(),
            reason: format!("cannot read {MANIFEST_FILE}: {e}"),
        })?;
        Self::from_json(&content).map_err(|e| match e {
            PluginError::Discovery { reason, .. } => PluginError::Discovery {
                path: dir.display().to_string(),
                reason,
            },
            other => other,
        })
    }
}

/// An in-memory plugin descriptor produced by discovery and threaded
/// through the lifecycle operations.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    /// Stable unique plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Entry symbol from the manifest.
    pub entry: String,
    /// Package directory.
    pub root: PathBuf,
    /// Lifecycle state as last observed by the manager.
    pub state: PluginState,
    /// Surrogate id once a durable row exists.
    pub record_id: Option<Uuid>,
}

impl PluginDescriptor {
    /// Builds a freshly discovered descriptor from a manifest.
    pub fn from_manifest(manifest: &PluginManifest, root: PathBuf) -> Self {
        Self {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            entry: manifest.entry.clone(),
            root,
            state: PluginState::Discovered,
            record_id: None,
        }
    }
}

/// Scans a directory tree for plugin packages.
///
/// Malformed packages are logged and skipped; they take no further part
/// in lifecycle operations. A missing root directory yields an empty set.
pub fn discover(root: &Path) -> AppResult<Vec<PluginDescriptor>> {
    if !root.exists() {
        warn!(root = %root.display(), "Plugin directory does not exist; nothing to discover");
        return Ok(Vec::new());
    }

    let mut package_dirs: Vec<PathBuf> = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    // Lexical order keeps registration sequence reproducible.
    package_dirs.sort();

    let mut descriptors = Vec::new();
    for dir in package_dirs {
        match PluginManifest::from_dir(&dir) {
            Ok(manifest) => {
                descriptors.push(PluginDescriptor::from_manifest(&manifest, dir));
            }
            Err(e) => {
                error!(package = %dir.display(), error = %e, "Skipping malformed plugin package");
            }
        }
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "name": "openlibrary",
            "version": "1.0.0",
            "entry": "openlibrary_plugin",
            "description": "Open Library scrape source"
        }"#;

        let manifest = PluginManifest::from_json(json).unwrap();
        assert_eq!(manifest.name, "openlibrary");
        assert_eq!(manifest.entry, "openlibrary_plugin");
        assert!(manifest.author.is_none());
    }

    #[test]
    fn test_manifest_requires_name_and_entry() {
        let json = r#"{"name": "", "version": "1.0.0", "entry": "x"}"#;
        assert!(PluginManifest::from_json(json).is_err());

        let json = r#"{"name": "x", "version": "1.0.0"}"#;
        assert!(PluginManifest::from_json(json).is_err());
    }

    #[test]
    fn test_discover_missing_root_is_empty() {
        let root = std::env::temp_dir().join(format!("bookhub-missing-{}", Uuid::new_v4()));
        let descriptors = discover(&root).unwrap();
        assert!(descriptors.is_empty());
    }

    #[test]
    fn test_discover_sorts_and_skips_malformed() {
        let root = std::env::temp_dir().join(format!("bookhub-discover-{}", Uuid::new_v4()));
        for (dir, manifest) in [
            ("zeta", r#"{"name": "zeta", "version": "1.0", "entry": "zeta_plugin"}"#),
            ("alpha", r#"{"name": "alpha", "version": "1.0", "entry": "alpha_plugin"}"#),
            ("broken", "not json"),
        ] {
            let path = root.join(dir);
            std::fs::create_dir_all(&path).unwrap();
            std::fs::write(path.join(MANIFEST_FILE), manifest).unwrap();
        }

        let descriptors = discover(&root).unwrap();
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(descriptors.iter().all(|d| d.state == PluginState::Discovered));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
