//! The plugin catalog - registry of plugins keyed by (name, version).

use super::model::Plugin;
use crate::error::CoreError;
use dashmap::DashMap;
use semver::Version;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Registry of plugins, resolving exact and "latest" lookups.
///
/// Entries are keyed by name; each name maps to its registered versions
/// in semver order. Re-registering an existing (name, version) replaces
/// the plugin atomically - the per-name map is swapped under the entry
/// lock, so readers see either the old or the new plugin, never a
/// partial state.
#[derive(Default)]
pub struct PluginCatalog {
    plugins: DashMap<String, BTreeMap<Version, Arc<Plugin>>>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin, replacing any existing plugin at the same (name, version).
    pub fn register(&self, plugin: Plugin) -> Arc<Plugin> {
        let name = plugin.name().to_string();
        let version = plugin.version().clone();
        let plugin = Arc::new(plugin);

        let replaced = self
            .plugins
            .entry(name.clone())
            .or_default()
            .insert(version.clone(), Arc::clone(&plugin))
            .is_some();

        info!(
            plugin = %name,
            version = %version,
            replaced,
            "Plugin registered"
        );
        plugin
    }

    /// Resolves a plugin by name and optional exact version.
    ///
    /// With no constraint, resolves to the highest registered version
    /// ("latest") by semver total order - release sorts above pre-release
    /// at the same triple, and insertion order never matters.
    pub fn find(
        &self,
        name: &str,
        version: Option<&Version>,
    ) -> Result<Arc<Plugin>, CoreError> {
        let not_found = || CoreError::PluginNotFound {
            name: name.to_string(),
            version_constraint: version.cloned(),
        };

        let versions = self.plugins.get(name).ok_or_else(not_found)?;
        match version {
            Some(exact) => versions.get(exact).cloned().ok_or_else(not_found),
            None => versions
                .last_key_value()
                .map(|(_, plugin)| Arc::clone(plugin))
                .ok_or_else(not_found),
        }
    }

    /// Resolves the latest version of the named plugin.
    pub fn latest(&self, name: &str) -> Result<Arc<Plugin>, CoreError> {
        self.find(name, None)
    }

    /// All registered versions for the name, descending. Empty when the
    /// name is unknown.
    pub fn versions(&self, name: &str) -> Vec<Version> {
        self.plugins
            .get(name)
            .map(|versions| versions.keys().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Every registered plugin, name-ascending then version-descending.
    pub fn list(&self) -> Vec<Arc<Plugin>> {
        let mut names: Vec<String> = self.plugins.iter().map(|e| e.key().clone()).collect();
        names.sort();

        let mut result = Vec::new();
        for name in names {
            if let Some(versions) = self.plugins.get(&name) {
                result.extend(versions.values().rev().cloned());
            }
        }
        result
    }
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("names", &self.plugins.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str, version: &str) -> Plugin {
        Plugin::builder(name, Version::parse(version).unwrap()).build()
    }

    #[test]
    fn test_find_exact_version() {
        let catalog = PluginCatalog::new();
        catalog.register(plugin("rabbitmq", "1.0.0"));
        catalog.register(plugin("rabbitmq", "1.1.0"));

        let found = catalog
            .find("rabbitmq", Some(&Version::new(1, 0, 0)))
            .unwrap();
        assert_eq!(found.version(), &Version::new(1, 0, 0));
    }

    #[test]
    fn test_latest_picks_highest_version() {
        let catalog = PluginCatalog::new();
        // Registration order must not matter.
        catalog.register(plugin("rabbitmq", "1.1.0"));
        catalog.register(plugin("rabbitmq", "1.2.0"));
        catalog.register(plugin("rabbitmq", "1.0.0"));

        let latest = catalog.latest("rabbitmq").unwrap();
        assert_eq!(latest.version(), &Version::new(1, 2, 0));
    }

    #[test]
    fn test_release_beats_prerelease() {
        let catalog = PluginCatalog::new();
        catalog.register(plugin("rabbitmq", "2.0.0-rc.1"));
        catalog.register(plugin("rabbitmq", "2.0.0"));

        let latest = catalog.latest("rabbitmq").unwrap();
        assert_eq!(latest.version(), &Version::new(2, 0, 0));
    }

    #[test]
    fn test_find_unknown_name_fails() {
        let catalog = PluginCatalog::new();
        let err = catalog.find("nginx", None).unwrap_err();
        assert_eq!(
            err,
            CoreError::PluginNotFound {
                name: "nginx".to_string(),
                version_constraint: None,
            }
        );
    }

    #[test]
    fn test_find_unknown_version_carries_constraint() {
        let catalog = PluginCatalog::new();
        catalog.register(plugin("rabbitmq", "1.0.0"));

        let err = catalog
            .find("rabbitmq", Some(&Version::new(9, 9, 9)))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::PluginNotFound {
                name: "rabbitmq".to_string(),
                version_constraint: Some(Version::new(9, 9, 9)),
            }
        );
    }

    #[test]
    fn test_versions_descending() {
        let catalog = PluginCatalog::new();
        catalog.register(plugin("rabbitmq", "1.0.0"));
        catalog.register(plugin("rabbitmq", "1.2.0"));
        catalog.register(plugin("rabbitmq", "1.1.0"));

        let versions = catalog.versions("rabbitmq");
        assert_eq!(
            versions,
            vec![
                Version::new(1, 2, 0),
                Version::new(1, 1, 0),
                Version::new(1, 0, 0)
            ]
        );
        assert!(catalog.versions("nginx").is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let catalog = PluginCatalog::new();
        catalog.register(plugin("rabbitmq", "1.0.0"));
        catalog.register(
            Plugin::builder("rabbitmq", Version::new(1, 0, 0))
                .description("second registration")
                .build(),
        );

        let found = catalog.latest("rabbitmq").unwrap();
        assert_eq!(found.description(), Some("second registration"));
        assert_eq!(catalog.versions("rabbitmq").len(), 1);
    }

    #[test]
    fn test_list_orders_by_name_then_version() {
        let catalog = PluginCatalog::new();
        catalog.register(plugin("nginx", "0.1.0"));
        catalog.register(plugin("rabbitmq", "1.0.0"));
        catalog.register(plugin("rabbitmq", "1.1.0"));

        let listed: Vec<(String, Version)> = catalog
            .list()
            .into_iter()
            .map(|p| (p.name().to_string(), p.version().clone()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("nginx".to_string(), Version::new(0, 1, 0)),
                ("rabbitmq".to_string(), Version::new(1, 1, 0)),
                ("rabbitmq".to_string(), Version::new(1, 0, 0)),
            ]
        );
    }
}
