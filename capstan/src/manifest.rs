//! Node-group manifests and their validation against a plugin.
//!
//! A manifest describes the node groups a provision or bootstrap request
//! targets. Before a job is created the manifest is checked against the
//! resolved plugin's declared groups; any mismatch is reported with the
//! full sets of missing and unexpected group names.

use crate::error::CoreError;
use crate::plugin::Plugin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A structural description of target node groups.
///
/// Group names map to the node hostnames assigned to that group. The
/// core validates group names only; node addressing is interpreted by
/// the provision/bootstrap drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    groups: BTreeMap<String, Vec<String>>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manifest from (group, nodes) pairs.
    pub fn from_groups<G, N>(groups: G) -> Self
    where
        G: IntoIterator<Item = (String, N)>,
        N: IntoIterator<Item = String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|(name, nodes)| (name, nodes.into_iter().collect()))
                .collect(),
        }
    }

    /// Adds a node group.
    pub fn insert_group(
        &mut self,
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = String>,
    ) {
        self.groups.insert(name.into(), nodes.into_iter().collect());
    }

    /// The manifest's node groups.
    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }

    /// Validates this manifest for a provision request.
    pub fn validate_provision(&self, plugin: &Plugin) -> Result<(), CoreError> {
        match self.group_mismatch(plugin) {
            None => Ok(()),
            Some((missing_groups, unexpected_groups)) => {
                Err(CoreError::InvalidProvisionManifest {
                    missing_groups,
                    unexpected_groups,
                })
            }
        }
    }

    /// Validates this manifest for a bootstrap request.
    pub fn validate_bootstrap(&self, plugin: &Plugin) -> Result<(), CoreError> {
        match self.group_mismatch(plugin) {
            None => Ok(()),
            Some((missing_groups, unexpected_groups)) => {
                Err(CoreError::InvalidBootstrapManifest {
                    missing_groups,
                    unexpected_groups,
                })
            }
        }
    }

    /// Compares manifest groups with the plugin's declared groups.
    ///
    /// Returns `(missing, unexpected)` when the sets differ: missing are
    /// declared by the plugin but absent here, unexpected are present
    /// here but undeclared.
    fn group_mismatch(&self, plugin: &Plugin) -> Option<(Vec<String>, Vec<String>)> {
        let missing: Vec<String> = plugin
            .node_groups()
            .iter()
            .filter(|group| !self.groups.contains_key(*group))
            .cloned()
            .collect();
        let unexpected: Vec<String> = self
            .groups
            .keys()
            .filter(|group| !plugin.node_groups().contains(*group))
            .cloned()
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            None
        } else {
            Some((missing, unexpected))
        }
    }
}
