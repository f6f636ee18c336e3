//! Plugins and components.

use super::command::Command;
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A named grouping of commands owned by a plugin.
#[derive(Clone)]
pub struct Component {
    id: String,
    commands: BTreeMap<String, Arc<Command>>,
}

impl Component {
    /// Creates a component with the given id and commands.
    ///
    /// Command ids are unique within the component; a duplicate id keeps
    /// the last command given.
    pub fn new(id: impl Into<String>, commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            id: id.into(),
            commands: commands
                .into_iter()
                .map(|command| (command.id().to_string(), Arc::new(command)))
                .collect(),
        }
    }

    /// Unique id of this component within its plugin.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Looks up a command by id.
    pub fn command(&self, id: &str) -> Option<Arc<Command>> {
        self.commands.get(id).cloned()
    }

    /// All commands of this component, id-ascending.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.values().cloned().collect()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A named, versioned bundle of automation components and commands.
///
/// Plugins are immutable once registered in the catalog; the catalog
/// hands out `Arc<Plugin>` snapshots.
pub struct Plugin {
    name: String,
    version: Version,
    description: Option<String>,
    commands: BTreeMap<String, Arc<Command>>,
    components: BTreeMap<String, Component>,
    node_groups: BTreeSet<String>,
    bootstrap_routine: bool,
}

impl Plugin {
    /// Starts building a plugin with the given name and version.
    pub fn builder(name: impl Into<String>, version: Version) -> PluginBuilder {
        PluginBuilder {
            name: name.into(),
            version,
            description: None,
            commands: BTreeMap::new(),
            components: BTreeMap::new(),
            node_groups: BTreeSet::new(),
            bootstrap_routine: false,
        }
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plugin version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Optional human-readable description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Looks up a plugin-level command by id.
    pub fn command(&self, id: &str) -> Option<Arc<Command>> {
        self.commands.get(id).cloned()
    }

    /// All plugin-level commands, id-ascending.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.values().cloned().collect()
    }

    /// Looks up a component by id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// All components, id-ascending.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Node-group names this plugin declares for manifest validation.
    pub fn node_groups(&self) -> &BTreeSet<String> {
        &self.node_groups
    }

    /// Whether this plugin declares a bootstrap routine.
    pub fn has_bootstrap_routine(&self) -> bool {
        self.bootstrap_routine
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("node_groups", &self.node_groups)
            .field("bootstrap_routine", &self.bootstrap_routine)
            .finish()
    }
}

/// Builder for [`Plugin`].
pub struct PluginBuilder {
    name: String,
    version: Version,
    description: Option<String>,
    commands: BTreeMap<String, Arc<Command>>,
    components: BTreeMap<String, Component>,
    node_groups: BTreeSet<String>,
    bootstrap_routine: bool,
}

impl PluginBuilder {
    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a plugin-level command.
    pub fn command(mut self, command: Command) -> Self {
        self.commands
            .insert(command.id().to_string(), Arc::new(command));
        self
    }

    /// Adds a component.
    pub fn component(mut self, component: Component) -> Self {
        self.components.insert(component.id().to_string(), component);
        self
    }

    /// Declares a node group used for manifest validation.
    pub fn node_group(mut self, name: impl Into<String>) -> Self {
        self.node_groups.insert(name.into());
        self
    }

    /// Marks the plugin as carrying a bootstrap routine.
    pub fn bootstrap_routine(mut self) -> Self {
        self.bootstrap_routine = true;
        self
    }

    /// Finishes the build.
    pub fn build(self) -> Plugin {
        Plugin {
            name: self.name,
            version: self.version,
            description: self.description,
            commands: self.commands,
            components: self.components,
            node_groups: self.node_groups,
            bootstrap_routine: self.bootstrap_routine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::command::{CommandBody, CommandContext, CommandResult};
    use std::future::Future;
    use std::pin::Pin;

    struct NoopBody;

    impl CommandBody for NoopBody {
        fn execute<'a>(
            &'a self,
            _ctx: &'a mut CommandContext,
        ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
            Box::pin(async { CommandResult::Success(serde_json::Value::Null) })
        }
    }

    fn command(id: &str) -> Command {
        Command::new(id, format!("{} command", id), Arc::new(NoopBody))
    }

    #[test]
    fn test_builder_assembles_plugin() {
        let plugin = Plugin::builder("rabbitmq", Version::new(1, 2, 3))
            .description("message broker automation")
            .command(command("restart"))
            .component(Component::new("broker", [command("upgrade")]))
            .node_group("broker_node")
            .bootstrap_routine()
            .build();

        assert_eq!(plugin.name(), "rabbitmq");
        assert_eq!(plugin.version(), &Version::new(1, 2, 3));
        assert!(plugin.command("restart").is_some());
        assert!(plugin.command("upgrade").is_none());
        assert!(plugin.component("broker").is_some());
        assert!(plugin.has_bootstrap_routine());
        assert!(plugin.node_groups().contains("broker_node"));
    }

    #[test]
    fn test_component_owns_its_commands() {
        let component = Component::new("broker", [command("upgrade"), command("status")]);

        assert_eq!(component.id(), "broker");
        assert!(component.command("upgrade").is_some());
        assert!(component.command("restart").is_none());
        assert_eq!(component.commands().len(), 2);
    }

    #[test]
    fn test_plugin_without_bootstrap_routine() {
        let plugin = Plugin::builder("nginx", Version::new(0, 1, 0)).build();
        assert!(!plugin.has_bootstrap_routine());
        assert!(plugin.node_groups().is_empty());
    }
}
