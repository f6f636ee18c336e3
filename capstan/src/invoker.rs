//! The command invoker - public entry points for command invocation.
//!
//! The invoker is a stateless coordinator: it resolves the plugin through
//! the catalog, resolves the command through the resolver, and hands
//! execution to the job supervisor, returning the supervisor's ticket
//! unchanged. It holds no job state and is safe to call from any number
//! of concurrent callers. Sibling services are found through the service
//! registry on every call, so construction order never matters.

use crate::error::CoreError;
use crate::job::{JobSupervisor, JobTicket};
use crate::plugin::{resolver, Command, Plugin, PluginCatalog};
use crate::registry::{names, ServiceRegistry};
use semver::Version;
use std::sync::Arc;
use tracing::info;

/// Options accepted by both invocation entry points.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Arguments forwarded to the command body. Defaults to empty.
    pub arguments: Vec<String>,

    /// Exact version to resolve the plugin at; latest when absent. The
    /// request surface parses version strings before calling the core.
    pub version: Option<Version>,
}

/// Façade combining catalog resolution, command resolution and job
/// supervision into the two public invocation entry points.
pub struct CommandInvoker {
    registry: Arc<ServiceRegistry>,
}

impl CommandInvoker {
    /// Creates an invoker resolving its siblings through the registry.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Invokes a plugin-level command on an environment.
    ///
    /// Fails with `PluginNotFound` or `CommandNotFound` before any job is
    /// created; on success the returned ticket references the job
    /// tracking the asynchronous execution.
    pub fn invoke_plugin(
        &self,
        plugin_id: &str,
        command_id: &str,
        environment: &str,
        options: InvokeOptions,
    ) -> Result<JobTicket, CoreError> {
        let catalog = self.catalog()?;
        let supervisor = self.supervisor()?;

        let plugin = catalog.find(plugin_id, options.version.as_ref())?;
        let command = resolver::resolve_command(&plugin, command_id)?;

        info!(
            plugin = %plugin.name(),
            version = %plugin.version(),
            command = %command.id(),
            environment = %environment,
            "Invoking plugin command"
        );
        Ok(self.dispatch(&supervisor, &plugin, None, &command, environment, options))
    }

    /// Invokes a component-level command on an environment.
    ///
    /// Resolution walks plugin → component → command; whichever NotFound
    /// occurs first propagates, and no job is created on failure.
    pub fn invoke_component(
        &self,
        plugin_id: &str,
        component_id: &str,
        command_id: &str,
        environment: &str,
        options: InvokeOptions,
    ) -> Result<JobTicket, CoreError> {
        let catalog = self.catalog()?;
        let supervisor = self.supervisor()?;

        let plugin = catalog.find(plugin_id, options.version.as_ref())?;
        let command = resolver::resolve_component_command(&plugin, component_id, command_id)?;

        info!(
            plugin = %plugin.name(),
            version = %plugin.version(),
            component = %component_id,
            command = %command.id(),
            environment = %environment,
            "Invoking component command"
        );
        Ok(self.dispatch(
            &supervisor,
            &plugin,
            Some(component_id),
            &command,
            environment,
            options,
        ))
    }

    fn dispatch(
        &self,
        supervisor: &JobSupervisor,
        plugin: &Plugin,
        component_id: Option<&str>,
        command: &Command,
        environment: &str,
        options: InvokeOptions,
    ) -> JobTicket {
        let description = match component_id {
            Some(component) => format!(
                "{} ({}) {}: {} on {}",
                plugin.name(),
                plugin.version(),
                component,
                command.id(),
                environment
            ),
            None => format!(
                "{} ({}): {} on {}",
                plugin.name(),
                plugin.version(),
                command.id(),
                environment
            ),
        };
        supervisor.run(description, command.body(), environment, options.arguments)
    }

    fn catalog(&self) -> Result<Arc<PluginCatalog>, CoreError> {
        self.registry.lookup::<PluginCatalog>(names::PLUGIN_CATALOG)
    }

    fn supervisor(&self) -> Result<Arc<JobSupervisor>, CoreError> {
        self.registry.lookup::<JobSupervisor>(names::JOB_SUPERVISOR)
    }
}

impl std::fmt::Debug for CommandInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInvoker").finish_non_exhaustive()
    }
}
