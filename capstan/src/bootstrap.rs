//! The bootstrapper - applies a plugin's bootstrap routine to an
//! existing environment as a tracked job.
//!
//! Mirrors the provisioner's shape: boundary validation first, then a
//! job running the [`BootstrapDriver`]. Requesting bootstrap against a
//! plugin with no declared routine is a precondition failure, not a job
//! failure - no job is ever created for it.

use crate::error::CoreError;
use crate::job::{JobSupervisor, JobTicket};
use crate::manifest::Manifest;
use crate::plugin::{CommandBody, CommandContext, CommandResult, Plugin};
use crate::registry::{names, ServiceRegistry};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

/// Options accepted by bootstrap requests.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Bootstrap even when the environment is locked.
    pub force: bool,

    /// Additional attributes to set on the environment.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// The seam to the infrastructure layer that configures existing nodes.
pub trait BootstrapDriver: Send + Sync + 'static {
    /// Runs the plugin's bootstrap routine against the environment named
    /// in the context. Runs inside a job worker; implementations should
    /// check `ctx.is_cancelled()` at safe points.
    fn bootstrap<'a>(
        &'a self,
        ctx: &'a mut CommandContext,
        manifest: &'a Manifest,
        plugin: &'a Plugin,
        options: &'a BootstrapOptions,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;
}

/// Command body adapting a bootstrap request to the job worker contract.
struct BootstrapBody {
    driver: Arc<dyn BootstrapDriver>,
    manifest: Manifest,
    plugin: Arc<Plugin>,
    options: BootstrapOptions,
}

impl CommandBody for BootstrapBody {
    fn execute<'a>(
        &'a self,
        ctx: &'a mut CommandContext,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
        self.driver
            .bootstrap(ctx, &self.manifest, &self.plugin, &self.options)
    }
}

/// Singleton service bootstrapping existing environments.
pub struct Bootstrapper {
    registry: Arc<ServiceRegistry>,
    driver: Arc<dyn BootstrapDriver>,
}

impl Bootstrapper {
    /// Creates a bootstrapper delegating infrastructure work to the driver.
    pub fn new(registry: Arc<ServiceRegistry>, driver: Arc<dyn BootstrapDriver>) -> Self {
        Self { registry, driver }
    }

    /// Bootstraps an existing cluster of nodes in the environment.
    ///
    /// Fails with `NoBootstrapRoutine` when the plugin declares none, and
    /// with `InvalidBootstrapManifest` on a group mismatch - both before
    /// any job is created.
    pub fn bootstrap(
        &self,
        environment: &str,
        manifest: Manifest,
        plugin: Arc<Plugin>,
        options: BootstrapOptions,
    ) -> Result<JobTicket, CoreError> {
        if !plugin.has_bootstrap_routine() {
            return Err(CoreError::NoBootstrapRoutine {
                plugin_name: plugin.name().to_string(),
            });
        }
        manifest.validate_bootstrap(&plugin)?;
        let supervisor = self
            .registry
            .lookup::<JobSupervisor>(names::JOB_SUPERVISOR)?;

        info!(
            environment = %environment,
            plugin = %plugin.name(),
            version = %plugin.version(),
            force = options.force,
            "Bootstrap requested"
        );

        let description = format!(
            "bootstrap {} with {} ({})",
            environment,
            plugin.name(),
            plugin.version()
        );
        let body = Arc::new(BootstrapBody {
            driver: Arc::clone(&self.driver),
            manifest,
            plugin,
            options,
        });
        Ok(supervisor.run(description, body, environment, Vec::new()))
    }
}

impl std::fmt::Debug for Bootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrapper").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobState, JobTable};
    use semver::Version;

    struct RecordingDriver;

    impl BootstrapDriver for RecordingDriver {
        fn bootstrap<'a>(
            &'a self,
            ctx: &'a mut CommandContext,
            _manifest: &'a Manifest,
            plugin: &'a Plugin,
            _options: &'a BootstrapOptions,
        ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
            Box::pin(async move {
                CommandResult::Success(serde_json::json!({
                    "environment": ctx.environment(),
                    "plugin": plugin.name(),
                }))
            })
        }
    }

    fn wired() -> (Arc<JobTable>, Bootstrapper) {
        let registry = Arc::new(ServiceRegistry::new());
        let table = Arc::new(JobTable::new());
        let supervisor = Arc::new(JobSupervisor::new(Arc::clone(&table)));
        registry.register(names::JOB_SUPERVISOR, supervisor);

        let bootstrapper = Bootstrapper::new(registry, Arc::new(RecordingDriver));
        (table, bootstrapper)
    }

    fn plugin_with_routine() -> Arc<Plugin> {
        Arc::new(
            Plugin::builder("rabbitmq", Version::new(1, 0, 0))
                .node_group("broker_node")
                .bootstrap_routine()
                .build(),
        )
    }

    fn manifest() -> Manifest {
        let mut manifest = Manifest::new();
        manifest.insert_group("broker_node", vec!["node1.example.com".to_string()]);
        manifest
    }

    #[tokio::test]
    async fn test_bootstrap_runs_driver_as_job() {
        let (table, bootstrapper) = wired();

        let ticket = bootstrapper
            .bootstrap(
                "mycluster",
                manifest(),
                plugin_with_routine(),
                BootstrapOptions::default(),
            )
            .unwrap();

        let mut rx = table.watch(&ticket.job_id).unwrap();
        while !rx.borrow().is_terminal() {
            rx.changed().await.unwrap();
        }
        assert_eq!(table.find(&ticket.job_id).unwrap().state, JobState::Success);
    }

    #[tokio::test]
    async fn test_no_bootstrap_routine_creates_no_job() {
        let (table, bootstrapper) = wired();
        let plugin = Arc::new(
            Plugin::builder("nginx", Version::new(1, 0, 0))
                .node_group("web_node")
                .build(),
        );

        let err = bootstrapper
            .bootstrap("mycluster", Manifest::new(), plugin, BootstrapOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::NoBootstrapRoutine {
                plugin_name: "nginx".to_string()
            }
        );
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_manifest_creates_no_job() {
        let (table, bootstrapper) = wired();

        let err = bootstrapper
            .bootstrap(
                "mycluster",
                Manifest::new(),
                plugin_with_routine(),
                BootstrapOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidBootstrapManifest { .. }));
        assert!(table.is_empty());
    }
}
