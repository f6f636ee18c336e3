//! The provisioner - creates environments as tracked jobs.
//!
//! The provisioner validates the request at the boundary and then hands
//! the long-running infrastructure work to a [`ProvisionDriver`] running
//! under the job supervisor contract. The driver is the seam to the
//! managed infrastructure's configuration-management API; the core only
//! owns the bookkeeping around it.

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

/// Options accepted by provision requests.
#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    /// Provision even when the environment is locked.
    pub force: bool,

    /// Skip the automatic bootstrap of the created environment.
    pub skip_bootstrap: bool,

    /// Additional attributes to set on the environment.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// The seam to the infrastructure layer that actually creates nodes.
pub trait ProvisionDriver: Send + Sync + 'static {
    /// Provisions the environment named in the context according to the
    /// manifest. Runs inside a job worker; implementations should check
    /// `ctx.is_cancelled()` at safe points.
    fn provision<'a>(
        &'a self,
        ctx: &'a mut CommandContext,
        manifest: &'a Manifest,
        plugin: &'a Plugin,
        options: &'a ProvisionOptions,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;
}

/// Command body adapting a provision request to the job worker contract.
struct ProvisionBody {
    driver: Arc<dyn ProvisionDriver>,
    manifest: Manifest,
    plugin: Arc<Plugin>,
    options: ProvisionOptions,
}

impl CommandBody for ProvisionBody {
    fn execute<'a>(
        &'a self,
        ctx: &'a mut CommandContext,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
        self.driver
            .provision(ctx, &self.manifest, &self.plugin, &self.options)
    }
}

/// Singleton service creating provisioned environments.
pub struct Provisioner {
    registry: Arc<ServiceRegistry>,
    driver: Arc<dyn ProvisionDriver>,
}

impl Provisioner {
    /// Creates a provisioner delegating infrastructure work to the driver.
    pub fn new(registry: Arc<ServiceRegistry>, driver: Arc<dyn ProvisionDriver>) -> Self {
        Self { registry, driver }
    }

    /// Provisions a new cluster of nodes for the environment.
    ///
    /// The manifest is validated against the plugin's declared node
    /// groups before any job is created; a mismatch fails with
    /// `InvalidProvisionManifest` and has no side effects.
    pub fn provision(
        &self,
        environment: &str,
        manifest: Manifest,
        plugin: Arc<Plugin>,
        options: ProvisionOptions,
    ) -> Result<JobTicket, CoreError> {
        manifest.validate_provision(&plugin)?;
        let supervisor = self
            .registry
            .lookup::<JobSupervisor>(names::JOB_SUPERVISOR)?;

        info!(
            environment = %environment,
            plugin = %plugin.name(),
            version = %plugin.version(),
            force = options.force,
            "Provision requested"
        );

        let description = format!(
            "provision {} with {} ({})",
            environment,
            plugin.name(),
            plugin.version()
        );
        let body = Arc::new(ProvisionBody {
            driver: Arc::clone(&self.driver),
            manifest,
            plugin,
            options,
        });
        Ok(supervisor.run(description, body, environment, Vec::new()))
    }
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobState, JobTable};
    use semver::Version;

    struct RecordingDriver;

    impl ProvisionDriver for RecordingDriver {
        fn provision<'a>(
            &'a self,
            ctx: &'a mut CommandContext,
            manifest: &'a Manifest,
            _plugin: &'a Plugin,
            _options: &'a ProvisionOptions,
        ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
            Box::pin(async move {
                CommandResult::Success(serde_json::json!({
                    "environment": ctx.environment(),
                    "groups": manifest.groups().len(),
                }))
            })
        }
    }

    fn wired() -> (Arc<ServiceRegistry>, Arc<JobTable>, Provisioner) {
        let registry = Arc::new(ServiceRegistry::new());
        let table = Arc::new(JobTable::new());
        let supervisor = Arc::new(JobSupervisor::new(Arc::clone(&table)));
        registry.register(names::JOB_SUPERVISOR, supervisor);

        let provisioner = Provisioner::new(Arc::clone(&registry), Arc::new(RecordingDriver));
        (registry, table, provisioner)
    }

    fn plugin() -> Arc<Plugin> {
        Arc::new(
            Plugin::builder("rabbitmq", Version::new(1, 0, 0))
                .node_group("broker_node")
                .build(),
        )
    }

    fn manifest() -> Manifest {
        let mut manifest = Manifest::new();
        manifest.insert_group("broker_node", vec!["node1.example.com".to_string()]);
        manifest
    }

    #[tokio::test]
    async fn test_provision_runs_driver_as_job() {
        let (_registry, table, provisioner) = wired();

        let ticket = provisioner
            .provision("mycluster", manifest(), plugin(), ProvisionOptions::default())
            .unwrap();

        let mut rx = table.watch(&ticket.job_id).unwrap();
        while !rx.borrow().is_terminal() {
            rx.changed().await.unwrap();
        }

        let record = table.find(&ticket.job_id).unwrap();
        assert_eq!(record.state, JobState::Success);
        assert_eq!(record.result.unwrap()["environment"], "mycluster");
    }

    #[tokio::test]
    async fn test_invalid_manifest_creates_no_job() {
        let (_registry, table, provisioner) = wired();

        let err = provisioner
            .provision(
                "mycluster",
                Manifest::new(),
                plugin(),
                ProvisionOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidProvisionManifest { .. }));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_missing_supervisor_fails() {
        let registry = Arc::new(ServiceRegistry::new());
        let provisioner = Provisioner::new(registry, Arc::new(RecordingDriver));

        let err = provisioner
            .provision("mycluster", manifest(), plugin(), ProvisionOptions::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::ServiceUnavailable { .. }));
    }
}
