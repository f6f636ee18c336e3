//! Control-plane wiring.
//!
//! Builds the service registry once at startup, constructs every
//! singleton service and registers it under its well-known name. The
//! embedding surface (CLI, request surface) holds the resulting
//! [`ControlPlane`] and reaches services either through the typed
//! accessors or through the registry.

use crate::bootstrap::{BootstrapDriver, Bootstrapper};
use crate::invoker::CommandInvoker;
use crate::job::{JobSupervisor, JobTable};
use crate::plugin::PluginCatalog;
use crate::provision::{ProvisionDriver, Provisioner};
use crate::registry::{names, ServiceRegistry};
use std::sync::Arc;
use tracing::info;

/// Builder for [`ControlPlane`].
///
/// Provision and bootstrap drivers are optional: when absent the
/// corresponding service is simply not registered, and lookups for it
/// fail with `ServiceUnavailable`.
#[derive(Default)]
pub struct ControlPlaneBuilder {
    provision_driver: Option<Arc<dyn ProvisionDriver>>,
    bootstrap_driver: Option<Arc<dyn BootstrapDriver>>,
}

impl ControlPlaneBuilder {
    /// Sets the driver backing the provisioner service.
    pub fn provision_driver(mut self, driver: Arc<dyn ProvisionDriver>) -> Self {
        self.provision_driver = Some(driver);
        self
    }

    /// Sets the driver backing the bootstrapper service.
    pub fn bootstrap_driver(mut self, driver: Arc<dyn BootstrapDriver>) -> Self {
        self.bootstrap_driver = Some(driver);
        self
    }

    /// Constructs and wires the control plane.
    pub fn build(self) -> ControlPlane {
        let registry = Arc::new(ServiceRegistry::new());

        let catalog = Arc::new(PluginCatalog::new());
        let table = Arc::new(JobTable::new());
        let supervisor = Arc::new(JobSupervisor::new(Arc::clone(&table)));
        let invoker = Arc::new(CommandInvoker::new(Arc::clone(&registry)));

        registry.register(names::PLUGIN_CATALOG, Arc::clone(&catalog));
        registry.register(names::JOB_TABLE, Arc::clone(&table));
        registry.register(names::JOB_SUPERVISOR, Arc::clone(&supervisor));
        registry.register(names::COMMAND_INVOKER, Arc::clone(&invoker));

        if let Some(driver) = self.provision_driver {
            let provisioner = Arc::new(Provisioner::new(Arc::clone(&registry), driver));
            registry.register(names::PROVISIONER, provisioner);
        }
        if let Some(driver) = self.bootstrap_driver {
            let bootstrapper = Arc::new(Bootstrapper::new(Arc::clone(&registry), driver));
            registry.register(names::BOOTSTRAPPER, bootstrapper);
        }

        info!("Control plane ready");
        ControlPlane {
            registry,
            catalog,
            table,
            supervisor,
            invoker,
        }
    }
}

/// The wired control plane and its singleton services.
pub struct ControlPlane {
    registry: Arc<ServiceRegistry>,
    catalog: Arc<PluginCatalog>,
    table: Arc<JobTable>,
    supervisor: Arc<JobSupervisor>,
    invoker: Arc<CommandInvoker>,
}

impl ControlPlane {
    /// Starts building a control plane.
    pub fn builder() -> ControlPlaneBuilder {
        ControlPlaneBuilder::default()
    }

    /// The service registry holding every singleton.
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// The plugin catalog.
    pub fn catalog(&self) -> &Arc<PluginCatalog> {
        &self.catalog
    }

    /// The job table.
    pub fn job_table(&self) -> &Arc<JobTable> {
        &self.table
    }

    /// The job supervisor.
    pub fn supervisor(&self) -> &Arc<JobSupervisor> {
        &self.supervisor
    }

    /// The command invoker.
    pub fn invoker(&self) -> &Arc<CommandInvoker> {
        &self.invoker
    }

    /// Shuts the control plane down, cancelling every active job.
    pub fn shutdown(&self) {
        info!("Control plane shutting down");
        self.supervisor.shutdown();
    }
}

impl std::fmt::Debug for ControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlane")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registers_core_services() {
        let plane = ControlPlane::builder().build();
        let registry = plane.registry();

        assert!(registry.contains(names::PLUGIN_CATALOG));
        assert!(registry.contains(names::JOB_TABLE));
        assert!(registry.contains(names::JOB_SUPERVISOR));
        assert!(registry.contains(names::COMMAND_INVOKER));
        assert!(!registry.contains(names::PROVISIONER));
        assert!(!registry.contains(names::BOOTSTRAPPER));
    }

    #[test]
    fn test_services_resolve_through_registry() {
        let plane = ControlPlane::builder().build();

        assert!(plane
            .registry()
            .lookup::<PluginCatalog>(names::PLUGIN_CATALOG)
            .is_ok());
        assert!(plane
            .registry()
            .lookup::<JobSupervisor>(names::JOB_SUPERVISOR)
            .is_ok());
    }
}
