//! Process-wide lookup of long-lived singleton services.
//!
//! The registry is constructed once at startup and passed by reference
//! to every component that needs a sibling - no hard-wired construction
//! order. Lookups never block: a missing, dead or wrongly-typed entry
//! fails fast with `ServiceUnavailable`.

use crate::error::CoreError;
use dashmap::DashMap;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Well-known service names.
pub mod names {
    pub const PLUGIN_CATALOG: &str = "plugin_catalog";
    pub const JOB_TABLE: &str = "job_table";
    pub const JOB_SUPERVISOR: &str = "job_supervisor";
    pub const COMMAND_INVOKER: &str = "command_invoker";
    pub const PROVISIONER: &str = "provisioner";
    pub const BOOTSTRAPPER: &str = "bootstrapper";
}

struct ServiceEntry {
    handle: Arc<dyn Any + Send + Sync>,
    live: Arc<AtomicBool>,
}

/// Liveness handle returned from registration.
///
/// The owning service holds this and marks itself dead when it can no
/// longer serve requests; subsequent lookups then fail fast instead of
/// handing out a broken handle.
#[derive(Clone)]
pub struct ServiceHealth {
    name: String,
    live: Arc<AtomicBool>,
}

impl ServiceHealth {
    /// Marks the service as dead; lookups fail from now on.
    pub fn mark_dead(&self) {
        self.live.store(false, Ordering::Release);
        warn!(service = %self.name, "Service marked dead");
    }

    /// Returns true while the service is live.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Process-wide registry of singleton services by name.
#[derive(Default)]
pub struct ServiceRegistry {
    services: DashMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service handle under the given name, replacing any
    /// previous registration. Returns the liveness handle for the owner.
    pub fn register<S>(&self, name: &str, handle: Arc<S>) -> ServiceHealth
    where
        S: Send + Sync + 'static,
    {
        let live = Arc::new(AtomicBool::new(true));
        self.services.insert(
            name.to_string(),
            ServiceEntry {
                handle,
                live: Arc::clone(&live),
            },
        );
        info!(service = %name, "Service registered");
        ServiceHealth {
            name: name.to_string(),
            live,
        }
    }

    /// Looks up a live service handle by name.
    ///
    /// Fails with `ServiceUnavailable` when the name is unregistered,
    /// the service has been marked dead, or the registered handle is not
    /// of the requested type. Never blocks waiting for registration.
    pub fn lookup<S>(&self, name: &str) -> Result<Arc<S>, CoreError>
    where
        S: Send + Sync + 'static,
    {
        let unavailable = || CoreError::ServiceUnavailable {
            service_name: name.to_string(),
        };

        let entry = self.services.get(name).ok_or_else(unavailable)?;
        if !entry.live.load(Ordering::Acquire) {
            return Err(unavailable());
        }
        Arc::clone(&entry.handle)
            .downcast::<S>()
            .map_err(|_| unavailable())
    }

    /// Returns true when a live service is registered under the name.
    pub fn contains(&self, name: &str) -> bool {
        self.services
            .get(name)
            .map(|entry| entry.live.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Removes a registration.
    pub fn deregister(&self, name: &str) {
        if self.services.remove(name).is_some() {
            info!(service = %name, "Service deregistered");
        }
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo {
        greeting: String,
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ServiceRegistry::new();
        registry.register(
            "echo",
            Arc::new(Echo {
                greeting: "hello".to_string(),
            }),
        );

        let echo = registry.lookup::<Echo>("echo").unwrap();
        assert_eq!(echo.greeting, "hello");
    }

    #[test]
    fn test_lookup_unregistered_fails_fast() {
        let registry = ServiceRegistry::new();
        let err = registry.lookup::<Echo>("echo").unwrap_err();
        assert_eq!(
            err,
            CoreError::ServiceUnavailable {
                service_name: "echo".to_string()
            }
        );
    }

    #[test]
    fn test_lookup_dead_service_fails() {
        let registry = ServiceRegistry::new();
        let health = registry.register(
            "echo",
            Arc::new(Echo {
                greeting: "hello".to_string(),
            }),
        );

        assert!(health.is_live());
        health.mark_dead();
        assert!(!health.is_live());
        assert!(registry.lookup::<Echo>("echo").is_err());
        assert!(!registry.contains("echo"));
    }

    #[test]
    fn test_lookup_wrong_type_fails() {
        let registry = ServiceRegistry::new();
        registry.register(
            "echo",
            Arc::new(Echo {
                greeting: "hello".to_string(),
            }),
        );

        assert!(registry.lookup::<String>("echo").is_err());
    }

    #[test]
    fn test_reregister_replaces_handle() {
        let registry = ServiceRegistry::new();
        let first = registry.register(
            "echo",
            Arc::new(Echo {
                greeting: "first".to_string(),
            }),
        );
        first.mark_dead();

        registry.register(
            "echo",
            Arc::new(Echo {
                greeting: "second".to_string(),
            }),
        );
        let echo = registry.lookup::<Echo>("echo").unwrap();
        assert_eq!(echo.greeting, "second");
    }

    #[test]
    fn test_deregister() {
        let registry = ServiceRegistry::new();
        registry.register("echo", Arc::new(Echo { greeting: String::new() }));
        registry.deregister("echo");
        assert!(registry.lookup::<Echo>("echo").is_err());
    }
}
