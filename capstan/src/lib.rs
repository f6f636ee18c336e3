//! Capstan - cluster-automation control plane.
//!
//! Capstan resolves versioned automation plugins composed of components
//! and commands, invokes commands against a named target environment,
//! and tracks each invocation as an asynchronous job whose lifecycle
//! callers can poll.
//!
//! # High-Level API
//!
//! The [`control`] module wires the singleton services together:
//!
//! ```ignore
//! use capstan::control::ControlPlane;
//! use capstan::invoker::InvokeOptions;
//!
//! let plane = ControlPlane::builder().build();
//! plane.catalog().register(my_plugin);
//!
//! let ticket = plane.invoker().invoke_plugin(
//!     "rabbitmq", "restart", "mycluster", InvokeOptions::default(),
//! )?;
//!
//! // Poll the job table for progress.
//! let record = plane.job_table().find(&ticket.job_id)?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod control;
pub mod error;
pub mod invoker;
pub mod job;
pub mod logging;
pub mod manifest;
pub mod plugin;
pub mod provision;
pub mod registry;

/// Version of the capstan library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
