//! The plugin model: versioned bundles of components and commands.
//!
//! A plugin is a named, versioned bundle of automation for a managed
//! environment. It owns plugin-level commands and components (each with
//! their own commands), declares the node groups manifests are validated
//! against, and may carry a bootstrap routine.
//!
//! Resolution walks plugin → optional component → command using string
//! identifiers; see [`resolver`]. Registered plugins live in the
//! [`PluginCatalog`], keyed by (name, version).

pub mod catalog;
mod command;
mod model;
pub mod resolver;

pub use catalog::PluginCatalog;
pub use command::{Command, CommandBody, CommandContext, CommandFailure, CommandResult};
pub use model::{Component, Plugin, PluginBuilder};
