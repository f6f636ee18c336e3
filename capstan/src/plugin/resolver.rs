//! Command resolution over an already-resolved plugin.
//!
//! Pure functions: resolution failures are tagged results, not control
//! flow. The component resolves before its command, so a miss at either
//! level surfaces as the corresponding NotFound.

use super::command::Command;
use super::model::{Component, Plugin};
use crate::error::CoreError;
use std::sync::Arc;

/// Resolves a plugin-level command by id.
pub fn resolve_command(plugin: &Plugin, command_id: &str) -> Result<Arc<Command>, CoreError> {
    plugin
        .command(command_id)
        .ok_or_else(|| CoreError::CommandNotFound {
            id: command_id.to_string(),
            plugin_name: plugin.name().to_string(),
        })
}

/// Resolves a component by id.
pub fn resolve_component<'p>(
    plugin: &'p Plugin,
    component_id: &str,
) -> Result<&'p Component, CoreError> {
    plugin
        .component(component_id)
        .ok_or_else(|| CoreError::ComponentNotFound {
            id: component_id.to_string(),
            plugin_name: plugin.name().to_string(),
        })
}

/// Resolves a command owned by a component of the plugin.
pub fn resolve_component_command(
    plugin: &Plugin,
    component_id: &str,
    command_id: &str,
) -> Result<Arc<Command>, CoreError> {
    let component = resolve_component(plugin, component_id)?;
    component
        .command(command_id)
        .ok_or_else(|| CoreError::CommandNotFound {
            id: command_id.to_string(),
            plugin_name: plugin.name().to_string(),
        })
}
