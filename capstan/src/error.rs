//! Error taxonomy for the orchestration core.
//!
//! Every named kind is an expected, typed failure raised synchronously from
//! resolution or validation, before any job exists — callers can correct
//! input and retry without side effects. Failures that happen after a job
//! has been created are recorded on the job itself, not raised here.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the resolution, validation and lookup paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// No plugin matches the requested name/version constraint.
    #[error("plugin '{name}' not found{}", format_constraint(.version_constraint))]
    PluginNotFound {
        name: String,
        version_constraint: Option<semver::Version>,
    },

    /// The plugin has no component with the given id.
    #[error("component '{id}' not found in plugin '{plugin_name}'")]
    ComponentNotFound { id: String, plugin_name: String },

    /// Neither the plugin nor the resolved component has a command with the given id.
    #[error("command '{id}' not found in plugin '{plugin_name}'")]
    CommandNotFound { id: String, plugin_name: String },

    /// No job with the given id exists in the job table.
    #[error("job '{job_id}' not found")]
    JobNotFound { job_id: String },

    /// Bootstrap was requested against a plugin that declares no bootstrap routine.
    #[error("plugin '{plugin_name}' has no bootstrap routine")]
    NoBootstrapRoutine { plugin_name: String },

    /// Provision manifest does not match the plugin's declared node groups.
    #[error("invalid provision manifest: missing groups {missing_groups:?}, unexpected groups {unexpected_groups:?}")]
    InvalidProvisionManifest {
        missing_groups: Vec<String>,
        unexpected_groups: Vec<String>,
    },

    /// Bootstrap manifest does not match the plugin's declared node groups.
    #[error("invalid bootstrap manifest: missing groups {missing_groups:?}, unexpected groups {unexpected_groups:?}")]
    InvalidBootstrapManifest {
        missing_groups: Vec<String>,
        unexpected_groups: Vec<String>,
    },

    /// A required singleton service is not registered, or has died.
    #[error("service '{service_name}' is not available")]
    ServiceUnavailable { service_name: String },

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {key} - {reason}")]
    ConfigError { key: String, reason: String },

    /// Anything unanticipated. Detail is logged, never carried to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_constraint(constraint: &Option<semver::Version>) -> String {
    match constraint {
        Some(version) => format!(" at version {}", version),
        None => String::new(),
    }
}

/// Wire-level error shape handed to the request surface.
///
/// `code` is a stable token the surface can branch on; `param` names the
/// offending identifier where one exists.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl CoreError {
    /// Stable code token for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PluginNotFound { .. } => "plugin_not_found",
            Self::ComponentNotFound { .. } => "component_not_found",
            Self::CommandNotFound { .. } => "command_not_found",
            Self::JobNotFound { .. } => "job_not_found",
            Self::NoBootstrapRoutine { .. } => "no_bootstrap_routine",
            Self::InvalidProvisionManifest { .. } => "invalid_provision_manifest",
            Self::InvalidBootstrapManifest { .. } => "invalid_bootstrap_manifest",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::ConfigError { .. } => "config_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Converts this error into the boundary envelope.
    ///
    /// Internal errors are flattened to an opaque message; the full detail
    /// is expected to have been logged where the error was produced.
    pub fn envelope(&self) -> ErrorEnvelope {
        let param = match self {
            Self::PluginNotFound { name, .. } => Some(name.clone()),
            Self::ComponentNotFound { id, .. } | Self::CommandNotFound { id, .. } => {
                Some(id.clone())
            }
            Self::JobNotFound { job_id } => Some(job_id.clone()),
            Self::NoBootstrapRoutine { plugin_name } => Some(plugin_name.clone()),
            Self::ServiceUnavailable { service_name } => Some(service_name.clone()),
            Self::ConfigError { key, .. } => Some(key.clone()),
            _ => None,
        };

        let message = match self {
            Self::Internal(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        };

        ErrorEnvelope {
            code: self.code(),
            message,
            param,
        }
    }
}
