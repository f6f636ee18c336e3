//! The `run` command - start the control plane and serve until shutdown.

use crate::error::CliError;
use capstan::config::Settings;
use capstan::control::ControlPlane;
use capstan::logging;
use std::path::PathBuf;
use tracing::info;

/// Executes `capstan run`.
///
/// Loads settings, initializes logging, wires the control plane and
/// parks until ctrl-c. The request surface attaches to the running
/// control plane; shutting down cancels every active job cooperatively.
pub fn execute(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let _guard = logging::init_logging(&settings.logging).map_err(CliError::Logging)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        let plane = ControlPlane::builder().build();
        info!(version = capstan::VERSION, "Capstan control plane running");

        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(error) => tracing::error!(%error, "Failed to listen for shutdown signal"),
        }
        plane.shutdown();
    });

    Ok(())
}

/// Loads settings from the given path, or the default location.
pub(crate) fn load_settings(config_path: Option<PathBuf>) -> Result<Settings, CliError> {
    let settings = match config_path {
        Some(path) => Settings::load_from(&path),
        None => Settings::load(),
    };
    settings.map_err(CliError::Config)
}
