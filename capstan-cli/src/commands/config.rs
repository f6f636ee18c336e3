//! The `config` command - show the effective configuration.

use crate::commands::run::load_settings;
use crate::error::CliError;
use capstan::config::config_file_path;
use std::path::PathBuf;

/// Executes `capstan config`.
pub fn execute(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let source = config_path
        .clone()
        .unwrap_or_else(config_file_path);
    let settings = load_settings(config_path)?;

    println!("# configuration from {}", source.display());
    println!("[logging]");
    println!("directory = {}", settings.logging.directory.display());
    println!("file = {}", settings.logging.file);
    println!("level = {}", settings.logging.level);
    Ok(())
}
