//! Configuration file loading for ~/.capstan/capstan.ini.

use super::settings::{LoggingSettings, Settings};
use crate::error::CoreError;
use ini::Ini;
use std::path::{Path, PathBuf};

/// Accepted log level tokens.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Settings {
    /// Loads configuration from the default path (~/.capstan/capstan.ini).
    ///
    /// A missing file yields defaults.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&config_file_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields defaults; malformed content fails with
    /// `ConfigError` naming the offending key.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| CoreError::ConfigError {
            key: path.display().to_string(),
            reason: e.to_string(),
        })?;
        parse_ini(&ini)
    }
}

/// Parses an already-loaded INI document into settings.
fn parse_ini(ini: &Ini) -> Result<Settings, CoreError> {
    let mut logging = LoggingSettings::default();

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(directory) = section.get("directory") {
            logging.directory = PathBuf::from(directory);
        }
        if let Some(file) = section.get("file") {
            logging.file = file.to_string();
        }
        if let Some(level) = section.get("level") {
            if !LOG_LEVELS.contains(&level) {
                return Err(CoreError::ConfigError {
                    key: "logging.level".to_string(),
                    reason: format!(
                        "'{}' is not one of {}",
                        level,
                        LOG_LEVELS.join(", ")
                    ),
                });
            }
            logging.level = level.to_string();
        }
    }

    Ok(Settings { logging })
}

/// Path to the config directory (~/.capstan).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".capstan")
}

/// Path to the config file (~/.capstan/capstan.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("capstan.ini")
}
