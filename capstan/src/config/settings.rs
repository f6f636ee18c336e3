//! Settings structs for the configuration file.
//!
//! Pure data types with defaults; loading and parsing live in
//! [`super::file`].

use std::path::PathBuf;

/// Default log directory, relative to the working directory.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "capstan.log";

/// Default log level when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete application configuration loaded from capstan.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Logging configuration (`[logging]` section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub directory: PathBuf,
    /// Log file name.
    pub file: String,
    /// Fallback log level when `RUST_LOG` is unset: one of
    /// trace, debug, info, warn, error.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.logging.directory, PathBuf::from("logs"));
        assert_eq!(settings.logging.file, "capstan.log");
        assert_eq!(settings.logging.level, "info");
    }
}
