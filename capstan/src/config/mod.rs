//! Configuration for the control plane.
//!
//! Settings structs are pure data; file loading and INI parsing live in
//! [`file`]. A missing config file yields defaults, so a bare
//! installation runs without any setup.

mod file;
mod settings;

pub use file::{config_directory, config_file_path};
pub use settings::{
    LoggingSettings, Settings, DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL,
};
