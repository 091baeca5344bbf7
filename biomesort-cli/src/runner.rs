//! CLI runner for common setup.
//!
//! Encapsulates config loading and logging initialization so `main` only
//! deals with arguments and output.

use crate::error::CliError;
use biomesort::config::ConfigFile;
use biomesort::logging::{init_logging, split_log_path, LoggingGuard};
use std::path::Path;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load configuration and initialize logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to read instead of ~/.biomesort/config.ini
    /// * `debug_mode` - When true, defaults to debug-level logging if RUST_LOG is unset
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let (log_dir, log_file) = split_log_path(&config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;
        let logging_guard = init_logging(&log_dir, &log_file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information.
    pub fn log_startup(&self) {
        info!("biomesort v{}", biomesort::VERSION);
        info!(log_file = %self.config.logging.file.display(), "Logging to file");
    }
}
