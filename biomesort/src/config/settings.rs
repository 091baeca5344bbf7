//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::session::SessionConfig;
use crate::store::Dimension;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// World session settings
    pub session: SessionSettings,
    /// Pipeline settings
    pub pipeline: PipelineSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// World session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Dimension to read classifications from
    pub dimension: Dimension,
    /// Number of cell grids kept in memory (0 disables caching)
    pub cache_capacity: usize,
    /// Work on a private copy of the world
    pub snapshot: bool,
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Abort a run after this many failed lookups (`None` = never)
    pub max_lookup_failures: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl SessionSettings {
    /// Session settings as a [`SessionConfig`].
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_dimension(self.dimension)
            .with_cache_capacity(self.cache_capacity)
            .with_snapshot(self.snapshot)
    }
}
