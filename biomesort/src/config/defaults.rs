//! Default values and the `ConfigFile::default()` implementation.

use super::settings::*;
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::store::Dimension;

/// Name of the per-user configuration directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".biomesort";

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log file name inside the configuration directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "biomesort.log";

/// Snapshot the world unless told otherwise.
pub const DEFAULT_SNAPSHOT: bool = true;

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            session: SessionSettings {
                dimension: Dimension::Overworld,
                cache_capacity: DEFAULT_CACHE_CAPACITY,
                snapshot: DEFAULT_SNAPSHOT,
            },
            pipeline: PipelineSettings {
                max_lookup_failures: None,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
