//! User configuration.
//!
//! Settings are read from an INI file, `~/.biomesort/config.ini` by default:
//!
//! ```ini
//! [session]
//! dimension = overworld
//! cache_capacity = 256
//! snapshot = true
//!
//! [pipeline]
//! max_lookup_failures =
//!
//! [logging]
//! file = ~/.biomesort/biomesort.log
//! ```
//!
//! A missing file yields defaults; a present file only needs the keys it
//! wants to change.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_FILE_NAME, DEFAULT_SNAPSHOT};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use parser::expand_tilde;
pub use settings::{ConfigFile, LoggingSettings, PipelineSettings, SessionSettings};
