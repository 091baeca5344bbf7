//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let max_lookup_failures = config
        .pipeline
        .max_lookup_failures
        .map(|n| n.to_string())
        .unwrap_or_default();

    format!(
        r#"[session]
; Dimension to read biomes from: overworld, nether or end
dimension = {}
; Number of chunk biome grids kept in memory (0 disables caching)
cache_capacity = {}
; Copy the world to a temporary directory before reading it (true/false)
snapshot = {}

[pipeline]
; Abort a run after this many failed lookups (leave empty for no limit)
max_lookup_failures = {}

[logging]
; Log file path (default: ~/.biomesort/biomesort.log)
file = {}
"#,
        config.session.dimension.name(),
        config.session.cache_capacity,
        config.session.snapshot,
        max_lookup_failures,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing the home directory to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
