//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [session] section
    if let Some(section) = ini.section(Some("session")) {
        if let Some(v) = section.get("dimension") {
            config.session.dimension = v.trim().parse().map_err(|_| {
                invalid(
                    "session",
                    "dimension",
                    v,
                    "must be one of: overworld, nether, end",
                )
            })?;
        }
        if let Some(v) = section.get("cache_capacity") {
            config.session.cache_capacity = v.trim().parse().map_err(|_| {
                invalid(
                    "session",
                    "cache_capacity",
                    v,
                    "must be a non-negative integer (0 disables caching)",
                )
            })?;
        }
        if let Some(v) = section.get("snapshot") {
            config.session.snapshot = parse_bool(v)
                .ok_or_else(|| invalid("session", "snapshot", v, "must be true or false"))?;
        }
    }

    // [pipeline] section
    if let Some(section) = ini.section(Some("pipeline")) {
        if let Some(v) = section.get("max_lookup_failures") {
            let v = v.trim();
            config.pipeline.max_lookup_failures = if v.is_empty() {
                None
            } else {
                Some(v.parse().map_err(|_| {
                    invalid(
                        "pipeline",
                        "max_lookup_failures",
                        v,
                        "must be a non-negative integer, or empty for no limit",
                    )
                })?)
            };
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parse a boolean setting, returning `None` for unrecognized values.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ to home directory in paths.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
