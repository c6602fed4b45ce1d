//! Per-user configuration file under the platform config directory.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::PathBuf;

pub fn path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "strata", "strata")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global file at `path`, if any. Missing files are skipped.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<PathBuf>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(match path {
        Some(path) => builder.add_source(File::from(path).required(false)),
        None => builder,
    })
}
