//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::StrataConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Per-user configuration file (`<config dir>/strata/config.toml`), if the
    /// platform has a config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        super::sources::global_file::path()
    }

    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<StrataConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<StrataConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> StrataConfig {
        StrataConfig::default()
    }
}
