//! MergeService: orchestrates sources, applies merge policy, deserializes to StrataConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::StrataConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from workspace and standard sources.
    /// Precedence: defaults (lowest) -> global file -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<StrataConfig, ConfigError> {
        Self::load_with_global(workspace_root, global_file::path())
    }

    /// Same as [`MergeService::load`] with an explicit global file location.
    pub fn load_with_global(
        workspace_root: &Path,
        global: Option<PathBuf>,
    ) -> Result<StrataConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<StrataConfig, ConfigError> {
        debug!(path = %path.display(), "Loading configuration file");
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
