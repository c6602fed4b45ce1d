//! Strata: mount table and change observation for hierarchical namespaces
//!
//! Providers announce themselves for a mount path. The [`MountRegistry`]
//! keeps the highest-ranked provider that activates successfully as the
//! active one per path, fails over when it leaves, and tells every active
//! provider which nested paths are mounted by someone else. Providers that
//! watch an upstream event repository use a [`ChangeNormalizer`] to turn raw
//! node and property events into one consolidated change per path.

pub mod config;
pub mod error;
pub mod logging;
pub mod observation;
pub mod path;
pub mod provider;
pub mod registry;
pub mod types;

pub use self::config::{ConfigLoader, ObservationSettings, StrataConfig};
pub use error::{ApiError, DescriptorError, ObservationError, ProviderError};
pub use observation::{
    ChangeKind, ChangeNormalizer, ChangeRecord, ObservationReporter, ObserverConfiguration,
};
pub use provider::{ProviderContext, ProviderDescriptor, ProviderInfo, ResourceProvider};
pub use registry::{MountRegistry, ProviderEvent, ProviderRegistration, ProviderTracker, RuntimeSnapshot};
pub use types::{ProviderId, Ranking};

use std::path::Path;

/// Load configuration for `workspace_root` and install the global subscriber.
pub fn init(workspace_root: &Path) -> Result<StrataConfig, ApiError> {
    let config = ConfigLoader::load(workspace_root)?;
    logging::init_logging(Some(&config.logging))?;
    tracing::info!(workspace = %workspace_root.display(), "Strata initialized");
    Ok(config)
}
