//! Resource providers as seen by the mount registry.

mod handle;
mod info;
mod observing;

pub use handle::{ActivationState, ProviderHandle};
pub use info::{AuthType, ProviderDescriptor, ProviderInfo};
pub use observing::ObservingProvider;

use crate::error::ProviderError;
use crate::observation::ObservationReporter;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

/// Everything a provider receives from the registry when it becomes active.
#[derive(Clone)]
pub struct ProviderContext {
    reporter: Arc<dyn ObservationReporter>,
    excluded_paths: BTreeSet<String>,
}

impl ProviderContext {
    pub fn new(reporter: Arc<dyn ObservationReporter>, excluded_paths: BTreeSet<String>) -> Self {
        Self {
            reporter,
            excluded_paths,
        }
    }

    pub fn reporter(&self) -> &Arc<dyn ObservationReporter> {
        &self.reporter
    }

    /// Separately mounted paths below this provider's mount path.
    pub fn excluded_paths(&self) -> &BTreeSet<String> {
        &self.excluded_paths
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("excluded_paths", &self.excluded_paths)
            .finish_non_exhaustive()
    }
}

/// A live provider instance serving a mount path.
pub trait ResourceProvider: Send + Sync {
    /// Called when the provider becomes the active one for its mount path.
    fn activate(&self, context: &ProviderContext) -> Result<(), ProviderError>;

    /// Called when the provider is shadowed or withdrawn.
    fn deactivate(&self, context: &ProviderContext);

    /// Observer configuration or nested mounts changed while active.
    ///
    /// The default tears the provider down and activates it again.
    fn update(&self, context: &ProviderContext) {
        self.deactivate(context);
        if let Err(e) = self.activate(context) {
            warn!("Reactivating provider after update failed: {}", e);
        }
    }
}
