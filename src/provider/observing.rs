//! Provider whose activation lifecycle drives a change normalizer.

use super::{ProviderContext, ResourceProvider};
use crate::config::ObservationSettings;
use crate::error::ProviderError;
use crate::observation::{
    ChangeNormalizer, EventRepository, PathMapper, PrefixPathMapper, SubscriptionScope,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Observes an event repository for as long as it is the active provider.
///
/// `activate` subscribes, `deactivate` unsubscribes before returning, and
/// `update` rebuilds the subscription against the new context.
pub struct ObservingProvider {
    repository: Arc<dyn EventRepository>,
    mapper: Arc<dyn PathMapper>,
    mount_prefix: String,
    normalizer: Mutex<Option<ChangeNormalizer>>,
}

impl ObservingProvider {
    pub fn new(repository: Arc<dyn EventRepository>, mapper: Arc<dyn PathMapper>) -> Self {
        Self {
            repository,
            mapper,
            mount_prefix: String::new(),
            normalizer: Mutex::new(None),
        }
    }

    /// Mount prefix and path mappings taken from the observation settings.
    pub fn from_settings(repository: Arc<dyn EventRepository>, settings: &ObservationSettings) -> Self {
        Self::new(repository, Arc::new(PrefixPathMapper::from_settings(settings)))
            .with_mount_prefix(settings.mount_prefix.clone())
    }

    pub fn with_mount_prefix(mut self, mount_prefix: impl Into<String>) -> Self {
        self.mount_prefix = mount_prefix.into();
        self
    }

    pub fn is_observing(&self) -> bool {
        self.normalizer.lock().is_some()
    }

    /// Scope of the current subscription, if any.
    pub fn scope(&self) -> Option<SubscriptionScope> {
        self.normalizer.lock().as_ref().map(|n| n.scope().clone())
    }

    fn close(slot: &mut Option<ChangeNormalizer>) {
        if let Some(mut normalizer) = slot.take() {
            if let Err(e) = normalizer.close() {
                warn!("Closing change normalizer failed: {}", e);
            }
        }
    }
}

impl ResourceProvider for ObservingProvider {
    fn activate(&self, context: &ProviderContext) -> Result<(), ProviderError> {
        let mut slot = self.normalizer.lock();
        Self::close(&mut slot);
        let normalizer = ChangeNormalizer::open(
            context,
            self.repository.as_ref(),
            Arc::clone(&self.mapper),
            &self.mount_prefix,
        )?;
        debug!(root = %normalizer.scope().root, "Observing provider activated");
        *slot = Some(normalizer);
        Ok(())
    }

    fn deactivate(&self, _context: &ProviderContext) {
        let mut slot = self.normalizer.lock();
        Self::close(&mut slot);
    }

    fn update(&self, context: &ProviderContext) {
        if let Err(e) = self.activate(context) {
            error!("Unable to re-subscribe after observer update: {}", e);
        }
    }
}
