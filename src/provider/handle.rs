//! Registry-side handle around a valid provider registration.

use super::{ProviderContext, ProviderInfo};
use crate::error::ProviderError;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Activation state of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Inactive,
    Active,
}

/// A valid provider competing for its mount path.
///
/// Handles order by ranking (higher first), then by identity (lower first),
/// so sorting a candidate list puts the preferred provider at index 0.
#[derive(Debug)]
pub struct ProviderHandle {
    info: ProviderInfo,
    state: ActivationState,
    /// Exclusion set handed to the provider on its last activate or update
    excluded_paths: BTreeSet<String>,
}

impl ProviderHandle {
    pub fn new(info: ProviderInfo) -> Self {
        Self {
            info,
            state: ActivationState::Inactive,
            excluded_paths: BTreeSet::new(),
        }
    }

    pub fn info(&self) -> &ProviderInfo {
        &self.info
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }

    pub fn excluded_paths(&self) -> &BTreeSet<String> {
        &self.excluded_paths
    }

    pub(crate) fn activate(&mut self, context: &ProviderContext) -> Result<(), ProviderError> {
        self.info.service().activate(context)?;
        self.state = ActivationState::Active;
        self.excluded_paths = context.excluded_paths().clone();
        Ok(())
    }

    pub(crate) fn deactivate(&mut self, context: &ProviderContext) {
        if self.state == ActivationState::Active {
            self.info.service().deactivate(context);
            self.state = ActivationState::Inactive;
        }
    }

    pub(crate) fn update(&mut self, context: &ProviderContext) {
        self.info.service().update(context);
        self.excluded_paths = context.excluded_paths().clone();
    }
}

impl PartialEq for ProviderHandle {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProviderHandle {}

impl Ord for ProviderHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .info
            .ranking()
            .cmp(&self.info.ranking())
            .then_with(|| self.info.id().cmp(&other.info.id()))
    }
}

impl PartialOrd for ProviderHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
