//! Mount registry
//!
//! Maps each mount path to its competing provider registrations, keeps the
//! highest-priority one that activated successfully as the active provider,
//! and tracks registrations that are invalid or failed to activate.
//!
//! Structural mutation, activation decisions and exclusion recomputation
//! happen under the table's write lock. The failed set has its own lock and
//! is only ever taken after, never before, the table lock.

mod election;
mod snapshot;
mod tracker;

pub use election::{elect, Election, ElectionState};
pub use snapshot::{FailureReason, ProviderFailure, ProviderSummary, RuntimeSnapshot};
pub use tracker::{ProviderEvent, ProviderRegistration, ProviderTracker};

use crate::observation::{NullReporter, ObservationReporter};
use crate::path::is_descendant_or_self;
use crate::provider::{ProviderContext, ProviderHandle, ProviderInfo};
use crate::types::ProviderId;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mount path -> candidates, highest priority first
type MountTable = BTreeMap<String, Vec<ProviderHandle>>;

/// A provider that is not in the mount table, and why.
#[derive(Debug, Clone)]
struct FailedProvider {
    info: ProviderInfo,
    reason: FailureReason,
}

/// Copy of an active handle taken under the table lock.
#[derive(Debug, Clone)]
pub struct ActiveHandle {
    pub info: ProviderInfo,
    pub excluded_paths: BTreeSet<String>,
}

/// Registry of mounted providers.
pub struct MountRegistry {
    table: RwLock<MountTable>,
    failed: Mutex<BTreeMap<ProviderId, FailedProvider>>,
    reporter: RwLock<Arc<dyn ObservationReporter>>,
}

/// Every other mounted path at or below `path`.
fn exclusions_in(table: &MountTable, path: &str) -> BTreeSet<String> {
    table
        .keys()
        .filter(|p| p.as_str() != path && is_descendant_or_self(p, path))
        .cloned()
        .collect()
}

impl MountRegistry {
    /// Create an empty registry with no observers
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(NullReporter))
    }

    /// Create a registry whose providers report changes to `reporter`
    pub fn with_reporter(reporter: Arc<dyn ObservationReporter>) -> Self {
        Self {
            table: RwLock::new(BTreeMap::new()),
            failed: Mutex::new(BTreeMap::new()),
            reporter: RwLock::new(reporter),
        }
    }

    fn context_for(&self, table: &MountTable, path: &str) -> ProviderContext {
        ProviderContext::new(Arc::clone(&self.reporter.read()), exclusions_in(table, path))
    }

    fn record_failure(&self, info: ProviderInfo, reason: FailureReason) {
        self.failed
            .lock()
            .insert(info.id(), FailedProvider { info, reason });
    }

    /// Register a provider announced by the provider source.
    ///
    /// An invalid provider is only recorded. A valid one is inserted in
    /// priority order; if it lands at the head it is activated and the
    /// previous head is shadowed. A head that fails to activate is moved to
    /// the failed set and the previous head stays active.
    pub fn register(&self, info: ProviderInfo) {
        if !info.is_valid() {
            debug!(provider = %info, reason = ?info.invalid_reason(), "Ignoring invalid resource provider");
            self.record_failure(info, FailureReason::Invalid);
            return;
        }

        debug!(provider = %info, "Registering new resource provider");
        let mut table = self.table.write();
        let path = info.path().to_string();
        let new_mount = !table.contains_key(&path);
        let context = self.context_for(&table, &path);

        let candidates = table.entry(path.clone()).or_default();
        if candidates.iter().any(|h| h.info().id() == info.id()) {
            warn!(provider = %info, "Provider already registered, ignoring");
            return;
        }
        let handle = ProviderHandle::new(info);
        let position = candidates
            .binary_search(&handle)
            .unwrap_or_else(|insert_at| insert_at);
        candidates.insert(position, handle);

        if position == 0 {
            match candidates[0].activate(&context) {
                Ok(()) => {
                    debug!(provider = %candidates[0].info(), "Activated resource provider");
                    if let Some(shadowed) = candidates.get_mut(1) {
                        shadowed.deactivate(&context);
                        debug!(provider = %shadowed.info(), "Deactivated resource provider");
                    }
                }
                Err(e) => {
                    let failed = candidates.remove(0);
                    warn!(provider = %failed.info(), "Activating resource provider failed: {}", e);
                    if candidates.is_empty() {
                        table.remove(&path);
                    }
                    self.record_failure(failed.info().clone(), FailureReason::ServiceNotObtainable);
                }
            }
        }

        if new_mount && table.contains_key(&path) {
            self.refresh_exclusions(&mut table, &path);
        }
    }

    /// Withdraw a provider.
    ///
    /// Withdrawing the active provider promotes the next candidate; candidates
    /// that fail to activate are moved to the failed set until one succeeds
    /// or the list is exhausted.
    pub fn unregister(&self, info: &ProviderInfo) {
        let stale = self.failed.lock().remove(&info.id());
        if !info.is_valid() {
            debug!(provider = %info, "Unregistering invalid resource provider");
            return;
        }
        if stale.is_some() {
            debug!(provider = %info, "Dropped failed resource provider");
        }

        let mut table = self.table.write();
        let path = info.path();
        let context = self.context_for(&table, path);
        let Some(candidates) = table.get_mut(path) else {
            return;
        };
        let Some(position) = candidates.iter().position(|h| h.info().id() == info.id()) else {
            return;
        };
        debug!(provider = %info, "Unregistering resource provider");

        if position != 0 {
            candidates.remove(position);
            return;
        }

        candidates[0].deactivate(&context);
        debug!(provider = %info, "Deactivated resource provider");
        candidates.remove(0);

        let election = elect(candidates, |candidate| match candidate.activate(&context) {
            Ok(()) => {
                debug!(provider = %candidate.info(), "Activated resource provider");
                true
            }
            Err(e) => {
                warn!(provider = %candidate.info(), "Activating resource provider failed: {}", e);
                false
            }
        });
        let failed: Vec<ProviderHandle> = candidates.drain(..election.failed.len()).collect();
        let exhausted = candidates.is_empty();
        for handle in failed {
            self.record_failure(handle.info().clone(), FailureReason::ServiceNotObtainable);
        }

        if exhausted {
            table.remove(path);
            self.refresh_exclusions(&mut table, path);
        }
    }

    /// Hand a fresh context to active ancestors of `changed_path` whose
    /// exclusion set no longer matches the table.
    fn refresh_exclusions(&self, table: &mut MountTable, changed_path: &str) {
        let view: &MountTable = table;
        let ancestors: Vec<(String, ProviderContext)> = view
            .keys()
            .filter(|p| p.as_str() != changed_path && is_descendant_or_self(changed_path, p))
            .map(|p| (p.clone(), self.context_for(view, p)))
            .collect();
        for (path, context) in ancestors {
            let Some(head) = table.get_mut(&path).and_then(|c| c.first_mut()) else {
                continue;
            };
            if head.is_active() && head.excluded_paths() != context.excluded_paths() {
                debug!(path = %path, excluded = ?context.excluded_paths(), "Updating exclusions of active provider");
                head.update(&context);
            }
        }
    }

    /// Active handles across all mount paths, ordered by mount path.
    pub fn active_handles(&self) -> Vec<ActiveHandle> {
        self.table
            .read()
            .values()
            .filter_map(|candidates| candidates.first())
            .filter(|head| head.is_active())
            .map(|head| ActiveHandle {
                info: head.info().clone(),
                excluded_paths: head.excluded_paths().clone(),
            })
            .collect()
    }

    /// Mounted paths nested below `path`, excluding `path` itself.
    pub fn excluded_paths(&self, path: &str) -> BTreeSet<String> {
        exclusions_in(&self.table.read(), path)
    }

    /// Mount paths that currently have candidates.
    pub fn mount_paths(&self) -> Vec<String> {
        self.table.read().keys().cloned().collect()
    }

    /// Install a new reporter after the observer configuration changed.
    ///
    /// Every active provider gets `update` with a fresh context so its event
    /// subscription is rebuilt against the new observers.
    pub fn refresh_observers(&self, reporter: Arc<dyn ObservationReporter>) {
        *self.reporter.write() = reporter;
        let mut table = self.table.write();
        let contexts: Vec<(String, ProviderContext)> = table
            .keys()
            .map(|p| (p.clone(), self.context_for(&table, p)))
            .collect();
        for (path, context) in contexts {
            if let Some(head) = table.get_mut(&path).and_then(|c| c.first_mut()) {
                if head.is_active() {
                    head.update(&context);
                }
            }
        }
        info!(mounts = table.len(), "Observer configuration refreshed");
    }

    /// Consistent snapshot of active, shadowed, and failed providers.
    ///
    /// The failed set is read while the table lock is still held, so a
    /// provider moved between the two by a concurrent withdrawal is seen in
    /// exactly one of them.
    pub fn fill(&self) -> RuntimeSnapshot {
        let mut providers = Vec::new();
        let mut failed_providers = Vec::new();
        let table = self.table.read();
        for candidates in table.values() {
            for (index, handle) in candidates.iter().enumerate() {
                let summary = ProviderSummary::from(handle.info());
                if index == 0 && handle.is_active() {
                    providers.push(summary);
                } else {
                    failed_providers.push(ProviderFailure {
                        provider: summary,
                        reason: FailureReason::Shadowed,
                    });
                }
            }
        }
        failed_providers.extend(self.failed.lock().values().map(|f| ProviderFailure {
            provider: ProviderSummary::from(&f.info),
            reason: f.reason,
        }));
        drop(table);
        RuntimeSnapshot {
            taken_at: Utc::now(),
            providers,
            failed_providers,
        }
    }

    /// Deactivate every active provider and forget all registrations.
    pub fn shutdown(&self) {
        let mut table = self.table.write();
        let contexts: Vec<(String, ProviderContext)> = table
            .keys()
            .map(|p| (p.clone(), self.context_for(&table, p)))
            .collect();
        for (path, context) in contexts {
            if let Some(head) = table.get_mut(&path).and_then(|c| c.first_mut()) {
                head.deactivate(&context);
            }
        }
        table.clear();
        self.failed.lock().clear();
        info!("Mount registry shut down");
    }
}

impl Default for MountRegistry {
    fn default() -> Self {
        Self::new()
    }
}
