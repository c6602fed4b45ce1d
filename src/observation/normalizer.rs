//! Change normalizer: one upstream subscription per active mount.
//!
//! Raw node and property events arrive in ordered batches on the event
//! source's delivery thread. Each batch is coalesced into at most one
//! [`ChangeRecord`] per node path and handed to the reporter in one call.

use super::change::{AttributeChange, ChangeKind, ChangeRecord, PendingChange};
use super::path_mapper::PathMapper;
use super::reporter::ObservationReporter;
use super::scope::{includes_external, subscription_scope};
use super::source::{
    EventRepository, EventSession, RawEvent, RawEventKind, RawEventListener, SubscriptionScope,
};
use crate::error::ObservationError;
use crate::path::split_property;
use crate::provider::ProviderContext;
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Prepend `mount_prefix` to a native path.
///
/// An empty, root, or slash-terminated prefix leaves the path untouched.
pub fn add_mount_prefix(mount_prefix: &str, path: &str) -> String {
    if mount_prefix.is_empty() || mount_prefix == "/" || mount_prefix.ends_with('/') {
        return path.to_string();
    }
    match path {
        "" | "/" => mount_prefix.to_string(),
        p if p.starts_with('/') => format!("{}{}", mount_prefix, p),
        p => format!("{}/{}", mount_prefix, p),
    }
}

/// Listener registered with the event session.
struct ChangeListener {
    reporter: Arc<dyn ObservationReporter>,
    mapper: Arc<dyn PathMapper>,
    mount_prefix: String,
    include_external: bool,
    /// Cleared by `close`; a batch holds the read guard while it is delivered
    open: RwLock<bool>,
}

impl ChangeListener {
    fn translate(&self, native_path: &str) -> Result<String, ObservationError> {
        if !native_path.starts_with('/') {
            return Err(ObservationError::MalformedPath(native_path.to_string()));
        }
        let prefixed = add_mount_prefix(&self.mount_prefix, native_path);
        self.mapper
            .to_namespace(&prefixed)
            .ok_or(ObservationError::Unmappable(prefixed))
    }

    fn pending(
        &self,
        event: &RawEvent,
        native_path: &str,
        kind: ChangeKind,
    ) -> Result<PendingChange, ObservationError> {
        let path = self.translate(native_path)?;
        Ok(PendingChange::new(
            path,
            kind,
            event.external,
            event.user_id.as_deref(),
        ))
    }
}

impl RawEventListener for ChangeListener {
    fn on_events(&self, events: Vec<RawEvent>) {
        let open = self.open.read();
        if !*open {
            return;
        }

        let mut batch = ChangeBatch::default();
        for event in &events {
            if event.external && !self.include_external {
                continue;
            }
            if let Err(e) = batch.ingest(self, event) {
                error!(path = %event.path, kind = ?event.kind, "Skipping repository event: {}", e);
            }
        }

        let changes = batch.finish();
        if changes.is_empty() {
            return;
        }
        debug!(count = changes.len(), "Reporting change batch");
        self.reporter.report_changes(changes, false);
    }
}

/// Pending records of one batch, keyed by native node path.
#[derive(Default)]
struct ChangeBatch {
    added: BTreeMap<String, PendingChange>,
    changed: BTreeMap<String, PendingChange>,
    removed: BTreeMap<String, PendingChange>,
}

impl ChangeBatch {
    fn ingest(&mut self, listener: &ChangeListener, event: &RawEvent) -> Result<(), ObservationError> {
        let attribute = match event.kind {
            RawEventKind::PropertyAdded => AttributeChange::Added,
            RawEventKind::PropertyChanged => AttributeChange::Changed,
            RawEventKind::PropertyRemoved => AttributeChange::Removed,
            RawEventKind::NodeAdded => {
                let pending = listener.pending(event, &event.path, ChangeKind::Added)?;
                self.removed.remove(&event.path);
                self.added.insert(event.path.clone(), pending);
                return Ok(());
            }
            RawEventKind::NodeRemoved => {
                let pending = listener.pending(event, &event.path, ChangeKind::Removed)?;
                // removal dominates anything else seen for the node
                self.added.remove(&event.path);
                self.changed.remove(&event.path);
                self.removed.insert(event.path.clone(), pending);
                return Ok(());
            }
        };

        let (node, name) = split_property(&event.path)
            .ok_or_else(|| ObservationError::MalformedPath(event.path.clone()))?;
        if self.removed.contains_key(node) {
            return Ok(());
        }
        let pending = match self.changed.entry(node.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(listener.pending(event, node, ChangeKind::Changed)?)
            }
        };
        pending.record_attribute(attribute, name);
        Ok(())
    }

    /// Removed records first, then changed ones, then plain additions.
    fn finish(mut self) -> Vec<ChangeRecord> {
        for path in self.added.keys() {
            if let Some(pending) = self.changed.get_mut(path) {
                pending.set_kind(ChangeKind::Added);
            }
        }
        let changed = self.changed;
        let added: Vec<PendingChange> = self
            .added
            .into_iter()
            .filter(|(path, _)| !changed.contains_key(path))
            .map(|(_, pending)| pending)
            .collect();

        self.removed
            .into_values()
            .chain(changed.into_values())
            .chain(added)
            .map(PendingChange::finish)
            .collect()
    }
}

/// Upstream subscription of one active mount.
///
/// Dropping the normalizer closes it.
pub struct ChangeNormalizer {
    listener: Arc<ChangeListener>,
    session: Option<Box<dyn EventSession>>,
    scope: SubscriptionScope,
}

impl ChangeNormalizer {
    /// Log in to the repository and subscribe with the scope computed from
    /// the context's observers and nested-mount exclusions.
    pub fn open(
        context: &ProviderContext,
        repository: &dyn EventRepository,
        mapper: Arc<dyn PathMapper>,
        mount_prefix: &str,
    ) -> Result<Self, ObservationError> {
        let configurations = context.reporter().observer_configurations();
        let scope = subscription_scope(
            &configurations,
            context.excluded_paths(),
            mapper.as_ref(),
        );
        let listener = Arc::new(ChangeListener {
            reporter: Arc::clone(context.reporter()),
            mapper,
            mount_prefix: mount_prefix.to_string(),
            include_external: includes_external(&configurations),
            open: RwLock::new(true),
        });

        let mut session = repository.login()?;
        let as_listener: Arc<dyn RawEventListener> = listener.clone();
        if let Err(e) = session.subscribe(&scope, as_listener) {
            session.logout();
            return Err(e);
        }
        debug!(root = %scope.root, types = ?scope.types, "Subscribed to repository events");

        Ok(Self {
            listener,
            session: Some(session),
            scope,
        })
    }

    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Unsubscribe and release the session.
    ///
    /// Waits for a batch in flight; no batch is reported once this returns.
    /// The session is released even when unsubscribing fails.
    pub fn close(&mut self) -> Result<(), ObservationError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        *self.listener.open.write() = false;
        let result = session.unsubscribe();
        session.logout();
        match result {
            Ok(()) => {
                debug!(root = %self.scope.root, "Unsubscribed from repository events");
                Ok(())
            }
            Err(e) => {
                warn!(root = %self.scope.root, "Unable to remove session listener: {}", e);
                Err(ObservationError::Release(e.to_string()))
            }
        }
    }
}

impl Drop for ChangeNormalizer {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
