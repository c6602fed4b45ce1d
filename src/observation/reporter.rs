//! Observer configurations and the downstream reporter seam.

use super::change::{ChangeKind, ChangeRecord};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::mpsc;

/// A subscriber's declared interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverConfiguration {
    /// Namespace paths observed, including descendants
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default = "default_change_kinds")]
    pub change_kinds: BTreeSet<ChangeKind>,
    /// Whether changes originating outside this process are wanted
    #[serde(default)]
    pub include_external: bool,
}

fn default_paths() -> Vec<String> {
    vec!["/".to_string()]
}

fn default_change_kinds() -> BTreeSet<ChangeKind> {
    [ChangeKind::Added, ChangeKind::Changed, ChangeKind::Removed]
        .into_iter()
        .collect()
}

impl Default for ObserverConfiguration {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            excluded_paths: Vec::new(),
            change_kinds: default_change_kinds(),
            include_external: false,
        }
    }
}

impl ObserverConfiguration {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn excluding<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ChangeKind>,
    {
        self.change_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_external(mut self) -> Self {
        self.include_external = true;
        self
    }
}

/// Downstream consumer of consolidated change batches.
///
/// Also the source of the observer configurations that scope every upstream
/// subscription.
pub trait ObservationReporter: Send + Sync {
    fn observer_configurations(&self) -> Vec<ObserverConfiguration>;

    /// `distribute` is false for batches observed locally by a provider.
    fn report_changes(&self, changes: Vec<ChangeRecord>, distribute: bool);
}

/// Reporter with no observers; every batch is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ObservationReporter for NullReporter {
    fn observer_configurations(&self) -> Vec<ObserverConfiguration> {
        Vec::new()
    }

    fn report_changes(&self, _changes: Vec<ChangeRecord>, _distribute: bool) {}
}

/// A batch as handed to [`StaticReporter`]'s channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedBatch {
    pub changes: Vec<ChangeRecord>,
    pub distribute: bool,
}

/// Reporter with a fixed set of observers that forwards batches into a channel.
pub struct StaticReporter {
    configurations: Vec<ObserverConfiguration>,
    sink: Mutex<mpsc::Sender<ReportedBatch>>,
}

impl StaticReporter {
    pub fn new(configurations: Vec<ObserverConfiguration>) -> (Self, mpsc::Receiver<ReportedBatch>) {
        let (tx, rx) = mpsc::channel();
        let reporter = Self {
            configurations,
            sink: Mutex::new(tx),
        };
        (reporter, rx)
    }

    /// Observers taken from the observation settings of a loaded configuration.
    pub fn from_settings(
        settings: &crate::config::ObservationSettings,
    ) -> (Self, mpsc::Receiver<ReportedBatch>) {
        Self::new(settings.observers.clone())
    }
}

impl ObservationReporter for StaticReporter {
    fn observer_configurations(&self) -> Vec<ObserverConfiguration> {
        self.configurations.clone()
    }

    fn report_changes(&self, changes: Vec<ChangeRecord>, distribute: bool) {
        if let Err(e) = self.sink.lock().send(ReportedBatch {
            changes,
            distribute,
        }) {
            tracing::debug!("Change batch dropped, receiver gone: {}", e);
        }
    }
}
