//! Change records and their per-batch builder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of a namespace-relative change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

/// A consolidated change for one path within a reporting batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
    pub external: bool,
    pub user_id: Option<String>,
    pub added_attributes: BTreeSet<String>,
    pub changed_attributes: BTreeSet<String>,
    pub removed_attributes: BTreeSet<String>,
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceChange[type={:?}, path={}", self.kind, self.path)?;
        for (label, names) in [
            ("added", &self.added_attributes),
            ("changed", &self.changed_attributes),
            ("removed", &self.removed_attributes),
        ] {
            if !names.is_empty() {
                let joined: Vec<&str> = names.iter().map(String::as_str).collect();
                write!(f, ", {}={{{}}}", label, joined.join(","))?;
            }
        }
        write!(f, "]")
    }
}

/// Which attribute set a property-level event contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttributeChange {
    Added,
    Changed,
    Removed,
}

/// Mutable record accumulated while a batch is ingested.
///
/// Never leaves the batch: `finish` turns it into an immutable [`ChangeRecord`].
#[derive(Debug)]
pub(crate) struct PendingChange {
    path: String,
    kind: ChangeKind,
    external: bool,
    user_id: Option<String>,
    added: BTreeSet<String>,
    changed: BTreeSet<String>,
    removed: BTreeSet<String>,
}

impl PendingChange {
    /// The originating user is only kept for locally originated events.
    pub(crate) fn new(path: String, kind: ChangeKind, external: bool, user_id: Option<&str>) -> Self {
        Self {
            path,
            kind,
            external,
            user_id: if external { None } else { user_id.map(str::to_string) },
            added: BTreeSet::new(),
            changed: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    pub(crate) fn record_attribute(&mut self, change: AttributeChange, name: &str) {
        let set = match change {
            AttributeChange::Added => &mut self.added,
            AttributeChange::Changed => &mut self.changed,
            AttributeChange::Removed => &mut self.removed,
        };
        if !set.contains(name) {
            set.insert(name.to_string());
        }
    }

    pub(crate) fn set_kind(&mut self, kind: ChangeKind) {
        self.kind = kind;
    }

    pub(crate) fn finish(self) -> ChangeRecord {
        ChangeRecord {
            path: self.path,
            kind: self.kind,
            external: self.external,
            user_id: self.user_id,
            added_attributes: self.added,
            changed_attributes: self.changed,
            removed_attributes: self.removed,
        }
    }
}
