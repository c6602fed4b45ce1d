//! Mapping between namespace paths and the event repository's native paths.

use crate::path::is_descendant_or_self;
use serde::{Deserialize, Serialize};

/// Bidirectional translation between namespace and native addressing.
///
/// `None` means the path has no counterpart on the other side.
pub trait PathMapper: Send + Sync {
    fn to_native(&self, namespace_path: &str) -> Option<String>;
    fn to_namespace(&self, native_path: &str) -> Option<String>;
}

/// Namespace and native addressing are the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPathMapper;

impl PathMapper for IdentityPathMapper {
    fn to_native(&self, namespace_path: &str) -> Option<String> {
        Some(namespace_path.to_string())
    }

    fn to_namespace(&self, native_path: &str) -> Option<String> {
        Some(native_path.to_string())
    }
}

/// One configured prefix pair, e.g. namespace `/apps` backed by native `/var/apps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    pub namespace_prefix: String,
    pub native_prefix: String,
}

impl PathMapping {
    pub fn new(namespace_prefix: impl Into<String>, native_prefix: impl Into<String>) -> Self {
        Self {
            namespace_prefix: namespace_prefix.into(),
            native_prefix: native_prefix.into(),
        }
    }
}

/// Rewrites paths by their longest matching configured prefix.
///
/// Paths matched by no mapping pass through unchanged. A path whose image on
/// the other side would be claimed by a different, longer mapping is
/// unmappable, which keeps the translation invertible.
#[derive(Debug, Clone, Default)]
pub struct PrefixPathMapper {
    mappings: Vec<PathMapping>,
}

impl PrefixPathMapper {
    pub fn new(mut mappings: Vec<PathMapping>) -> Self {
        mappings.retain(|m| m.namespace_prefix.starts_with('/') && m.native_prefix.starts_with('/'));
        Self { mappings }
    }

    /// Build from the observation settings of a loaded configuration.
    pub fn from_settings(settings: &crate::config::ObservationSettings) -> Self {
        Self::new(settings.path_mappings.clone())
    }

    fn best_match<'a>(
        &'a self,
        path: &str,
        key: fn(&PathMapping) -> &str,
    ) -> Option<&'a PathMapping> {
        self.mappings
            .iter()
            .filter(|m| is_descendant_or_self(path, key(m)))
            .max_by_key(|m| key(m).len())
    }

    fn rewrite(
        &self,
        path: &str,
        from: fn(&PathMapping) -> &str,
        to: fn(&PathMapping) -> &str,
    ) -> Option<String> {
        let mapped = match self.best_match(path, from) {
            Some(mapping) => replace_prefix(path, from(mapping), to(mapping)),
            None => path.to_string(),
        };
        // the reverse lookup must pick the same mapping, or the path is ambiguous
        let back = self.best_match(&mapped, to);
        let forward = self.best_match(path, from);
        match (forward, back) {
            (Some(f), Some(b)) if f == b => Some(mapped),
            (None, None) => Some(mapped),
            _ => None,
        }
    }
}

fn replace_prefix(path: &str, from: &str, to: &str) -> String {
    let rest = if from == "/" { path } else { &path[from.len()..] };
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        to.to_string()
    } else if to == "/" {
        format!("/{}", rest)
    } else {
        format!("{}/{}", to, rest)
    }
}

impl PathMapper for PrefixPathMapper {
    fn to_native(&self, namespace_path: &str) -> Option<String> {
        self.rewrite(namespace_path, |m| m.namespace_prefix.as_str(), |m| m.native_prefix.as_str())
    }

    fn to_namespace(&self, native_path: &str) -> Option<String> {
        self.rewrite(native_path, |m| m.native_prefix.as_str(), |m| m.namespace_prefix.as_str())
    }
}
