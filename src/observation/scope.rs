//! Subscription scope derived from observer configurations.

use super::change::ChangeKind;
use super::path_mapper::PathMapper;
use super::reporter::ObserverConfiguration;
use super::source::{EventTypes, SubscriptionScope};
use crate::path::longest_common_prefix;
use std::collections::BTreeSet;

/// Native root path covering every path of interest.
///
/// Per observer: mapped include paths minus mapped exclude paths. The union
/// over observers loses the nested mounts in `excluded_mounts`; the result is
/// the longest common prefix of what remains.
pub fn observed_root(
    configurations: &[ObserverConfiguration],
    excluded_mounts: &BTreeSet<String>,
    mapper: &dyn PathMapper,
) -> String {
    let mut paths = BTreeSet::new();
    for config in configurations {
        let excluded: BTreeSet<String> = config
            .excluded_paths
            .iter()
            .filter_map(|p| mapper.to_native(p))
            .collect();
        paths.extend(
            config
                .paths
                .iter()
                .filter_map(|p| mapper.to_native(p))
                .filter(|p| !excluded.contains(p)),
        );
    }
    for mount in excluded_mounts {
        if let Some(native) = mapper.to_native(mount) {
            paths.remove(&native);
        }
    }
    longest_common_prefix(&paths)
}

/// Raw event types needed to serve every observer's change kinds.
pub fn observed_types(configurations: &[ObserverConfiguration]) -> EventTypes {
    let mut types = EventTypes::empty();
    for kind in configurations.iter().flat_map(|c| c.change_kinds.iter()) {
        types |= match kind {
            ChangeKind::Added => EventTypes::NODE_ADDED,
            ChangeKind::Removed => EventTypes::NODE_REMOVED,
            ChangeKind::Changed => EventTypes::PROPERTIES,
        };
    }
    types
}

/// Whether any observer wants externally originated changes.
pub fn includes_external(configurations: &[ObserverConfiguration]) -> bool {
    configurations.iter().any(|c| c.include_external)
}

/// Deep subscription scope for the given observers and nested mounts.
pub fn subscription_scope(
    configurations: &[ObserverConfiguration],
    excluded_mounts: &BTreeSet<String>,
    mapper: &dyn PathMapper,
) -> SubscriptionScope {
    SubscriptionScope {
        root: observed_root(configurations, excluded_mounts, mapper),
        types: observed_types(configurations),
        include_descendants: true,
    }
}
