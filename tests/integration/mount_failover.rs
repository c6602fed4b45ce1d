//! Ranking, shadowing and failover across providers of one mount path.

use crate::support::{info, Call, FakeProvider};
use strata::registry::{FailureReason, MountRegistry};
use strata::types::ProviderId;

fn active(registry: &MountRegistry, path: &str) -> Option<ProviderId> {
    registry.fill().active_at(path).map(|p| p.id)
}

#[test]
fn test_highest_ranking_wins_regardless_of_arrival() {
    let registry = MountRegistry::new();
    let providers: Vec<_> = (0..4).map(|_| FakeProvider::new()).collect();
    for (id, ranking) in [(1u64, 5i64), (2, 20), (3, 10), (4, 20)] {
        registry.register(info(id, "/apps", ranking, &providers[id as usize - 1]));
    }
    // equal ranking falls back to the lower identity
    assert_eq!(active(&registry, "/apps"), Some(ProviderId(2)));

    let snapshot = registry.fill();
    assert_eq!(snapshot.providers.len(), 1);
    assert_eq!(snapshot.failures_with(FailureReason::Shadowed).count(), 3);
}

#[test]
fn test_failover_walks_down_the_list() {
    let registry = MountRegistry::new();
    let first = FakeProvider::new();
    let second = FakeProvider::new();
    let third = FakeProvider::new();
    let first_info = info(1, "/content", 30, &first);
    registry.register(first_info.clone());
    registry.register(info(2, "/content", 20, &second));
    registry.register(info(3, "/content", 10, &third));
    assert_eq!(second.activations(), 0);

    second.set_failing(true);
    registry.unregister(&first_info);

    assert_eq!(first.calls(), vec![Call::Activate(vec![]), Call::Deactivate]);
    assert_eq!(active(&registry, "/content"), Some(ProviderId(3)));
    assert_eq!(third.activations(), 1);

    let snapshot = registry.fill();
    let failed: Vec<ProviderId> = snapshot
        .failures_with(FailureReason::ServiceNotObtainable)
        .map(|f| f.provider.id)
        .collect();
    assert_eq!(failed, vec![ProviderId(2)]);
}

#[test]
fn test_withdrawing_failed_provider_clears_failure() {
    let registry = MountRegistry::new();
    let broken = FakeProvider::failing();
    let broken_info = info(1, "/content", 10, &broken);
    registry.register(broken_info.clone());
    assert_eq!(
        registry.fill().failures_with(FailureReason::ServiceNotObtainable).count(),
        1
    );

    registry.unregister(&broken_info);
    assert!(registry.fill().failed_providers.is_empty());
}

#[test]
fn test_rejected_higher_ranking_leaves_active_untouched() {
    let registry = MountRegistry::new();
    let incumbent = FakeProvider::new();
    let challenger = FakeProvider::failing();
    registry.register(info(1, "/libs", 1, &incumbent));
    registry.register(info(2, "/libs", 100, &challenger));

    assert_eq!(active(&registry, "/libs"), Some(ProviderId(1)));
    assert_eq!(incumbent.calls(), vec![Call::Activate(vec![])]);
}

#[test]
fn test_invalid_descriptors_never_activate() {
    let registry = MountRegistry::new();
    let provider = FakeProvider::new();
    for (id, path) in [(1, ""), (2, "apps"), (3, "/apps//x")] {
        registry.register(info(id, path, 0, &provider));
    }
    assert_eq!(provider.activations(), 0);
    assert!(registry.mount_paths().is_empty());
    assert_eq!(registry.fill().failures_with(FailureReason::Invalid).count(), 3);
}

#[test]
fn test_snapshot_serializes_to_json() {
    let registry = MountRegistry::new();
    let provider = FakeProvider::new();
    registry.register(info(1, "/apps", 3, &provider));
    registry.register(info(2, "/apps", 1, &provider));

    let json: serde_json::Value = serde_json::from_str(&registry.fill().to_json().unwrap()).unwrap();
    assert_eq!(json["providers"][0]["path"], "/apps");
    assert_eq!(json["providers"][0]["ranking"], 3);
    assert_eq!(json["failed_providers"][0]["id"], 2);
    assert_eq!(json["failed_providers"][0]["reason"], "shadowed");
}
