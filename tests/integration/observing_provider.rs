//! Registry activation driving upstream subscriptions end to end.

use crate::support::{info, FakeProvider, FakeRepository, RecordingReporter};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use strata::config::ObservationSettings;
use strata::observation::{
    ChangeKind, IdentityPathMapper, ObservationReporter, ObserverConfiguration, PathMapping,
    RawEvent, RawEventKind,
};
use strata::provider::{ObservingProvider, ProviderDescriptor, ProviderInfo, ResourceProvider};
use strata::registry::{FailureReason, MountRegistry};
use strata::types::ProviderId;

fn observing(repository: &FakeRepository) -> Arc<ObservingProvider> {
    Arc::new(ObservingProvider::new(
        Arc::new(repository.clone()),
        Arc::new(IdentityPathMapper),
    ))
}

fn registration(id: u64, path: &str, ranking: i64, provider: &Arc<ObservingProvider>) -> ProviderInfo {
    let service: Arc<dyn ResourceProvider> = provider.clone();
    ProviderInfo::new(ProviderId(id), ProviderDescriptor::new(path).ranking(ranking), service)
}

fn registry_with(reporter: &Arc<RecordingReporter>) -> MountRegistry {
    let reporter: Arc<dyn ObservationReporter> = reporter.clone();
    MountRegistry::with_reporter(reporter)
}

#[test]
fn test_activation_subscribes_and_reports() {
    let reporter = RecordingReporter::new(vec![ObserverConfiguration::new(["/content"])]);
    let registry = registry_with(&reporter);
    let repository = FakeRepository::new();
    let provider = observing(&repository);

    registry.register(registration(1, "/content", 0, &provider));
    assert!(provider.is_observing());
    assert_eq!(provider.scope().unwrap().root, "/content");

    repository.deliver(vec![RawEvent::new(RawEventKind::NodeAdded, "/content/page")]);
    let batches = reporter.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].kind, ChangeKind::Added);
}

#[test]
fn test_shadowing_unsubscribes_before_returning() {
    let reporter = RecordingReporter::observing_all();
    let registry = registry_with(&reporter);
    let low_repository = FakeRepository::new();
    let high_repository = FakeRepository::new();
    let low = observing(&low_repository);
    let high = observing(&high_repository);

    registry.register(registration(1, "/content", 1, &low));
    registry.register(registration(2, "/content", 9, &high));

    assert!(!low.is_observing());
    assert!(!low_repository.is_subscribed());
    assert_eq!(low_repository.logouts(), 1);
    assert!(high.is_observing());
}

#[test]
fn test_nested_mount_narrows_subscription() {
    let reporter = RecordingReporter::new(vec![ObserverConfiguration::new([
        "/content/site",
        "/content/dam",
    ])]);
    let registry = registry_with(&reporter);
    let repository = FakeRepository::new();
    let provider = observing(&repository);

    registry.register(registration(1, "/content", 0, &provider));
    assert_eq!(provider.scope().unwrap().root, "/content");

    let nested = FakeProvider::new();
    registry.register(info(2, "/content/dam", 0, &nested));
    assert_eq!(provider.scope().unwrap().root, "/content/site");
    assert_eq!(repository.logins(), 2);
    assert_eq!(repository.logouts(), 1);
}

#[test]
fn test_observer_refresh_resubscribes() {
    let reporter = RecordingReporter::new(vec![ObserverConfiguration::new(["/apps"])]);
    let registry = registry_with(&reporter);
    let repository = FakeRepository::new();
    let provider = observing(&repository);
    registry.register(registration(1, "/", 0, &provider));
    assert_eq!(provider.scope().unwrap().root, "/apps");

    let updated = RecordingReporter::new(vec![ObserverConfiguration::new(["/libs"])]);
    let as_reporter: Arc<dyn ObservationReporter> = updated.clone();
    registry.refresh_observers(as_reporter);
    assert_eq!(provider.scope().unwrap().root, "/libs");

    repository.deliver(vec![RawEvent::new(RawEventKind::NodeRemoved, "/libs/x")]);
    assert!(reporter.batches().is_empty());
    assert_eq!(updated.batches().len(), 1);
}

#[test]
fn test_subscribe_failure_fails_activation() {
    let reporter = RecordingReporter::observing_all();
    let registry = registry_with(&reporter);
    let repository = FakeRepository::new();
    repository.state.fail_subscribe.store(true, Ordering::SeqCst);
    let provider = observing(&repository);

    registry.register(registration(1, "/content", 0, &provider));
    assert!(!provider.is_observing());
    assert_eq!(
        registry.fill().failures_with(FailureReason::ServiceNotObtainable).count(),
        1
    );
}

#[test]
fn test_withdrawal_unsubscribes() {
    let reporter = RecordingReporter::observing_all();
    let registry = registry_with(&reporter);
    let repository = FakeRepository::new();
    let provider = observing(&repository);
    let registered = registration(1, "/content", 0, &provider);
    registry.register(registered.clone());
    registry.unregister(&registered);

    assert!(!repository.is_subscribed());
    assert!(!repository.deliver(vec![RawEvent::new(RawEventKind::NodeAdded, "/content/x")]));
    assert!(reporter.batches().is_empty());
}

#[test]
fn test_from_settings_applies_prefix_and_mappings() {
    let settings = ObservationSettings {
        mount_prefix: "/repo".to_string(),
        path_mappings: vec![PathMapping::new("/apps", "/repo/apps")],
        observers: Vec::new(),
    };
    let reporter = RecordingReporter::observing_all();
    let registry = registry_with(&reporter);
    let repository = FakeRepository::new();
    let provider = Arc::new(ObservingProvider::from_settings(
        Arc::new(repository.clone()),
        &settings,
    ));
    registry.register(registration(1, "/", 0, &provider));

    repository.deliver(vec![RawEvent::new(RawEventKind::NodeAdded, "/apps/core")]);
    assert_eq!(reporter.batches()[0][0].path, "/apps/core");
}
