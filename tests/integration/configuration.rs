//! Configuration files feeding the observation components.

use std::fs;
use strata::config::ConfigLoader;
use strata::observation::{ChangeKind, ObservationReporter, PathMapper, PrefixPathMapper, StaticReporter};

#[test]
fn test_settings_build_mapper_and_reporter() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("observation.toml");
    fs::write(
        &file,
        r#"
        [observation]
        mount_prefix = "/repo"

        [[observation.path_mappings]]
        namespace_prefix = "/content/dam"
        native_prefix = "/assets"

        [[observation.path_mappings]]
        namespace_prefix = "relative"
        native_prefix = "/ignored"

        [[observation.observers]]
        paths = ["/content"]
        excluded_paths = ["/content/dam"]
        change_kinds = ["changed"]
        include_external = true
        "#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&file).unwrap();
    let mapper = PrefixPathMapper::from_settings(&config.observation);
    assert_eq!(mapper.to_native("/content/dam/a.png").as_deref(), Some("/assets/a.png"));
    assert_eq!(mapper.to_native("relative/x").as_deref(), Some("relative/x"));

    let (reporter, _batches) = StaticReporter::from_settings(&config.observation);
    let observers = reporter.observer_configurations();
    assert_eq!(observers.len(), 1);
    assert!(observers[0].include_external);
    assert_eq!(observers[0].change_kinds.iter().copied().collect::<Vec<_>>(), vec![ChangeKind::Changed]);
}

#[test]
fn test_default_configuration() {
    let config = ConfigLoader::default();
    assert_eq!(config.logging.level, "info");
    assert!(config.observation.observers.is_empty());
    assert!(config.observation.mount_prefix.is_empty());
}
