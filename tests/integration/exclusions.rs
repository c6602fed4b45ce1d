//! Exclusion sets handed to providers of nested mounts.

use crate::support::{info, Call, FakeProvider};
use proptest::prelude::*;
use std::collections::BTreeSet;
use strata::path::is_descendant_or_self;
use strata::registry::MountRegistry;

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_nested_mount_exclusions() {
    let registry = MountRegistry::new();
    let provider = FakeProvider::new();
    registry.register(info(1, "/a", 0, &provider));
    registry.register(info(2, "/a/b", 0, &provider));
    registry.register(info(3, "/a/b/c", 0, &provider));

    assert_eq!(registry.excluded_paths("/a"), set(&["/a/b", "/a/b/c"]));
    assert_eq!(registry.excluded_paths("/a/b"), set(&["/a/b/c"]));
    assert_eq!(registry.excluded_paths("/a/b/c"), set(&[]));

    let handles = registry.active_handles();
    let by_path: Vec<(String, BTreeSet<String>)> = handles
        .into_iter()
        .map(|h| (h.info.path().to_string(), h.excluded_paths))
        .collect();
    assert_eq!(
        by_path,
        vec![
            ("/a".to_string(), set(&["/a/b", "/a/b/c"])),
            ("/a/b".to_string(), set(&["/a/b/c"])),
            ("/a/b/c".to_string(), set(&[])),
        ]
    );
}

#[test]
fn test_sibling_with_shared_prefix_is_not_nested() {
    let registry = MountRegistry::new();
    let provider = FakeProvider::new();
    registry.register(info(1, "/a", 0, &provider));
    registry.register(info(2, "/ab", 0, &provider));
    assert!(registry.excluded_paths("/a").is_empty());
}

#[test]
fn test_root_mount_excludes_everything_else() {
    let registry = MountRegistry::new();
    let root = FakeProvider::new();
    let apps = FakeProvider::new();
    registry.register(info(1, "/", 0, &root));
    registry.register(info(2, "/apps", 0, &apps));

    assert_eq!(registry.excluded_paths("/"), set(&["/apps"]));
    assert_eq!(
        root.calls(),
        vec![Call::Activate(vec![]), Call::Update(vec!["/apps".to_string()])]
    );
}

#[test]
fn test_nested_provider_activated_with_its_exclusions() {
    let registry = MountRegistry::new();
    let inner = FakeProvider::new();
    let middle = FakeProvider::new();
    registry.register(info(1, "/a/b/c", 0, &inner));
    registry.register(info(2, "/a/b", 0, &middle));
    assert_eq!(middle.calls(), vec![Call::Activate(vec!["/a/b/c".to_string()])]);
}

#[test]
fn test_failed_nested_mount_does_not_update_ancestor() {
    let registry = MountRegistry::new();
    let outer = FakeProvider::new();
    let broken = FakeProvider::failing();
    registry.register(info(1, "/a", 0, &outer));
    registry.register(info(2, "/a/b", 0, &broken));

    assert_eq!(outer.calls(), vec![Call::Activate(vec![])]);
    assert!(registry.excluded_paths("/a").is_empty());
}

#[test]
fn test_withdrawn_nested_mount_shrinks_exclusions() {
    let registry = MountRegistry::new();
    let outer = FakeProvider::new();
    let inner = FakeProvider::new();
    let inner_info = info(2, "/a/b", 0, &inner);
    registry.register(info(1, "/a", 0, &outer));
    registry.register(inner_info.clone());
    assert_eq!(outer.last_exclusions(), Some(vec!["/a/b".to_string()]));

    registry.unregister(&inner_info);
    assert_eq!(outer.last_exclusions(), Some(vec![]));
}

proptest! {
    #[test]
    fn prop_exclusions_are_strict_descendants(
        paths in proptest::collection::btree_set("(/[a-c]){1,3}", 1..8)
    ) {
        let registry = MountRegistry::new();
        let provider = FakeProvider::new();
        for (id, path) in paths.iter().enumerate() {
            registry.register(info(id as u64, path, 0, &provider));
        }
        for path in &paths {
            let excluded = registry.excluded_paths(path);
            let expected: BTreeSet<String> = paths
                .iter()
                .filter(|p| *p != path && is_descendant_or_self(p, path))
                .cloned()
                .collect();
            prop_assert_eq!(excluded, expected);
        }
        for handle in registry.active_handles() {
            prop_assert_eq!(&handle.excluded_paths, &registry.excluded_paths(handle.info.path()));
        }
    }
}
