//! End-to-end resolution scenarios over an in-memory store and a fixture
//! artifact repository.

use std::collections::BTreeSet;
use std::sync::Arc;

use depot_core::{Coordinate, DeclaredDependency, DependencyReport, VersionRecord};
use depot_registry::FixtureRepository;
use depot_resolver::{Resolver, WalkerContext};
use depot_store::{MemoryStore, ProjectStore};

fn coord(s: &str) -> Coordinate {
    Coordinate::parse(s).unwrap()
}

fn plain(s: &str) -> DeclaredDependency {
    DeclaredDependency::plain(coord(s))
}

fn resolver(
    store: MemoryStore,
    repository: FixtureRepository,
) -> (Resolver, Arc<MemoryStore>) {
    let store = Arc::new(store);
    (
        Resolver::new(store.clone(), Arc::new(repository)),
        store,
    )
}

#[test]
fn single_dependency_closure_includes_self() {
    // B@1.0.0 -> C@1.0.0
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.b:b:1.0.0"), vec![plain("org.c:c:1.0.0")]);
    repo.publish(coord("org.c:c:1.0.0"), vec![]);
    let (resolver, store) = resolver(MemoryStore::new(), repo);

    let closure = resolver.compute_dependencies("org.b", "b", "1.0.0").unwrap();
    assert_eq!(
        closure.into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([coord("org.b:b:1.0.0"), coord("org.c:c:1.0.0")])
    );

    // Top-level write-back happened, without the version itself.
    let record = store.find("org.b", "b", "1.0.0").unwrap();
    assert!(record.transitive_report.valid);
    assert_eq!(
        record.transitive_report.closure,
        BTreeSet::from([coord("org.c:c:1.0.0")])
    );
}

#[test]
fn deep_closure_is_reachability() {
    // a -> b -> c -> d, a -> d (diamond tail)
    let mut repo = FixtureRepository::new();
    repo.publish(
        coord("org.g:a:1.0.0"),
        vec![plain("org.g:b:1.0.0"), plain("org.g:d:1.0.0")],
    );
    repo.publish(coord("org.g:b:1.0.0"), vec![plain("org.g:c:1.0.0")]);
    repo.publish(coord("org.g:c:1.0.0"), vec![plain("org.g:d:1.0.0")]);
    repo.publish(coord("org.g:d:1.0.0"), vec![]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    let closure = resolver.compute_dependencies("org.g", "a", "1.0.0").unwrap();
    assert_eq!(
        closure.into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([
            coord("org.g:a:1.0.0"),
            coord("org.g:b:1.0.0"),
            coord("org.g:c:1.0.0"),
            coord("org.g:d:1.0.0"),
        ])
    );
}

#[test]
fn requested_version_overrides_walked_version() {
    // B@1 -> C@1; C@2 -> D@1; requesting both B@1 and C@2 strips C@1.
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.b:b:1.0.0"), vec![plain("org.c:c:1.0.0")]);
    repo.publish(coord("org.c:c:1.0.0"), vec![]);
    repo.publish(coord("org.c:c:2.0.0"), vec![plain("org.d:d:1.0.0")]);
    repo.publish(coord("org.d:d:1.0.0"), vec![]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    let ctx = WalkerContext::new();
    let report = resolver
        .resolve_with_context(&ctx, &[coord("org.b:b:1.0.0"), coord("org.c:c:2.0.0")])
        .unwrap();

    assert!(report.valid);
    assert_eq!(
        report.closure,
        BTreeSet::from([
            coord("org.b:b:1.0.0"),
            coord("org.c:c:2.0.0"),
            coord("org.d:d:1.0.0"),
        ])
    );
}

#[test]
fn poisoned_upstream_invalidates_dependents() {
    // A -> Z where Z's stored report is already invalid.
    let store = MemoryStore::new();
    store.upsert(
        &coord("org.z:z:1.0.0"),
        VersionRecord {
            transitive_report: DependencyReport::invalid(),
            ..VersionRecord::default()
        },
    );
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.a:a:1.0.0"), vec![plain("org.z:z:1.0.0")]);
    let (resolver, store) = resolver(store, repo);

    let ctx = WalkerContext::new();
    let report = resolver
        .resolve_with_context(&ctx, &[coord("org.a:a:1.0.0")])
        .unwrap();
    assert!(!report.valid);
    assert!(report.closure.is_empty());

    // The failure path writes nothing back.
    let closure = resolver.compute_dependencies("org.a", "a", "1.0.0").unwrap();
    assert!(closure.is_empty());
    assert!(store.find("org.a", "a", "1.0.0").is_none());
}

#[test]
fn excluded_version_terminates_branch() {
    let store = MemoryStore::new();
    let mut excluded = VersionRecord::default();
    excluded.exclude("retracted by publisher");
    store.upsert(&coord("org.e:e:1.0.0"), excluded);

    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.a:a:1.0.0"), vec![plain("org.e:e:1.0.0")]);
    let (resolver, _) = resolver(store, repo);

    let ctx = WalkerContext::new();
    let report = resolver
        .resolve_with_context(&ctx, &[coord("org.a:a:1.0.0")])
        .unwrap();
    assert!(!report.valid);
}

#[test]
fn cycle_fails_fast_as_invalid() {
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.a:a:1.0.0"), vec![plain("org.b:b:1.0.0")]);
    repo.publish(coord("org.b:b:1.0.0"), vec![plain("org.a:a:1.0.0")]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    let ctx = WalkerContext::new();
    let report = resolver
        .resolve_with_context(&ctx, &[coord("org.a:a:1.0.0")])
        .unwrap();
    assert!(!report.valid);
}

#[test]
fn missing_coordinate_is_a_fatal_error() {
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.a:a:1.0.0"), vec![plain("org.m:m:1.0.0")]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    assert!(resolver.compute_dependencies("org.a", "a", "1.0.0").is_err());
}

#[test]
fn declared_exclusion_strips_subtree() {
    // A -> L, L declares "exclude org.x:x"; L -> X -> Y.
    let mut repo = FixtureRepository::new();
    repo.publish(
        coord("org.a:a:1.0.0"),
        vec![DeclaredDependency {
            coordinate: coord("org.l:l:1.0.0"),
            exclusions: vec![Coordinate::pattern("org.x", "x")],
        }],
    );
    repo.publish(coord("org.l:l:1.0.0"), vec![plain("org.x:x:1.0.0")]);
    repo.publish(coord("org.x:x:1.0.0"), vec![plain("org.y:y:1.0.0")]);
    repo.publish(coord("org.y:y:1.0.0"), vec![]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    let ctx = WalkerContext::new();
    let report = resolver
        .resolve_with_context(&ctx, &[coord("org.a:a:1.0.0")])
        .unwrap();

    assert!(report.valid);
    assert_eq!(
        report.closure,
        BTreeSet::from([coord("org.a:a:1.0.0"), coord("org.l:l:1.0.0")])
    );
}

#[test]
fn stored_closures_are_trusted_for_releases() {
    // The store already knows R's closure; the repository is empty, so
    // any fetch attempt would fail the test.
    let store = MemoryStore::new();
    store.upsert(
        &coord("org.r:r:1.0.0"),
        VersionRecord {
            direct_dependencies: vec![coord("org.s:s:1.0.0")],
            transitive_report: DependencyReport::valid(BTreeSet::from([
                coord("org.s:s:1.0.0"),
                coord("org.t:t:1.0.0"),
            ])),
            ..VersionRecord::default()
        },
    );
    let (resolver, _) = resolver(store, FixtureRepository::new());

    let closure = resolver.compute_dependencies("org.r", "r", "1.0.0").unwrap();
    assert_eq!(
        closure.into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([
            coord("org.r:r:1.0.0"),
            coord("org.s:s:1.0.0"),
            coord("org.t:t:1.0.0"),
        ])
    );
}

#[test]
fn snapshot_closures_are_recomputed() {
    // The stored snapshot record carries a stale closure; resolution must
    // recompute from the direct dependencies instead of trusting it.
    let store = MemoryStore::new();
    store.upsert(
        &coord("org.s:s:1.0-SNAPSHOT"),
        VersionRecord {
            direct_dependencies: vec![coord("org.n:n:1.0.0")],
            transitive_report: DependencyReport::valid(BTreeSet::from([coord(
                "org.stale:stale:0.1.0",
            )])),
            ..VersionRecord::default()
        },
    );
    store.upsert(&coord("org.n:n:1.0.0"), VersionRecord {
        transitive_report: DependencyReport::valid(BTreeSet::new()),
        ..VersionRecord::default()
    });
    let (resolver, _) = resolver(store, FixtureRepository::new());

    let closure = resolver
        .compute_dependencies("org.s", "s", "1.0-SNAPSHOT")
        .unwrap();
    assert_eq!(
        closure.into_iter().collect::<BTreeSet<_>>(),
        BTreeSet::from([coord("org.s:s:1.0-SNAPSHOT"), coord("org.n:n:1.0.0")])
    );
}

#[test]
fn set_transitive_dependencies_mutates_in_place() {
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.b:b:1.0.0"), vec![plain("org.c:c:1.0.0")]);
    repo.publish(coord("org.c:c:1.0.0"), vec![]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    let v = coord("org.v:v:2.0.0");
    let mut record = VersionRecord {
        direct_dependencies: vec![coord("org.b:b:1.0.0")],
        ..VersionRecord::default()
    };
    resolver.set_transitive_dependencies(&v, &mut record).unwrap();

    assert!(record.transitive_report.valid);
    assert_eq!(
        record.transitive_report.closure,
        BTreeSet::from([coord("org.b:b:1.0.0"), coord("org.c:c:1.0.0")])
    );
}

#[test]
fn excluded_record_never_gets_a_closure() {
    let (resolver, _) = resolver(MemoryStore::new(), FixtureRepository::new());

    let v = coord("org.v:v:2.0.0");
    let mut record = VersionRecord {
        direct_dependencies: vec![coord("org.b:b:1.0.0")],
        ..VersionRecord::default()
    };
    record.exclude("license violation");
    resolver.set_transitive_dependencies(&v, &mut record).unwrap();

    assert!(!record.transitive_report.valid);
    assert!(record.transitive_report.is_empty());
}

#[test]
fn parallel_requests_share_one_context() {
    // Diamond: R1 -> S, R2 -> S, S -> T; both roots resolved concurrently
    // against one context.
    let mut repo = FixtureRepository::new();
    repo.publish(coord("org.r:r1:1.0.0"), vec![plain("org.s:s:1.0.0")]);
    repo.publish(coord("org.r:r2:1.0.0"), vec![plain("org.s:s:1.0.0")]);
    repo.publish(coord("org.s:s:1.0.0"), vec![plain("org.t:t:1.0.0")]);
    repo.publish(coord("org.t:t:1.0.0"), vec![]);
    let (resolver, _) = resolver(MemoryStore::new(), repo);

    let ctx = WalkerContext::new();
    std::thread::scope(|scope| {
        let r1 = scope.spawn(|| {
            resolver
                .resolve_with_context(&ctx, &[coord("org.r:r1:1.0.0")])
                .unwrap()
        });
        let r2 = scope.spawn(|| {
            resolver
                .resolve_with_context(&ctx, &[coord("org.r:r2:1.0.0")])
                .unwrap()
        });

        let report1 = r1.join().unwrap();
        let report2 = r2.join().unwrap();
        assert!(report1.valid && report2.valid);
        assert!(report1.closure.contains(&coord("org.t:t:1.0.0")));
        assert!(report2.closure.contains(&coord("org.t:t:1.0.0")));
    });

    // r1, r2, s, t each loaded exactly once.
    assert_eq!(ctx.len(), 4);
}
