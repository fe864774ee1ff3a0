// tests/compare.rs

//! Comparison engine tests: classification, memoization, overrides, extras,
//! failure handling and aggregates.

mod common;

use buildsync::{
    Classification, Comparison, Error, OverrideLists, PackageListProvider, Status,
    StaticPackageList,
};
use common::{cached_source, live_source, names, standard_backend, FakeBackend};
use std::sync::Arc;

const CONTENT: &[&str] = &["bash", "curl", "vim", "zsh", "grep"];

fn live_comparison(backend: &Arc<FakeBackend>, overrides: OverrideLists) -> Comparison {
    Comparison::new(
        live_source("rawhide", backend, "rawhide"),
        live_source("eln", backend, "eln"),
        overrides,
        names(CONTENT),
    )
}

fn cached_comparison(backend: &Arc<FakeBackend>, content: &[&str]) -> Comparison {
    Comparison::new(
        cached_source("rawhide", backend, "rawhide"),
        cached_source("eln", backend, "eln"),
        OverrideLists::default(),
        names(content),
    )
}

fn status_of(comparison: &Comparison, package: &str) -> Status {
    comparison.results().get(package).unwrap().status
}

#[test]
fn test_classify_all_covers_every_version_relation() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(&backend, OverrideLists::default());

    let results = comparison.classify_all().unwrap();
    assert_eq!(results.len(), CONTENT.len());

    assert_eq!(
        results.get("bash").unwrap(),
        &Classification::new(
            Status::Same,
            Some("bash-5.2.26-1.fc40".to_string()),
            Some("bash-5.2.26-1.eln136".to_string()),
        )
    );
    assert_eq!(results.get("curl").unwrap().status, Status::Old);
    assert_eq!(results.get("vim").unwrap().status, Status::New);

    let zsh = results.get("zsh").unwrap();
    assert_eq!(zsh.status, Status::None);
    assert_eq!(zsh.nvr1.as_deref(), Some("zsh-5.9-4.fc40"));
    assert_eq!(zsh.nvr2, None);

    let grep = results.get("grep").unwrap();
    assert_eq!(grep.status, Status::Error);
    assert_eq!(grep.nvr1, None);
    assert_eq!(grep.nvr2.as_deref(), Some("grep-3.11-3.eln136"));
}

#[test]
fn test_results_keep_classification_order() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(
        &backend,
        OverrideLists::new(names(&["shim"]), Vec::new()),
    );

    let results = comparison.classify_all().unwrap();
    let order: Vec<&str> = results.iter().map(|(package, _)| package).collect();
    assert_eq!(order, vec!["shim", "bash", "curl", "vim", "zsh", "grep"]);
}

#[test]
fn test_classify_is_memoized() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(&backend, OverrideLists::default());

    let first = comparison.classify("curl").unwrap();
    let calls = backend.lookup_calls();
    assert_eq!(calls, 2);

    let second = comparison.classify("curl").unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.lookup_calls(), calls);
    assert_eq!(comparison.results().len(), 1);
}

#[test]
fn test_classify_all_twice_makes_no_new_lookups() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(&backend, OverrideLists::default());

    let first = comparison.classify_all().unwrap();
    let calls = backend.total_calls();
    let second = comparison.classify_all().unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.total_calls(), calls);
}

#[test]
fn test_placeholder_beats_nosync_and_content() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(
        &backend,
        OverrideLists::new(names(&["vim"]), names(&["vim", "curl"])),
    );

    comparison.classify_all().unwrap();
    assert_eq!(status_of(&comparison, "vim"), Status::Pplace);
    assert_eq!(status_of(&comparison, "curl"), Status::Nosync);
    assert_eq!(status_of(&comparison, "bash"), Status::Same);

    // Override records still carry whatever builds exist
    let vim = comparison.results().get("vim").cloned().unwrap();
    assert_eq!(vim.nvr1.as_deref(), Some("vim-9.1.0-1.fc40"));
    assert_eq!(vim.nvr2.as_deref(), Some("vim-9.1.100-1.eln136"));
}

#[test]
fn test_concurrent_classify_of_one_package_stores_one_record() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(&backend, OverrideLists::default());

    let records: Vec<Classification> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| scope.spawn(|| comparison.classify("bash").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(records.iter().all(|record| record == &records[0]));
    assert_eq!(records[0].status, Status::Same);
    assert_eq!(comparison.results().len(), 1);
    assert_eq!(comparison.count_by_status().total(), 1);
}

#[test]
fn test_explicit_packages_keep_view_placeholders() {
    let backend = Arc::new(standard_backend());
    let view = StaticPackageList::new(names(CONTENT), names(&["vim", "shim"]));
    let provider =
        StaticPackageList::with_placeholders_from(names(&["vim", "bash"]), &view).unwrap();

    let comparison = Comparison::new(
        live_source("rawhide", &backend, "rawhide"),
        live_source("eln", &backend, "eln"),
        OverrideLists::new(provider.placeholders().unwrap(), Vec::new()),
        provider.content().unwrap(),
    );
    let results = comparison.classify_all().unwrap();

    assert_eq!(results.get("vim").unwrap().status, Status::Pplace);
    assert_eq!(results.get("shim").unwrap().status, Status::Pplace);
    assert_eq!(results.get("bash").unwrap().status, Status::Same);
    assert!(!results.contains("curl"));
}

#[test]
fn test_nosync_package_missing_everywhere() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(&backend, OverrideLists::new(Vec::new(), names(&["ghost"])));

    let record = comparison.classify("ghost").unwrap();
    assert_eq!(record, Classification::new(Status::Nosync, None, None));
}

#[test]
fn test_package_outside_content_is_still_classified() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(&backend, OverrideLists::default());

    let record = comparison.classify("podman").unwrap();
    assert_eq!(record.status, Status::Error);
    assert!(comparison.results().contains("podman"));
}

#[test]
fn test_cached_sources_make_no_single_lookups() {
    let backend = Arc::new(standard_backend());
    let comparison = cached_comparison(&backend, CONTENT);
    assert_eq!(backend.list_calls(), 2);

    comparison.classify_all().unwrap();
    assert_eq!(backend.lookup_calls(), 0);
    assert_eq!(status_of(&comparison, "curl"), Status::Old);
}

#[test]
fn test_detect_extras_finds_target_only_packages() {
    let backend = Arc::new(standard_backend());
    let comparison = cached_comparison(&backend, CONTENT);
    comparison.classify_all().unwrap();

    let extras = comparison.detect_extras().unwrap();
    let extra_names: Vec<&str> = extras.keys().map(String::as_str).collect();
    assert_eq!(extra_names, vec!["podman"]);

    let podman = comparison.results().get("podman").cloned().unwrap();
    assert_eq!(
        podman,
        Classification::new(Status::Extra, None, Some("podman-5.0.0-1.eln136".to_string()))
    );
    // Content packages keep their mainline status
    assert_eq!(status_of(&comparison, "grep"), Status::Error);
    assert_eq!(comparison.results().len(), CONTENT.len() + 1);
}

#[test]
fn test_detect_extras_does_not_overwrite_existing_records() {
    let backend = Arc::new(standard_backend());
    let comparison = cached_comparison(&backend, &["curl"]);

    // bash is outside the content set but already classified
    comparison.classify("bash").unwrap();
    let extras = comparison.detect_extras().unwrap();

    assert!(extras.contains_key("bash"));
    assert!(extras.contains_key("grep"));
    assert!(!extras.contains_key("curl"));
    assert_eq!(status_of(&comparison, "bash"), Status::Same);
    assert_eq!(status_of(&comparison, "grep"), Status::Extra);
}

#[test]
fn test_detect_extras_skips_placeholders() {
    let backend = Arc::new(standard_backend());
    let comparison = Comparison::new(
        cached_source("rawhide", &backend, "rawhide"),
        cached_source("eln", &backend, "eln"),
        OverrideLists::new(names(&["podman"]), Vec::new()),
        names(CONTENT),
    );

    comparison.classify_all().unwrap();
    let extras = comparison.detect_extras().unwrap();
    assert!(extras.is_empty());
    assert_eq!(status_of(&comparison, "podman"), Status::Pplace);
}

#[test]
fn test_detect_extras_requires_cached_target() {
    let backend = Arc::new(standard_backend());
    let comparison = Comparison::new(
        cached_source("rawhide", &backend, "rawhide"),
        live_source("eln", &backend, "eln"),
        OverrideLists::default(),
        names(CONTENT),
    );
    comparison.classify_all().unwrap();
    let before = comparison.results();

    let err = comparison.detect_extras().unwrap_err();
    assert!(matches!(err, Error::UnsupportedExtrasMode(ref id) if id == "eln"));
    assert_eq!(comparison.results(), before);
}

#[test]
fn test_lookup_failure_names_package_and_keeps_partial_results() {
    let backend = Arc::new(standard_backend().failing("vim"));
    let comparison = live_comparison(&backend, OverrideLists::default());

    let err = comparison.classify_all().unwrap_err();
    match err {
        Error::Classify { package, source } => {
            assert_eq!(package, "vim");
            assert!(matches!(*source, Error::BackendUnavailable { .. }));
        }
        other => panic!("expected a classify error, got {other:?}"),
    }

    let results = comparison.results();
    assert!(results.contains("bash"));
    assert!(results.contains("curl"));
    assert!(!results.contains("vim"));
    assert!(!results.contains("zsh"));
}

#[test]
fn test_parallel_matches_sequential() {
    let backend = Arc::new(standard_backend());
    let overrides = OverrideLists::new(names(&["shim"]), names(&["curl"]));

    let sequential = live_comparison(&backend, overrides.clone());
    let parallel = live_comparison(&backend, overrides).with_parallel(true);

    assert_eq!(
        parallel.classify_all().unwrap(),
        sequential.classify_all().unwrap()
    );
}

#[test]
fn test_parallel_failure_keeps_records_before_failing_package() {
    let backend = Arc::new(standard_backend().failing("vim"));
    let comparison = live_comparison(&backend, OverrideLists::default()).with_parallel(true);

    let err = comparison.classify_all().unwrap_err();
    assert!(matches!(err, Error::Classify { ref package, .. } if package == "vim"));

    let order: Vec<String> = comparison
        .results()
        .iter()
        .map(|(package, _)| package.to_string())
        .collect();
    assert_eq!(order, vec!["bash", "curl"]);
}

#[test]
fn test_duplicate_content_is_classified_once() {
    let backend = Arc::new(standard_backend());
    let comparison = Comparison::new(
        live_source("rawhide", &backend, "rawhide"),
        live_source("eln", &backend, "eln"),
        OverrideLists::default(),
        names(&["bash", "bash", "zsh"]),
    );

    assert_eq!(comparison.content(), &names(&["bash", "zsh"])[..]);
    assert_eq!(comparison.classify_all().unwrap().len(), 2);
}

#[test]
fn test_counts_total_matches_results() {
    let backend = Arc::new(standard_backend());
    let comparison = Comparison::new(
        cached_source("rawhide", &backend, "rawhide"),
        cached_source("eln", &backend, "eln"),
        OverrideLists::new(names(&["shim"]), names(&["curl"])),
        names(CONTENT),
    );
    comparison.classify_all().unwrap();
    comparison.detect_extras().unwrap();

    let stats = comparison.count_by_status();
    assert_eq!(stats.total(), comparison.results().len());
    assert_eq!(stats.get(Status::Pplace), 1);
    assert_eq!(stats.get(Status::Nosync), 1);
    assert_eq!(stats.get(Status::Extra), 1);

    let mstats = comparison.count_mainline();
    assert_eq!(mstats.get(Status::Pplace), 0);
    assert_eq!(mstats.get(Status::Extra), 0);
    // bash SAME, vim NEW, zsh NONE, grep ERROR
    assert_eq!(mstats.total(), 4);
}

#[test]
fn test_grouped_by_status_follows_severity() {
    let backend = Arc::new(standard_backend());
    let comparison = live_comparison(
        &backend,
        OverrideLists::new(names(&["shim"]), Vec::new()),
    );
    comparison.classify_all().unwrap();

    let groups = comparison.grouped_by_status();
    let statuses: Vec<Status> = groups.keys().copied().collect();
    assert_eq!(
        statuses,
        vec![
            Status::Pplace,
            Status::Error,
            Status::New,
            Status::Same,
            Status::Old,
            Status::None
        ]
    );
    assert_eq!(groups[&Status::None][0].package, "zsh");
    assert_eq!(groups[&Status::Old][0].nvr1.as_deref(), Some("curl-8.6.0-2.fc40"));
}

#[test]
fn test_secondary_tag_overlays_newer_builds() {
    use buildsync::{BuildBackend, BuildSource, SourceScope};

    let backend = Arc::new(
        FakeBackend::new()
            .tag("c9s-gate", vec![common::build("bash", "5.1.8", "6.el9")])
            .tag(
                "c9s-pending",
                vec![
                    common::build("bash", "5.1.8", "9.el9"),
                    common::build("zsh", "5.8", "9.el9"),
                ],
            ),
    );
    let dyn_backend: Arc<dyn BuildBackend> = backend.clone();
    let mut source = BuildSource::new(
        "stream",
        dyn_backend,
        SourceScope::new("c9s-gate").with_secondary("c9s-pending"),
    );
    source.build_cache().unwrap();

    assert_eq!(source.get_build("bash").unwrap().unwrap().nvr, "bash-5.1.8-9.el9");
    assert_eq!(source.get_build("zsh").unwrap().unwrap().nvr, "zsh-5.8-9.el9");
    assert_eq!(backend.list_calls(), 2);
    assert!(matches!(source.build_cache(), Err(Error::CacheAlreadyBuilt(_))));
}
