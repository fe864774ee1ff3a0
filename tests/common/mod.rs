// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use buildsync::{BuildBackend, BuildRecord, BuildSource, Error, Result, SourceScope};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory build hub with per-tag builds and call counters.
#[derive(Default)]
pub struct FakeBackend {
    tags: HashMap<String, Vec<BuildRecord>>,
    failing: HashSet<String>,
    list_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the latest builds of `tag`.
    pub fn tag(mut self, tag: &str, builds: Vec<BuildRecord>) -> Self {
        self.tags.insert(tag.to_string(), builds);
        self
    }

    /// Make single lookups of `package` fail like a dropped connection.
    pub fn failing(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.lookup_calls()
    }
}

impl BuildBackend for FakeBackend {
    fn list_latest_builds(&self, tag: &str) -> Result<Vec<BuildRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tags.get(tag).cloned().unwrap_or_default())
    }

    fn get_latest_build(&self, tag: &str, package: &str) -> Result<Option<BuildRecord>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(package) {
            return Err(Error::Protocol(format!("connection reset while fetching {package}")));
        }
        Ok(self
            .tags
            .get(tag)
            .and_then(|builds| builds.iter().find(|b| b.package() == package).cloned()))
    }

    fn first_inherited_tag(&self, tag: &str) -> Result<String> {
        Ok(format!("{tag}-parent"))
    }
}

/// Shorthand for a build record.
pub fn build(name: &str, version: &str, release: &str) -> BuildRecord {
    BuildRecord::new(name, version, release)
}

/// A live-mode source reading `tag` from `backend`.
pub fn live_source(id: &str, backend: &Arc<FakeBackend>, tag: &str) -> BuildSource {
    let backend: Arc<dyn BuildBackend> = backend.clone();
    BuildSource::new(id, backend, SourceScope::new(tag)).with_product(&id.to_uppercase())
}

/// A source whose cache was filled from one bulk listing of `tag`.
pub fn cached_source(id: &str, backend: &Arc<FakeBackend>, tag: &str) -> BuildSource {
    let mut source = live_source(id, backend, tag);
    source.build_cache().unwrap();
    source
}

/// Owned package names from string literals.
pub fn names(packages: &[&str]) -> Vec<String> {
    packages.iter().map(|p| p.to_string()).collect()
}

/// The standard two-tag fixture: a reference tag and a target tag with
/// one package in every version relation.
///
/// - `bash`: same version (only the dist tag differs)
/// - `curl`: target is older than the reference
/// - `vim`: target is newer than the reference
/// - `zsh`: only in the reference
/// - `grep`: only in the target
/// - `podman`: only in the target, outside any content set used in tests
pub fn standard_backend() -> FakeBackend {
    FakeBackend::new()
        .tag(
            "rawhide",
            vec![
                build("bash", "5.2.26", "1.fc40"),
                build("curl", "8.6.0", "2.fc40"),
                build("vim", "9.1.0", "1.fc40"),
                build("zsh", "5.9", "4.fc40"),
            ],
        )
        .tag(
            "eln",
            vec![
                build("bash", "5.2.26", "1.eln136"),
                build("curl", "8.5.0", "1.eln136"),
                build("vim", "9.1.100", "1.eln136"),
                build("grep", "3.11", "3.eln136"),
                build("podman", "5.0.0", "1.eln136"),
            ],
        )
}
