// src/compare/mod.rs

//! Comparison engine
//!
//! Classifies every package of a content set by looking up its latest build
//! in a reference source and a target source. Override lists win over the
//! version comparison, and a missing reference build is reported as data
//! (`ERROR`) rather than failing the run.
//!
//! Results are memoized per package name: once a package is classified its
//! record never changes, and later lookups do not touch the build hub.

mod status;

pub use status::{Classification, Status, StatusCounts, StatusEntry};

use crate::build::BuildRecord;
use crate::error::{Error, Result};
use crate::overrides::OverrideLists;
use crate::source::BuildSource;
use crate::version::Evr;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Classification results in the order packages were classified
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    order: Vec<String>,
    records: HashMap<String, Classification>,
}

impl Results {
    pub fn get(&self, package: &str) -> Option<&Classification> {
        self.records.get(package)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.records.contains_key(package)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Classification)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.records.get(name).map(|record| (name.as_str(), record)))
    }

    /// Store `record` unless the package already has one; returns the stored record
    fn insert_if_absent(&mut self, package: &str, record: Classification) -> Classification {
        if let Some(existing) = self.records.get(package) {
            return existing.clone();
        }
        self.order.push(package.to_string());
        self.records.insert(package.to_string(), record.clone());
        record
    }
}

impl Serialize for Results {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (package, record) in self.iter() {
            map.serialize_entry(package, record)?;
        }
        map.end()
    }
}

/// Everything a rule may look at
struct RuleInput<'a> {
    package: &'a str,
    overrides: &'a OverrideLists,
    build1: Option<&'a BuildRecord>,
    build2: Option<&'a BuildRecord>,
}

type Rule = fn(&RuleInput<'_>) -> Option<Status>;

/// Classification rules, first match wins
///
/// The override lists come first so they win even when builds are missing.
const RULES: &[(&str, Rule)] = &[
    ("placeholder", placeholder_rule),
    ("nosync", nosync_rule),
    ("missing reference build", missing_reference_rule),
    ("missing target build", missing_target_rule),
    ("version", version_rule),
];

fn placeholder_rule(input: &RuleInput<'_>) -> Option<Status> {
    input.overrides.is_placeholder(input.package).then_some(Status::Pplace)
}

fn nosync_rule(input: &RuleInput<'_>) -> Option<Status> {
    input.overrides.is_nosync(input.package).then_some(Status::Nosync)
}

fn missing_reference_rule(input: &RuleInput<'_>) -> Option<Status> {
    input.build1.is_none().then_some(Status::Error)
}

fn missing_target_rule(input: &RuleInput<'_>) -> Option<Status> {
    input.build2.is_none().then_some(Status::None)
}

fn version_rule(input: &RuleInput<'_>) -> Option<Status> {
    let evr1 = Evr::from_build(input.build1?);
    let evr2 = Evr::from_build(input.build2?);
    debug!("Package {}: comparing {} with {}", input.package, evr1, evr2);
    Some(match evr1.cmp(&evr2) {
        Ordering::Less => Status::New,
        Ordering::Equal => Status::Same,
        Ordering::Greater => Status::Old,
    })
}

fn evaluate_rules(input: &RuleInput<'_>) -> Status {
    for (name, rule) in RULES {
        if let Some(status) = rule(input) {
            debug!("Package {} matched rule '{}': {}", input.package, name, status);
            return status;
        }
    }
    // The version rule only declines when a build is missing
    Status::Error
}

/// Compares a reference source against a target source
pub struct Comparison {
    source1: BuildSource,
    source2: BuildSource,
    overrides: OverrideLists,
    content: Vec<String>,
    content_set: HashSet<String>,
    results: Mutex<Results>,
    parallel: bool,
}

impl Comparison {
    /// Set up a comparison of `content` between `source1` (reference) and
    /// `source2` (target)
    ///
    /// Duplicate names in `content` are dropped, keeping the first occurrence.
    pub fn new<I>(
        source1: BuildSource,
        source2: BuildSource,
        overrides: OverrideLists,
        content: I,
    ) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut content_set = HashSet::new();
        let content: Vec<String> = content
            .into_iter()
            .filter(|package| content_set.insert(package.clone()))
            .collect();

        Self {
            source1,
            source2,
            overrides,
            content,
            content_set,
            results: Mutex::new(Results::default()),
            parallel: false,
        }
    }

    /// Fetch uncached builds on the rayon pool during [`classify_all`](Self::classify_all)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn source1(&self) -> &BuildSource {
        &self.source1
    }

    pub fn source2(&self) -> &BuildSource {
        &self.source2
    }

    pub fn overrides(&self) -> &OverrideLists {
        &self.overrides
    }

    /// The content set, in the order it was given
    pub fn content(&self) -> &[String] {
        &self.content
    }

    /// Snapshot of everything classified so far
    pub fn results(&self) -> Results {
        self.results.lock().clone()
    }

    /// Classify one package, reusing an earlier result if there is one
    pub fn classify(&self, package: &str) -> Result<Classification> {
        if let Some(record) = self.results.lock().get(package) {
            return Ok(record.clone());
        }

        let record = self.evaluate(package)?;
        Ok(self.results.lock().insert_if_absent(package, record))
    }

    /// Look up both builds and run the rules, without touching the results
    fn evaluate(&self, package: &str) -> Result<Classification> {
        if !self.content_set.contains(package) {
            debug!("Package {} is not in the content set", package);
        }

        let build1 = self
            .source1
            .get_build(package)
            .map_err(|e| e.for_package(package))?;
        let build2 = self
            .source2
            .get_build(package)
            .map_err(|e| e.for_package(package))?;

        let status = evaluate_rules(&RuleInput {
            package,
            overrides: &self.overrides,
            build1: build1.as_ref(),
            build2: build2.as_ref(),
        });

        match status {
            Status::Error => warn!("Package {} not found in {}", package, self.source1),
            Status::None => debug!("Package {} not found in {}", package, self.source2),
            _ => {}
        }

        Ok(Classification::new(
            status,
            build1.map(|b| b.nvr),
            build2.map(|b| b.nvr),
        ))
    }

    /// Classify the placeholder packages, then the content set
    ///
    /// Placeholders go first so their `PPLACE` record is the one kept even
    /// when they are also part of the content. On a lookup failure the
    /// records classified before the failing package are kept.
    pub fn classify_all(&self) -> Result<Results> {
        let packages: Vec<&str> = self
            .overrides
            .placeholders()
            .iter()
            .chain(self.content.iter())
            .map(String::as_str)
            .collect();

        info!(
            "Comparing {} packages between {} and {}",
            packages.len(),
            self.source1,
            self.source2
        );

        let live = !self.source1.is_cached() || !self.source2.is_cached();
        if self.parallel && live {
            self.classify_parallel(&packages)?;
        } else {
            for package in packages {
                debug!("Processing package {}", package);
                self.classify(package)?;
            }
        }

        Ok(self.results())
    }

    fn classify_parallel(&self, packages: &[&str]) -> Result<()> {
        let pending: Vec<&str> = {
            let results = self.results.lock();
            let mut seen = HashSet::new();
            packages
                .iter()
                .copied()
                .filter(|package| !results.contains(package) && seen.insert(*package))
                .collect()
        };

        let evaluated: Vec<Result<Classification>> = pending
            .par_iter()
            .map(|package| self.evaluate(package))
            .collect();

        // Insert in the fixed order, stopping where a sequential run would have
        let mut results = self.results.lock();
        for (package, record) in pending.into_iter().zip(evaluated) {
            results.insert_if_absent(package, record?);
        }
        Ok(())
    }

    /// Record every target-only package outside the content set as `EXTRA`
    ///
    /// Needs a cached target source, since only a bulk listing can tell
    /// which builds exist there. Packages that already have a record keep it.
    /// Returns every extra package found, in name order.
    pub fn detect_extras(&self) -> Result<BTreeMap<String, Classification>> {
        let builds = self
            .source2
            .cached_builds()
            .ok_or_else(|| Error::UnsupportedExtrasMode(self.source2.id().to_string()))?;

        let mut extras = BTreeMap::new();
        for (package, build) in builds {
            if self.content_set.contains(package) || self.overrides.is_placeholder(package) {
                continue;
            }
            debug!("Extras package {} found in {}", package, self.source2);
            extras.insert(
                package.to_string(),
                Classification::new(Status::Extra, None, Some(build.nvr.clone())),
            );
        }

        let mut results = self.results.lock();
        for (package, record) in &extras {
            results.insert_if_absent(package, record.clone());
        }

        info!("Found {} extra packages in {}", extras.len(), self.source2);
        Ok(extras)
    }

    /// Count of every status plus the total number of records
    pub fn count_by_status(&self) -> StatusCounts {
        let results = self.results.lock();
        StatusCounts::tally(results.iter().map(|(_, record)| record.status))
    }

    /// Counts restricted to SAME, NEW, OLD, NONE and ERROR
    pub fn count_mainline(&self) -> StatusCounts {
        let results = self.results.lock();
        StatusCounts::tally(
            results
                .iter()
                .map(|(_, record)| record.status)
                .filter(Status::is_mainline),
        )
    }

    /// Records grouped by status, each group in classification order
    pub fn grouped_by_status(&self) -> BTreeMap<Status, Vec<StatusEntry>> {
        let results = self.results.lock();
        let mut groups: BTreeMap<Status, Vec<StatusEntry>> = BTreeMap::new();
        for (package, record) in results.iter() {
            groups.entry(record.status).or_default().push(StatusEntry {
                package: package.to_string(),
                nvr1: record.nvr1.clone(),
                nvr2: record.nvr2.clone(),
            });
        }
        groups
    }
}
