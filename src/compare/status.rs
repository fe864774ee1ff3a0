// src/compare/status.rs

//! Classification outcomes and their aggregates

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sync state of one package, ordered by severity for reporting
///
/// `New` and `Old` describe the first (reference) source relative to the
/// second: `New` means the target already carries a newer build, `Old` means
/// the target has to catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Pre-populated placeholder package
    Pplace,
    /// Deliberately not synced
    Nosync,
    /// Present only in the target, outside the content set
    Extra,
    /// Missing from the reference source
    Error,
    New,
    Same,
    Old,
    /// Missing from the target source, needs a build
    None,
}

impl Status {
    /// Every status in severity order
    pub const ALL: [Status; 8] = [
        Status::Pplace,
        Status::Nosync,
        Status::Extra,
        Status::Error,
        Status::New,
        Status::Same,
        Status::Old,
        Status::None,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Status::Pplace => "PPLACE",
            Status::Nosync => "NOSYNC",
            Status::Extra => "EXTRA",
            Status::Error => "ERROR",
            Status::New => "NEW",
            Status::Same => "SAME",
            Status::Old => "OLD",
            Status::None => "NONE",
        }
    }

    /// Statuses produced by actually comparing the two sources
    pub fn is_mainline(&self) -> bool {
        matches!(
            self,
            Status::Same | Status::New | Status::Old | Status::None | Status::Error
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid status: {s}"))
    }
}

/// Outcome of classifying one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: Status,
    /// NVR of the build in the reference source
    pub nvr1: Option<String>,
    /// NVR of the build in the target source
    pub nvr2: Option<String>,
}

impl Classification {
    pub fn new(status: Status, nvr1: Option<String>, nvr2: Option<String>) -> Self {
        Self { status, nvr1, nvr2 }
    }
}

/// One row of a status group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub package: String,
    pub nvr1: Option<String>,
    pub nvr2: Option<String>,
}

/// Per-status package counts plus their total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: BTreeMap<Status, usize>,
    total: usize,
}

impl StatusCounts {
    /// Count every status yielded by `statuses`
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Status>,
    {
        let mut counts = Self::default();
        for status in statuses {
            *counts.counts.entry(status).or_insert(0) += 1;
            counts.total += 1;
        }
        counts
    }

    /// Count for one status, zero if it never occurred
    pub fn get(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Statuses that occurred, in severity order
    pub fn iter(&self) -> impl Iterator<Item = (Status, usize)> + '_ {
        self.counts.iter().map(|(status, count)| (*status, *count))
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (status, count) in self.iter() {
            write!(f, "{status}: {count}, ")?;
        }
        write!(f, "total: {}", self.total)
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len() + 1))?;
        for (status, count) in &self.counts {
            map.serialize_entry(status.as_str(), count)?;
        }
        map.serialize_entry("total", &self.total)?;
        map.end()
    }
}
