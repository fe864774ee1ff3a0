// src/lib.rs

//! Buildsync
//!
//! Compares the latest builds of two build tags (for example Rawhide and
//! ELN on the Fedora Koji hub) and classifies every package of a content set
//! into a sync state, which downstream tooling uses to decide what to
//! rebuild, retag or untag.
//!
//! # Architecture
//!
//! - Build sources: a hub tag with either a bulk cache or live lookups
//! - Override lists: placeholder and no-sync packages win over versions
//! - Version comparison: rpm label comparison with epoch and dist tag ignored
//! - Comparison engine: memoized per-package classification, extras, counts
//! - Reports: JSON, plain text and per-status package lists

pub mod build;
pub mod compare;
pub mod config;
pub mod content;
mod error;
pub mod overrides;
pub mod report;
pub mod source;
pub mod version;

pub use build::BuildRecord;
pub use compare::{Classification, Comparison, Results, Status, StatusCounts, StatusEntry};
pub use config::{Config, SourceSection};
pub use content::{ContentResolver, PackageListProvider, StaticPackageList};
pub use error::{Error, Result};
pub use overrides::OverrideLists;
pub use report::{Report, ReportFormat};
pub use source::{BuildBackend, BuildSource, DistroView, KojiClient, SourceScope};
pub use version::{compare_builds, rpmvercmp, Evr};
