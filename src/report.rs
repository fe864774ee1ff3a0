// src/report.rs

//! Rendering comparison results to files
//!
//! Produces a JSON document, a plain-text summary and the package lists the
//! rest of the pipeline consumes (one entry per line):
//! - `content.txt`: the compared content set
//! - `untag.txt`: target NVRs of `EXTRA` packages
//! - `rebuild.txt`: reference NVRs of `NONE` and `OLD` packages
//! - `ftbfs.txt`: names of `NONE` packages

use crate::compare::{Comparison, Results, Status, StatusCounts, StatusEntry};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Output document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportFormat {
    Json,
    Txt,
}

impl ReportFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Txt => "txt",
        }
    }

    /// Parse a comma-separated format list; `all` selects every format
    pub fn parse_list(s: &str) -> Result<Vec<ReportFormat>> {
        let mut formats = Vec::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            if item == "all" {
                return Ok(vec![ReportFormat::Json, ReportFormat::Txt]);
            }
            let format: ReportFormat = item.parse().map_err(Error::Config)?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(ReportFormat::Json),
            "txt" => Ok(ReportFormat::Txt),
            _ => Err(format!("Invalid report format: {s}")),
        }
    }
}

/// Everything a report shows, captured once from a finished comparison
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub product1: String,
    pub product2: String,
    pub date: DateTime<Utc>,
    pub stats: StatusCounts,
    pub mstats: StatusCounts,
    pub results: Results,
    #[serde(skip)]
    pub groups: BTreeMap<Status, Vec<StatusEntry>>,
    #[serde(skip)]
    pub content: Vec<String>,
}

impl Report {
    pub fn from_comparison(comparison: &Comparison) -> Self {
        Self {
            product1: comparison.source1().product().to_string(),
            product2: comparison.source2().product().to_string(),
            date: Utc::now(),
            stats: comparison.count_by_status(),
            mstats: comparison.count_mainline(),
            results: comparison.results(),
            groups: comparison.grouped_by_status(),
            content: comparison.content().to_vec(),
        }
    }

    fn group(&self, status: Status) -> &[StatusEntry] {
        self.groups.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn untag_list(&self) -> Vec<String> {
        self.group(Status::Extra)
            .iter()
            .filter_map(|entry| entry.nvr2.clone())
            .collect()
    }

    pub fn rebuild_list(&self) -> Vec<String> {
        self.group(Status::None)
            .iter()
            .chain(self.group(Status::Old))
            .filter_map(|entry| entry.nvr1.clone())
            .collect()
    }

    pub fn ftbfs_list(&self) -> Vec<String> {
        self.group(Status::None)
            .iter()
            .map(|entry| entry.package.clone())
            .collect()
    }

    /// Plain-text rendering: counts, then one line per package by status
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} vs {}\n", self.product1, self.product2));
        out.push_str(&format!("Generated {}\n\n", self.date.format("%Y-%m-%d %H:%M UTC")));
        for (status, count) in self.stats.iter() {
            out.push_str(&format!("{status:<8}{count:>8}\n"));
        }
        out.push_str(&format!("{:<8}{:>8}\n", "total", self.stats.total()));

        for (status, entries) in &self.groups {
            out.push_str(&format!("\n[{status}]\n"));
            for entry in entries {
                out.push_str(&format!(
                    "{} {} {}\n",
                    entry.package,
                    entry.nvr1.as_deref().unwrap_or("-"),
                    entry.nvr2.as_deref().unwrap_or("-")
                ));
            }
        }
        out
    }

    /// Write the selected formats and the package lists into `dir`
    ///
    /// Returns the paths written.
    pub fn write(&self, dir: &Path, formats: &[ReportFormat]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for format in formats {
            let (name, body) = match format {
                ReportFormat::Json => ("results.json", serde_json::to_string_pretty(self)?),
                ReportFormat::Txt => ("summary.txt", self.render_text()),
            };
            written.push(write_file(dir, name, &body)?);
        }

        written.push(write_list(dir, "content.txt", &self.content)?);
        written.push(write_list(dir, "untag.txt", &self.untag_list())?);
        written.push(write_list(dir, "rebuild.txt", &self.rebuild_list())?);
        written.push(write_list(dir, "ftbfs.txt", &self.ftbfs_list())?);

        info!("Wrote {} report files to {}", written.len(), dir.display());
        Ok(written)
    }
}

fn write_file(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    Ok(path)
}

fn write_list(dir: &Path, name: &str, items: &[String]) -> Result<PathBuf> {
    let mut body = String::new();
    for item in items {
        body.push_str(item);
        body.push('\n');
    }
    write_file(dir, name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_list() {
        assert_eq!(
            ReportFormat::parse_list("txt, json,txt").unwrap(),
            vec![ReportFormat::Txt, ReportFormat::Json]
        );
        assert_eq!(ReportFormat::parse_list("all").unwrap().len(), 2);
        assert!(ReportFormat::parse_list("html").is_err());
    }

    #[test]
    fn test_format_as_str() {
        assert_eq!(ReportFormat::Json.as_str(), "json");
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Txt);
    }
}
