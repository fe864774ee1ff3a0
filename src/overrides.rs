// src/overrides.rs

//! Package lists that override the version comparison
//!
//! Placeholder packages are pre-populated in the target and never rebuilt;
//! no-sync packages are deliberately kept apart from the reference source.

use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a newline-delimited package list
///
/// Blank lines and `#` comments are skipped, surrounding whitespace trimmed.
pub fn parse_package_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a package list file, see [`parse_package_list`]
pub fn read_package_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let packages = parse_package_list(&text);
    debug!("Read {} packages from {}", packages.len(), path.display());
    Ok(packages)
}

/// Placeholder and no-sync package sets
#[derive(Debug, Clone, Default)]
pub struct OverrideLists {
    placeholders: Vec<String>,
    placeholder_set: HashSet<String>,
    nosync: HashSet<String>,
}

impl OverrideLists {
    /// Build the lists, dropping duplicate placeholders but keeping first-seen order
    pub fn new<P, N>(placeholders: P, nosync: N) -> Self
    where
        P: IntoIterator<Item = String>,
        N: IntoIterator<Item = String>,
    {
        let mut lists = Self {
            nosync: nosync.into_iter().collect(),
            ..Default::default()
        };
        lists.merge_placeholders(placeholders);
        lists
    }

    /// Union more placeholder packages into the list (e.g. another arch's list)
    pub fn merge_placeholders<P>(&mut self, placeholders: P)
    where
        P: IntoIterator<Item = String>,
    {
        for package in placeholders {
            if self.placeholder_set.insert(package.clone()) {
                debug!("Placeholder {} put on list", package);
                self.placeholders.push(package);
            }
        }
    }

    /// Placeholder packages in first-seen order
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn is_placeholder(&self, package: &str) -> bool {
        self.placeholder_set.contains(package)
    }

    pub fn is_nosync(&self, package: &str) -> bool {
        self.nosync.contains(package)
    }

    pub fn nosync_len(&self) -> usize {
        self.nosync.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_package_list() {
        let text = "bash\n\n  zsh  \n# comment\nvim # editor\n";
        assert_eq!(parse_package_list(text), strings(&["bash", "zsh", "vim"]));
    }

    #[test]
    fn test_read_package_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "shim\ngrub2").unwrap();
        assert_eq!(read_package_list(file.path()).unwrap(), strings(&["shim", "grub2"]));
    }

    #[test]
    fn test_read_missing_list_fails() {
        assert!(read_package_list(Path::new("/nonexistent/nosync.txt")).is_err());
    }

    #[test]
    fn test_placeholders_are_unioned_in_order() {
        let mut lists = OverrideLists::new(strings(&["b", "a"]), strings(&["x"]));
        lists.merge_placeholders(strings(&["a", "c"]));

        assert_eq!(lists.placeholders(), strings(&["b", "a", "c"]).as_slice());
        assert!(lists.is_placeholder("c"));
        assert!(!lists.is_placeholder("x"));
        assert!(lists.is_nosync("x"));
        assert_eq!(lists.nosync_len(), 1);
    }
}
