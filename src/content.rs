// src/content.rs

//! Content resolver client
//!
//! The content resolver publishes, per view and architecture, the source
//! packages a distribution wants and the placeholder packages it carries.
//! Lists for all architectures are merged (union) into one set.

use crate::error::{Error, Result};
use crate::overrides::parse_package_list;
use reqwest::blocking::Client;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tracing::debug;

/// Default timeout for content resolver requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Architectures the content resolver publishes lists for
pub const DEFAULT_ARCHES: &[&str] = &["aarch64", "ppc64le", "s390x", "x86_64"];

/// Package list kinds merged into the content set
const CONTENT_KINDS: &[&str] = &["source", "buildroot-source"];

/// Supplies the package names a comparison runs over
pub trait PackageListProvider {
    /// Target content: the merged package set, sorted by name
    fn content(&self) -> Result<Vec<String>>;

    /// Placeholder packages, merged across architectures in first-seen order
    fn placeholders(&self) -> Result<Vec<String>>;
}

/// HTTP client for one content resolver view
pub struct ContentResolver {
    client: Client,
    base_url: String,
    view: String,
    arches: Vec<String>,
    exclude: HashSet<String>,
}

impl ContentResolver {
    /// Create a client for `view` published under `base_url`
    pub fn new(base_url: &str, view: &str, arches: &[String]) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            view: view.to_string(),
            arches: arches.to_vec(),
            exclude: HashSet::new(),
        })
    }

    /// Packages never to include in the content set
    pub fn with_exclude<I>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.exclude = exclude.into_iter().collect();
        self
    }

    /// URL of a plain-text package name list
    pub fn list_url(&self, kind: &str, arch: &str) -> String {
        format!(
            "{}/view-{}-package-name-list--view-{}--{}.txt",
            self.base_url, kind, self.view, arch
        )
    }

    /// URL of the placeholder details document
    pub fn placeholder_url(&self, arch: &str) -> String {
        format!(
            "{}/view-placeholder-srpm-details--view-{}--{}.json",
            self.base_url, self.view, arch
        )
    }

    fn fetch(&self, url: &str) -> Result<String> {
        debug!("Downloading {}", url);
        let fetch_error = |reason: String| Error::ContentFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        response.text().map_err(|e| fetch_error(e.to_string()))
    }
}

impl PackageListProvider for ContentResolver {
    fn content(&self) -> Result<Vec<String>> {
        let mut merged = BTreeSet::new();
        for arch in &self.arches {
            for kind in CONTENT_KINDS {
                let text = self.fetch(&self.list_url(kind, arch))?;
                merge_content(&mut merged, &text, &self.exclude);
            }
        }

        debug!("Found a total of {} packages", merged.len());
        Ok(merged.into_iter().collect())
    }

    fn placeholders(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut placeholders = Vec::new();
        for arch in &self.arches {
            let text = self.fetch(&self.placeholder_url(arch))?;
            for package in parse_placeholders(&text)? {
                if seen.insert(package.clone()) {
                    placeholders.push(package);
                }
            }
        }
        Ok(placeholders)
    }
}

/// Merge one downloaded list into `merged`, skipping excluded packages
fn merge_content(merged: &mut BTreeSet<String>, text: &str, exclude: &HashSet<String>) {
    merged.extend(
        parse_package_list(text)
            .into_iter()
            .filter(|package| !exclude.contains(package)),
    );
}

/// Source package names from a placeholder details document
///
/// The document is a JSON object keyed by source package name; names come
/// back in document order.
fn parse_placeholders(text: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().map(|(name, _)| name).collect()),
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()),
        _ => Err(Error::Protocol(
            "placeholder details are neither an object nor a list".to_string(),
        )),
    }
}

/// Provider for an explicit package list given by the caller
///
/// Used when packages are named on the command line. Placeholders still
/// come from the source's distro view, see
/// [`with_placeholders_from`](Self::with_placeholders_from).
pub struct StaticPackageList {
    packages: Vec<String>,
    placeholders: Vec<String>,
}

impl StaticPackageList {
    pub fn new(packages: Vec<String>, placeholders: Vec<String>) -> Self {
        Self {
            packages,
            placeholders,
        }
    }

    /// Use `packages` as the content set, keeping the placeholders `provider` reports
    pub fn with_placeholders_from(
        packages: Vec<String>,
        provider: &dyn PackageListProvider,
    ) -> Result<Self> {
        Ok(Self::new(packages, provider.placeholders()?))
    }
}

impl PackageListProvider for StaticPackageList {
    fn content(&self) -> Result<Vec<String>> {
        Ok(self.packages.clone())
    }

    fn placeholders(&self) -> Result<Vec<String>> {
        Ok(self.placeholders.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ContentResolver {
        let arches: Vec<String> = DEFAULT_ARCHES.iter().map(|a| a.to_string()).collect();
        ContentResolver::new("https://tiny.distro.builders/", "eln", &arches).unwrap()
    }

    #[test]
    fn test_list_url() {
        assert_eq!(
            resolver().list_url("buildroot-source", "x86_64"),
            "https://tiny.distro.builders/view-buildroot-source-package-name-list--view-eln--x86_64.txt"
        );
    }

    #[test]
    fn test_placeholder_url() {
        assert_eq!(
            resolver().placeholder_url("s390x"),
            "https://tiny.distro.builders/view-placeholder-srpm-details--view-eln--s390x.json"
        );
    }

    #[test]
    fn test_merge_content_unions_and_excludes() {
        let exclude: HashSet<String> = ["kernel".to_string()].into_iter().collect();
        let mut merged = BTreeSet::new();
        merge_content(&mut merged, "zsh\nbash\nkernel\n", &exclude);
        merge_content(&mut merged, "bash\n\nvim\n", &exclude);

        let merged: Vec<String> = merged.into_iter().collect();
        assert_eq!(merged, vec!["bash", "vim", "zsh"]);
    }

    #[test]
    fn test_parse_placeholders_object() {
        let text = r#"{"shim": {"arch": "x86_64"}, "grub2": {"arch": "x86_64"}}"#;
        assert_eq!(parse_placeholders(text).unwrap(), vec!["shim", "grub2"]);
    }

    #[test]
    fn test_parse_placeholders_array() {
        let text = r#"["shim", 7, "grub2"]"#;
        assert_eq!(parse_placeholders(text).unwrap(), vec!["shim", "grub2"]);
    }

    #[test]
    fn test_parse_placeholders_rejects_scalar() {
        assert!(matches!(parse_placeholders("42"), Err(Error::Protocol(_))));
        assert!(matches!(parse_placeholders("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_static_list() {
        let provider = StaticPackageList::new(vec!["bash".to_string()], Vec::new());
        assert_eq!(provider.content().unwrap(), vec!["bash"]);
        assert!(provider.placeholders().unwrap().is_empty());
    }

    #[test]
    fn test_explicit_packages_keep_placeholders() {
        let view = StaticPackageList::new(
            vec!["bash".to_string(), "zsh".to_string()],
            vec!["shim".to_string(), "grub2".to_string()],
        );
        let provider =
            StaticPackageList::with_placeholders_from(vec!["shim".to_string()], &view).unwrap();

        assert_eq!(provider.content().unwrap(), vec!["shim"]);
        assert_eq!(provider.placeholders().unwrap(), vec!["shim", "grub2"]);
    }
}
