// src/build.rs

//! Build records as returned by the build hub

use serde::{Deserialize, Serialize};

/// The latest build of one package in a tag
///
/// Field names follow the hub's `listTagged` build maps so records can be
/// deserialized straight from a response. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Source package name
    pub name: String,
    /// Name-version-release identifier, e.g. `bash-5.2.26-3.fc40`
    pub nvr: String,
    pub version: String,
    pub release: String,
    /// Package the build is tagged under (usually equal to `name`)
    #[serde(default)]
    pub package_name: String,
    /// SCM locator the build was made from
    #[serde(default, rename = "source", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<i64>,
}

impl BuildRecord {
    /// Build a record from name, version and release
    pub fn new(name: &str, version: &str, release: &str) -> Self {
        Self {
            name: name.to_string(),
            nvr: format!("{name}-{version}-{release}"),
            version: version.to_string(),
            release: release.to_string(),
            package_name: name.to_string(),
            source_url: None,
            epoch: None,
            build_id: None,
        }
    }

    /// Key the record is cached under
    pub fn package(&self) -> &str {
        if self.package_name.is_empty() {
            &self.name
        } else {
            &self.package_name
        }
    }
}
