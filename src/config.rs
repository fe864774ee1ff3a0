// src/config.rs

//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [defaults] - Architectures and the location of the override lists
//! - [source.*] - Build sources: hub, tags, product name, content view
//!
//! Built-in sources (`rawhide`, `fedora`, `eln`, `stream`, `rhel`) are always
//! available; a `[source.<id>]` section with the same id replaces them.

use crate::content::DEFAULT_ARCHES;
use crate::error::{Error, Result};
use crate::overrides::read_package_list;
use crate::source::{BuildBackend, BuildSource, DistroView, KojiClient, SourceScope};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const FEDORA_HUB: &str = "https://koji.fedoraproject.org/kojihub";
const STREAM_HUB: &str = "https://kojihub.stream.rdu2.redhat.com/kojihub";
const BREW_HUB: &str = "https://brewhub.engineering.redhat.com/brewhub";
const TINY_DISTRO_BUILDERS: &str = "https://tiny.distro.builders";
const MINIMIZATION_LISTS: &str = "https://raw.githubusercontent.com/minimization/lists/main";

/// TOML configuration file structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Shared settings
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// Build sources by id
    #[serde(default)]
    pub source: BTreeMap<String, SourceSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsSection::default(),
            source: builtin_sources(),
        }
    }
}

/// Shared settings section
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsSection {
    /// Architectures whose content lists are merged
    #[serde(default = "default_arches")]
    pub arches: Vec<String>,

    /// Directory holding the override list files
    #[serde(default = "default_lists_dir")]
    pub lists_dir: PathBuf,

    /// File name of the no-sync list inside `lists_dir`
    #[serde(default = "default_nosync_list")]
    pub nosync_list: String,

    /// File name of the content exclude list inside `lists_dir`
    #[serde(default = "default_exclude_list")]
    pub exclude_list: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            arches: default_arches(),
            lists_dir: default_lists_dir(),
            nosync_list: default_nosync_list(),
            exclude_list: default_exclude_list(),
        }
    }
}

impl DefaultsSection {
    pub fn nosync_path(&self) -> PathBuf {
        self.lists_dir.join(&self.nosync_list)
    }

    pub fn exclude_path(&self) -> PathBuf {
        self.lists_dir.join(&self.exclude_list)
    }

    /// Read the no-sync list; a missing file means an empty list
    pub fn load_nosync(&self) -> Result<Vec<String>> {
        load_optional_list(&self.nosync_path())
    }

    /// Read the exclude list; a missing file means an empty list
    pub fn load_exclude(&self) -> Result<Vec<String>> {
        load_optional_list(&self.exclude_path())
    }
}

fn load_optional_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!("Package list {} not found, treating it as empty", path.display());
        return Ok(Vec::new());
    }
    read_package_list(path)
}

fn default_arches() -> Vec<String> {
    DEFAULT_ARCHES.iter().map(|arch| arch.to_string()).collect()
}

fn default_lists_dir() -> PathBuf {
    PathBuf::from("lists")
}

fn default_nosync_list() -> String {
    "nosync.txt".to_string()
}

fn default_exclude_list() -> String {
    "exclude.txt".to_string()
}

/// Build source section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceSection {
    /// Koji or Brew hub URL
    pub hub_url: String,

    /// Tag holding the source's latest builds
    #[serde(default)]
    pub tag: Option<String>,

    /// Resolve the tag as the first parent of this tag (used for Rawhide,
    /// whose build tag changes every release)
    #[serde(default)]
    pub inherit_from: Option<String>,

    /// Overlay tag whose newer builds replace the main tag's
    #[serde(default)]
    pub secondary_tag: Option<String>,

    /// Product name shown in reports (defaults to the source id)
    #[serde(default)]
    pub product: Option<String>,

    /// Content resolver base URL
    #[serde(default = "default_distro_url")]
    pub distro_url: String,

    /// Content resolver view
    #[serde(default = "default_distro_view")]
    pub distro_view: String,
}

fn default_distro_url() -> String {
    TINY_DISTRO_BUILDERS.to_string()
}

fn default_distro_view() -> String {
    "eln".to_string()
}

impl SourceSection {
    fn new(hub_url: &str, tag: &str, product: &str) -> Self {
        Self {
            hub_url: hub_url.to_string(),
            tag: Some(tag.to_string()),
            inherit_from: None,
            secondary_tag: None,
            product: Some(product.to_string()),
            distro_url: default_distro_url(),
            distro_view: default_distro_view(),
        }
    }

    fn validate(&self, id: &str) -> Result<()> {
        if self.tag.is_none() && self.inherit_from.is_none() {
            return Err(Error::Config(format!(
                "source '{id}' needs either 'tag' or 'inherit_from'"
            )));
        }
        Ok(())
    }

    /// Build a live-mode source on `backend`, resolving an inherited tag
    pub fn build_source(&self, id: &str, backend: Arc<dyn BuildBackend>) -> Result<BuildSource> {
        let tag = match (&self.tag, &self.inherit_from) {
            (Some(tag), _) => tag.clone(),
            (None, Some(parent)) => {
                let tag = backend.first_inherited_tag(parent)?;
                info!("Resolved {} tag through {} inheritance: {}", id, parent, tag);
                tag
            }
            (None, None) => {
                return Err(Error::Config(format!(
                    "source '{id}' needs either 'tag' or 'inherit_from'"
                )));
            }
        };

        let mut scope = SourceScope::new(&tag);
        if let Some(secondary) = &self.secondary_tag {
            scope = scope.with_secondary(secondary);
        }

        Ok(BuildSource::new(id, backend, scope)
            .with_product(self.product.as_deref().unwrap_or(id))
            .with_distro_view(DistroView {
                url: self.distro_url.clone(),
                view: self.distro_view.clone(),
            }))
    }

    /// Connect to the configured hub and build the source
    pub fn connect(&self, id: &str) -> Result<BuildSource> {
        debug!("Connecting source {} to {}", id, self.hub_url);
        let backend: Arc<dyn BuildBackend> = Arc::new(KojiClient::new(&self.hub_url)?);
        self.build_source(id, backend)
    }
}

/// Sources known without any configuration file
pub fn builtin_sources() -> BTreeMap<String, SourceSection> {
    let mut sources = BTreeMap::new();

    sources.insert(
        "rawhide".to_string(),
        SourceSection {
            tag: None,
            inherit_from: Some("rawhide".to_string()),
            ..SourceSection::new(FEDORA_HUB, "rawhide", "Rawhide")
        },
    );
    sources.insert(
        "fedora".to_string(),
        SourceSection::new(FEDORA_HUB, "f34-cr-eln", "Fedora34"),
    );
    sources.insert("eln".to_string(), SourceSection::new(FEDORA_HUB, "eln", "ELN"));
    sources.insert(
        "stream".to_string(),
        SourceSection {
            secondary_tag: Some("c9s-pending".to_string()),
            distro_url: MINIMIZATION_LISTS.to_string(),
            distro_view: "c9s".to_string(),
            ..SourceSection::new(STREAM_HUB, "c9s-gate", "Stream9")
        },
    );
    sources.insert(
        "rhel".to_string(),
        SourceSection {
            secondary_tag: Some("rhel-9.0.0-beta-candidate".to_string()),
            distro_url: MINIMIZATION_LISTS.to_string(),
            distro_view: "c9s".to_string(),
            ..SourceSection::new(BREW_HUB, "rhel-9.0.0-alpha-candidate", "RHEL9")
        },
    );

    sources
}

impl Config {
    /// Parse a configuration document, layering its sources over the built-ins
    pub fn parse(text: &str) -> Result<Self> {
        let parsed: Config = toml::from_str(text)?;
        let mut source = builtin_sources();
        for (id, section) in parsed.source {
            section.validate(&id)?;
            source.insert(id, section);
        }

        Ok(Self {
            defaults: parsed.defaults,
            source,
        })
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Load `path` if given, otherwise use the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Look up a source section by id
    pub fn source(&self, id: &str) -> Result<&SourceSection> {
        self.source
            .get(id)
            .ok_or_else(|| Error::UnknownSource(id.to_string()))
    }

    /// Ids of every known source
    pub fn source_ids(&self) -> Vec<&str> {
        self.source.keys().map(String::as_str).collect()
    }
}
