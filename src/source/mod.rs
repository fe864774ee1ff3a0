// src/source/mod.rs

//! Build sources: a tag on a build hub plus a lookup of its latest builds
//!
//! A [`BuildSource`] answers "what is the latest build of package X" either
//! from a cache filled by one bulk `listTagged` call, or by asking the hub
//! for every package. The two modes never mix: once a cache exists, a miss
//! means the package has no build.

mod koji;
pub mod xmlrpc;

pub use koji::KojiClient;

use crate::build::BuildRecord;
use crate::error::{Error, Result};
use crate::version::compare_builds;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Access to a build hub
///
/// Implemented by [`KojiClient`] for Koji and Brew hubs. Implementations are
/// shared across threads when uncached lookups run in parallel.
pub trait BuildBackend: Send + Sync {
    /// All latest builds tagged into `tag`, one per package
    fn list_latest_builds(&self, tag: &str) -> Result<Vec<BuildRecord>>;

    /// Latest build of `package` in `tag`, if any
    fn get_latest_build(&self, tag: &str, package: &str) -> Result<Option<BuildRecord>>;

    /// Name of the first tag in `tag`'s full inheritance chain
    fn first_inherited_tag(&self, tag: &str) -> Result<String>;
}

/// Which tags a source reads builds from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceScope {
    /// Tag queried for lookups and bulk listing
    pub tag: String,
    /// Optional overlay tag; its builds replace cached ones when newer
    pub secondary_tag: Option<String>,
}

impl SourceScope {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            secondary_tag: None,
        }
    }

    pub fn with_secondary(mut self, tag: &str) -> Self {
        self.secondary_tag = Some(tag.to_string());
        self
    }
}

/// Where the content resolver publishes package lists for a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroView {
    pub url: String,
    pub view: String,
}

/// A logical build repository
pub struct BuildSource {
    id: String,
    product: String,
    backend: Arc<dyn BuildBackend>,
    scope: SourceScope,
    distro: Option<DistroView>,
    cache: Option<BTreeMap<String, BuildRecord>>,
}

impl BuildSource {
    /// Create a source in live lookup mode
    pub fn new(id: &str, backend: Arc<dyn BuildBackend>, scope: SourceScope) -> Self {
        Self {
            id: id.to_string(),
            product: id.to_string(),
            backend,
            scope,
            distro: None,
            cache: None,
        }
    }

    /// Set the human readable product name used in reports
    pub fn with_product(mut self, product: &str) -> Self {
        self.product = product.to_string();
        self
    }

    /// Attach the content resolver view describing this source's content
    pub fn with_distro_view(mut self, distro: DistroView) -> Self {
        self.distro = Some(distro);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn scope(&self) -> &SourceScope {
        &self.scope
    }

    pub fn distro_view(&self) -> Option<&DistroView> {
        self.distro.as_ref()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Cached builds in package name order, `None` in live lookup mode
    pub fn cached_builds(&self) -> Option<impl Iterator<Item = (&str, &BuildRecord)>> {
        self.cache
            .as_ref()
            .map(|cache| cache.iter().map(|(name, build)| (name.as_str(), build)))
    }

    /// Latest build of a package, `None` if the source has none
    pub fn get_build(&self, package: &str) -> Result<Option<BuildRecord>> {
        if let Some(cache) = &self.cache {
            return match cache.get(package) {
                Some(build) => {
                    debug!("Read cached {} in {}", package, self);
                    Ok(Some(build.clone()))
                }
                None => {
                    debug!("Package {} not found in cached {}", package, self);
                    Ok(None)
                }
            };
        }

        self.backend
            .get_latest_build(&self.scope.tag, package)
            .map_err(|e| self.unavailable(e))
    }

    /// Fill the cache from one bulk listing of the source's tags
    pub fn build_cache(&mut self) -> Result<()> {
        if self.cache.is_some() {
            return Err(Error::CacheAlreadyBuilt(self.id.clone()));
        }

        info!("Building cache for {} from tag {}", self, self.scope.tag);
        let mut cache = BTreeMap::new();
        for build in self
            .backend
            .list_latest_builds(&self.scope.tag)
            .map_err(|e| self.unavailable(e))?
        {
            cache.insert(build.package().to_string(), build);
        }

        if let Some(secondary) = &self.scope.secondary_tag {
            info!("Overlaying newer builds from tag {}", secondary);
            let overlay = self
                .backend
                .list_latest_builds(secondary)
                .map_err(|e| self.unavailable(e))?;
            for build in overlay {
                let newer = match cache.get(build.package()) {
                    Some(cached) => compare_builds(&build, cached) == Ordering::Greater,
                    None => true,
                };
                if newer {
                    debug!("Updated cache for {} with {}", build.package(), build.nvr);
                    cache.insert(build.package().to_string(), build);
                }
            }
        }

        info!("Cached {} builds for {}", cache.len(), self);
        self.cache = Some(cache);
        Ok(())
    }

    fn unavailable(&self, err: Error) -> Error {
        match err {
            Error::BackendUnavailable { .. } => err,
            other => Error::BackendUnavailable {
                source_id: self.id.clone(),
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for BuildSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product)
    }
}

impl fmt::Debug for BuildSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSource")
            .field("id", &self.id)
            .field("product", &self.product)
            .field("scope", &self.scope)
            .field("cached", &self.cache.as_ref().map(|c| c.len()))
            .finish()
    }
}
