// src/error.rs

//! Error types for build comparison

use thiserror::Error;

/// Errors raised while fetching builds or running a comparison
///
/// Classification outcomes such as a missing reference build are not errors;
/// they are recorded as a [`Status`](crate::compare::Status).
#[derive(Error, Debug)]
pub enum Error {
    /// The build hub could not be reached or returned an unusable answer
    #[error("Build source '{source_id}' unavailable: {reason}")]
    BackendUnavailable { source_id: String, reason: String },

    /// Extras detection needs a bulk-cached second source
    #[error("Extras detection requires a cached build source, '{0}' is in live lookup mode")]
    UnsupportedExtrasMode(String),

    /// `build_cache` was called on a source that already has a cache
    #[error("Cache for build source '{0}' was already built")]
    CacheAlreadyBuilt(String),

    /// A lookup failed while classifying a specific package
    #[error("Failed to classify package '{package}': {source}")]
    Classify {
        package: String,
        #[source]
        source: Box<Error>,
    },

    /// XML-RPC fault returned by the hub
    #[error("Hub fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// Malformed XML-RPC or JSON payload
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Content resolver list could not be fetched
    #[error("Failed to fetch {url}: {reason}")]
    ContentFetch { url: String, reason: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source id not present in the configuration
    #[error("Unknown build source '{0}'")]
    UnknownSource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Wrap an error with the package that was being classified
    pub fn for_package(self, package: &str) -> Self {
        match self {
            Error::Classify { .. } => self,
            other => Error::Classify {
                package: package.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type for build comparison operations
pub type Result<T> = std::result::Result<T, Error>;
