// src/commands/content.rs
//! Content set inspection command

use anyhow::{Context, Result};
use buildsync::{Config, ContentResolver, PackageListProvider};
use std::path::Path;
use tracing::info;

/// Print the merged content set of a source's distro view, one per line
pub fn cmd_content(config_path: Option<&Path>, source: &str, arches: Vec<String>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let section = config.source(source)?;

    let arches = if arches.is_empty() {
        config.defaults.arches.clone()
    } else {
        arches
    };

    info!(
        "Resolving content of {} view {} for {}",
        section.distro_url,
        section.distro_view,
        arches.join(", ")
    );

    let resolver = ContentResolver::new(&section.distro_url, &section.distro_view, &arches)?
        .with_exclude(config.defaults.load_exclude()?);
    let content = resolver
        .content()
        .with_context(|| format!("Failed to resolve the content of {}", source))?;

    for package in &content {
        println!("{}", package);
    }
    info!("{} packages", content.len());
    Ok(())
}
