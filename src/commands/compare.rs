// src/commands/compare.rs
//! Build comparison command

use anyhow::{Context, Result};
use buildsync::{
    BuildSource, Comparison, Config, ContentResolver, OverrideLists, PackageListProvider,
    Report, ReportFormat, Status, StaticPackageList,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options of one `compare` run
pub struct CompareOptions {
    pub source1: String,
    pub source2: String,
    pub packages: Vec<String>,
    pub cache: bool,
    pub parallel: bool,
    pub output: PathBuf,
    pub formats: String,
    pub lists_dir: Option<PathBuf>,
}

/// Classify the content set between two sources and write the reports
pub fn cmd_compare(config_path: Option<&Path>, opts: CompareOptions) -> Result<()> {
    let formats = ReportFormat::parse_list(&opts.formats)?;
    let mut config = Config::load_or_default(config_path)?;
    if let Some(dir) = opts.lists_dir {
        config.defaults.lists_dir = dir;
    }

    let mut source1 = connect(&config, &opts.source1)?;
    let mut source2 = connect(&config, &opts.source2)?;

    if opts.cache {
        info!("Loading latest builds of {} and {}", source1, source2);
        source1
            .build_cache()
            .with_context(|| format!("Failed to cache builds of {}", source1))?;
        source2
            .build_cache()
            .with_context(|| format!("Failed to cache builds of {}", source2))?;
    }

    let provider = package_provider(&config, &source2, opts.packages)?;
    let content = provider
        .content()
        .with_context(|| format!("Failed to resolve the content of {}", source2))?;
    let placeholders = provider
        .placeholders()
        .with_context(|| format!("Failed to resolve the placeholders of {}", source2))?;
    let nosync = config.defaults.load_nosync()?;

    let overrides = OverrideLists::new(placeholders, nosync);
    info!(
        "Loaded {} content packages, {} placeholders, {} nosync packages",
        content.len(),
        overrides.placeholders().len(),
        overrides.nosync_len()
    );

    let comparison =
        Comparison::new(source1, source2, overrides, content).with_parallel(opts.parallel);
    comparison.classify_all()?;

    if comparison.source2().is_cached() {
        comparison.detect_extras()?;
    } else {
        info!(
            "Skipping extras detection, {} is not cached (use --cache)",
            comparison.source2()
        );
    }

    let stats = comparison.count_by_status();
    info!("Results: {}", stats);
    if stats.get(Status::Error) > 0 {
        warn!(
            "{} packages are missing from {}",
            stats.get(Status::Error),
            comparison.source1()
        );
    }

    let report = Report::from_comparison(&comparison);
    let written = report
        .write(&opts.output, &formats)
        .with_context(|| format!("Failed to write reports to {}", opts.output.display()))?;

    println!("{} vs {}: {}", report.product1, report.product2, report.stats);
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn connect(config: &Config, id: &str) -> Result<BuildSource> {
    let section = config.source(id)?;
    section
        .connect(id)
        .with_context(|| format!("Failed to set up source '{}'", id))
}

/// The target's distro view, with its content replaced by the packages
/// named on the command line if there are any
fn package_provider(
    config: &Config,
    target: &BuildSource,
    packages: Vec<String>,
) -> Result<Box<dyn PackageListProvider>> {
    let view = target
        .distro_view()
        .with_context(|| format!("Source {} has no distro view to resolve content", target))?;
    let resolver = ContentResolver::new(&view.url, &view.view, &config.defaults.arches)?
        .with_exclude(config.defaults.load_exclude()?);

    if packages.is_empty() {
        return Ok(Box::new(resolver));
    }
    let explicit = StaticPackageList::with_placeholders_from(packages, &resolver)
        .with_context(|| format!("Failed to resolve the placeholders of {}", target))?;
    Ok(Box::new(explicit))
}
