// src/cli/mod.rs
//! CLI definitions for buildsync
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `compare` - Classify a content set between two build sources
//! - `content` - Print the content set a source's distro view resolves to
//! - `completions` - Generate shell completion scripts

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buildsync")]
#[command(author = "Buildsync Contributors")]
#[command(version)]
#[command(about = "Compare latest package builds across two build tags", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (built-in sources are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare the latest builds of two sources over a content set
    Compare {
        /// Reference source id (e.g. rawhide)
        source1: String,

        /// Target source id (e.g. eln)
        source2: String,

        /// Compare only these packages instead of the resolved content set
        packages: Vec<String>,

        /// Load every latest build of both sources up front
        #[arg(long)]
        cache: bool,

        /// Look up uncached builds in parallel (the default)
        #[arg(long, overrides_with = "no_parallel")]
        parallel: bool,

        /// Look up uncached builds one at a time
        #[arg(long, overrides_with = "parallel")]
        no_parallel: bool,

        /// Output directory for reports
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Report formats: json, txt or all
        #[arg(short, long, default_value = "all")]
        formats: String,

        /// Directory holding the nosync and exclude lists
        #[arg(long)]
        lists_dir: Option<PathBuf>,
    },

    /// Print the content set of a source's distro view
    Content {
        /// Source id whose distro view is resolved
        source: String,

        /// Architectures to merge (defaults to the configured ones)
        #[arg(long)]
        arch: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
