// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::CompareOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Compare {
            source1,
            source2,
            packages,
            cache,
            parallel: _,
            no_parallel,
            output,
            formats,
            lists_dir,
        } => commands::cmd_compare(
            config,
            CompareOptions {
                source1,
                source2,
                packages,
                cache,
                parallel: !no_parallel,
                output,
                formats,
                lists_dir,
            },
        ),
        Commands::Content { source, arch } => commands::cmd_content(config, &source, arch),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
