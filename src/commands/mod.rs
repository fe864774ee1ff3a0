// src/commands/mod.rs
//! Command handlers for the buildsync CLI

mod compare;
mod content;

pub use compare::{cmd_compare, CompareOptions};
pub use content::cmd_content;

use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

/// Write a completion script for `shell` to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "buildsync", &mut std::io::stdout());
    Ok(())
}
