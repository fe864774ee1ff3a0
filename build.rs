// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: configuration file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .global(true)
        .help("Configuration file (built-in sources are used when omitted)")
}

fn build_cli() -> Command {
    Command::new("buildsync")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Buildsync Contributors")
        .about("Compare latest package builds across two build tags")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(config_arg())
        .subcommand(
            Command::new("compare")
                .about("Compare the latest builds of two sources over a content set")
                .arg(Arg::new("source1").required(true).help("Reference source id"))
                .arg(Arg::new("source2").required(true).help("Target source id"))
                .arg(
                    Arg::new("packages")
                        .num_args(0..)
                        .help("Compare only these packages instead of the resolved content set"),
                )
                .arg(
                    Arg::new("cache")
                        .long("cache")
                        .action(ArgAction::SetTrue)
                        .help("Load every latest build of both sources up front"),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .action(ArgAction::SetTrue)
                        .help("Look up uncached builds in parallel (the default)"),
                )
                .arg(
                    Arg::new("no_parallel")
                        .long("no-parallel")
                        .action(ArgAction::SetTrue)
                        .help("Look up uncached builds one at a time"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value("output")
                        .help("Output directory for reports"),
                )
                .arg(
                    Arg::new("formats")
                        .short('f')
                        .long("formats")
                        .default_value("all")
                        .help("Report formats: json, txt or all"),
                )
                .arg(
                    Arg::new("lists_dir")
                        .long("lists-dir")
                        .value_name("DIR")
                        .help("Directory holding the nosync and exclude lists"),
                ),
        )
        .subcommand(
            Command::new("content")
                .about("Print the content set of a source's distro view")
                .arg(Arg::new("source").required(true).help("Source id"))
                .arg(
                    Arg::new("arch")
                        .long("arch")
                        .action(ArgAction::Append)
                        .help("Architectures to merge"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("buildsync.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
