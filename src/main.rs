//! # Shipwright: The Main Entry Point
//!
//! This module handles Command Line Interface (CLI) parsing, logging
//! initialization, and dispatching into the build pipeline. It owns the
//! process exit code: `0` when the publish succeeded and the executable was
//! found, `1` for any failure along the way.
//!
//! The heavy lifting lives in `pipeline` (toolchain orchestration) and
//! `report` (artifact verification).

use clap::Parser;
use log::{LevelFilter, error};
use simplelog::{Config, SimpleLogger};

mod invariant;
mod paths;
mod pipeline;
mod report;
mod runner;

/// The primary Command Line Interface (CLI) configuration.
///
/// Uses `clap` for flag parsing and help generation.
#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Publishes SignalScope as a self-contained single-file executable", long_about = None)]
struct Cli {
    /// Delete the publish directory before building.
    ///
    /// Destructive: `bin/publish` is removed recursively with no
    /// confirmation prompt.
    #[arg(long)]
    clean: bool,

    /// Skip dead-code trimming of the published executable.
    ///
    /// Trimming shrinks the artifact considerably but can break
    /// reflection-heavy code; pass this when the trimmed build misbehaves.
    #[arg(long)]
    no_trim: bool,

    /// Target runtime identifier for the publish step.
    #[arg(long, default_value = "win-x64")]
    runtime: String,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    // Determine log level based on verbosity flag
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // Initialize logger
    // We ignore the result here as logging failure shouldn't crash the startup
    let _ = SimpleLogger::init(log_level, Config::default());

    let options = pipeline::BuildOptions {
        clean: cli.clean,
        no_trim: cli.no_trim,
        runtime: cli.runtime,
    };

    let build_paths = match paths::BuildPaths::from_current_exe() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to resolve build paths: {}", e);
            std::process::exit(1);
        }
    };

    let runner = runner::ToolchainRunner;
    if let Err(e) = pipeline::run(&options, &build_paths, &runner) {
        error!("{}", e);
        std::process::exit(1);
    }

    // Final acceptance: the publish step reporting success is not enough,
    // the executable itself must be there.
    if let Err(e) = report::summarize(&build_paths) {
        error!("{}", e);
        std::process::exit(1);
    }
}
