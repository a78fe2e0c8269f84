//! spek-paths CLI
//!
//! Lists every spec class, group and test block of Kotlin Spek sources
//! together with its hierarchical path.

// Exclude from coverage - CLI binary tested via integration tests
#![cfg_attr(tarpaulin, ignore)]

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use spek_navigator::{
    collect_sources, scan_source, AdapterRegistry, BlockReport, DefaultWalker, NavigatorConfig,
    ScanOptions,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// List the groups and tests of Spek suites with their paths.
#[derive(Parser, Debug)]
#[command(name = "spek-paths")]
#[command(version = spek_navigator::version())]
#[command(after_help = "EXAMPLES:
  # Every block below a source tree
  spek-paths src/test/kotlin

  # A single file, as JSON
  spek-paths --format json src/test/kotlin/FooSpec.kt

  # Include the spec classes and leave out JUnit 4 classes
  spek-paths --include-specs -c navigator.json .
")]
struct Cli {
    /// Kotlin files or directories to scan
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    format: FormatArg,

    /// Config file path (JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Library model replacing the built-in Spek API (JSON)
    #[arg(long = "library", value_name = "FILE")]
    library: Option<PathBuf>,

    /// Also list the spec classes themselves
    #[arg(long = "include-specs")]
    include_specs: bool,

    /// Raise the log level (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

fn init_tracing(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("tracing subscriber already initialized");
    }
}

fn load_config(cli: &Cli) -> Result<NavigatorConfig> {
    let mut config = match &cli.config {
        Some(path) => NavigatorConfig::from_file(path)?,
        None => NavigatorConfig::default(),
    };
    if let Some(library) = &cli.library {
        config = config.with_library(library);
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let library = config.load_library()?;
    let options = ScanOptions {
        include_specs: cli.include_specs,
        ..ScanOptions::from(&config)
    };

    let sources = collect_sources(&DefaultWalker::new(), &cli.paths, &config.walk_config())?;
    info!(files = sources.len(), "scanning sources");

    let registry = AdapterRegistry::new();
    let mut reports: Vec<BlockReport> = Vec::new();
    for source in &sources {
        reports.extend(scan_source(&registry, &library, source, &options)?);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        FormatArg::Text => {
            for report in &reports {
                writeln!(out, "{}", report.to_text_line())?;
            }
        }
        FormatArg::Json => {
            serde_json::to_writer_pretty(&mut out, &reports).context("writing JSON output")?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    info!(blocks = reports.len(), "done");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
