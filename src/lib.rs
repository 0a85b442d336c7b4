//! mdvet - validate and transform interlinked markdown resources

pub mod cli;
pub mod domain;
pub mod infra;
pub mod transform;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command,
    config::ProjectConfig,
    handlers::{Project, handle_completions, handle_extract, handle_transform, handle_validate},
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Completions(args) = &cli.command {
        return handle_completions(args);
    }

    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = ProjectConfig::load(&root, cli.config.as_deref())?;
    let project = Project::load(&root, config)?;
    let verbose = cli.verbose > 0;

    match &cli.command {
        Command::Validate(args) => handle_validate(args, &project, verbose),
        Command::Extract(args) => handle_extract(args, &project),
        Command::Transform(args) => handle_transform(args, &project),
        Command::Completions(args) => handle_completions(args),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
