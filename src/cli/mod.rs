//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::ValidationMode;
use output::OutputFormat;

/// mdvet - validate and transform interlinked markdown resources
#[derive(Parser, Debug)]
#[command(name = "mdvet", version, about, long_about = None)]
pub struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short = 'r', long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/mdvet.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate links and frontmatter of every resource
    Validate(ValidateArgs),

    /// Print the metadata extracted from one file
    Extract(ExtractArgs),

    /// Rewrite links of one file through the configured transform rules
    Transform(TransformArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Schema applied to every resource (overrides config)
    #[arg(long)]
    pub schema: Option<String>,

    /// Frontmatter validation mode (overrides config and collections)
    #[arg(long, value_enum)]
    pub mode: Option<ValidationMode>,

    /// Check external URLs
    #[arg(long)]
    pub check_urls: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `extract` command
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Markdown file (relative to the project root or the working directory)
    pub file: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `transform` command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Markdown file (relative to the project root or the working directory)
    pub file: PathBuf,

    /// Print the content fingerprint of the output instead of the output
    #[arg(long)]
    pub fingerprint: bool,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
