//! CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Escalera: curriculum learning for data-to-text generation
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "escalera")]
#[command(version)]
#[command(about = "Curriculum learning for data-to-text dialogue generation")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the curriculum phases a manifest produces
    Plan(PlanArgs),

    /// Validate a manifest without loading data
    Validate(ValidateArgs),

    /// Summarize a saved training history
    History(HistoryArgs),

    /// Score decoded outputs against dialogue acts
    Eval(EvalArgs),
}

/// Arguments for the plan command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PlanArgs {
    /// Path to YAML manifest
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override the curriculum (NC, one_pass, baby_step, spl.*, dcl)
    #[arg(short, long)]
    pub curriculum: Option<String>,

    /// Override the number of buckets
    #[arg(short, long)]
    pub num_buckets: Option<usize>,

    /// Override the training batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML manifest
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show the resolved training settings
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the history command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct HistoryArgs {
    /// Path to history.json
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the eval command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvalArgs {
    /// Decoded outputs, one per line (results.txt)
    #[arg(long, value_name = "FILE")]
    pub hyp: PathBuf,

    /// Reference data in `intent <sep> utterance` format
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Separator between intent and utterance
    #[arg(long, default_value = "&")]
    pub separator: String,
}

/// Parse arguments from an iterator (used by tests)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
