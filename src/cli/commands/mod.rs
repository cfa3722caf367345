//! CLI command implementations

mod eval;
mod history;
mod plan;
mod validate;


use crate::cli::logging::init_tracing;
use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);
    init_tracing(log_level);

    match cli.command {
        Command::Plan(args) => plan::run_plan(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::History(args) => history::run_history(args, log_level),
        Command::Eval(args) => eval::run_eval(args, log_level),
    }
}
