//! Escalera CLI
//!
//! # Usage
//!
//! ```bash
//! # Show the curriculum phases of an experiment
//! escalera plan experiment.yaml --curriculum baby_step --num-buckets 5
//!
//! # Validate a manifest
//! escalera validate experiment.yaml --detailed
//!
//! # Summarize a training history
//! escalera history output/history.json
//!
//! # Slot accuracy of decoded outputs
//! escalera eval --hyp output/results.txt --data data/test.txt
//! ```

use clap::Parser;
use escalera::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
