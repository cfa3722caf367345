//! Eval command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::EvalArgs;
use crate::data::Dataset;
use crate::eval::{score_corpus, SlotAccuracy};
use std::fs;
use std::path::Path;

/// Slot accuracy of the outputs in `hyp` against the intents in `data`
pub fn slot_accuracy_of_files(hyp: &Path, data: &Path, separator: &str) -> crate::Result<f32> {
    let outputs: Vec<String> = fs::read_to_string(hyp)?
        .lines()
        .map(str::to_string)
        .collect();
    let dataset = Dataset::from_txt_file(data, separator)?;
    score_corpus(&outputs, dataset.intents(), &SlotAccuracy)
}

pub fn run_eval(args: EvalArgs, level: LogLevel) -> Result<(), String> {
    let accuracy = slot_accuracy_of_files(&args.hyp, &args.data, &args.separator)
        .map_err(|e| e.to_string())?;
    log(level, LogLevel::Normal, &format!("Slot accuracy: {accuracy:.4}"));
    Ok(())
}
