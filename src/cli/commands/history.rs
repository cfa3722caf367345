//! History command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::HistoryArgs;
use crate::train::{History, HistorySummary};

/// Format a history summary as a string
pub fn format_summary(summary: &HistorySummary, phased: bool) -> String {
    let opt = |v: Option<f32>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
    [
        format!(
            "  Layout: {}",
            if phased { "per phase" } else { "flat" }
        ),
        format!("  Phases: {}", summary.phases),
        format!("  Epochs: {}", summary.epochs),
        format!("  Batches: {}", summary.batches),
        format!("  Examples seen: {}", summary.examples_seen),
        format!("  Final epoch loss: {}", opt(summary.final_epoch_loss)),
        format!("  Best dev loss: {}", opt(summary.best_eval_loss)),
    ]
    .join("\n")
}

pub fn run_history(args: HistoryArgs, level: LogLevel) -> Result<(), String> {
    let history = History::load(&args.file).map_err(|e| e.to_string())?;
    let summary = history.summary();

    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    log(
        level,
        LogLevel::Normal,
        &format!("History: {}", args.file.display()),
    );
    log(level, LogLevel::Normal, &format_summary(&summary, history.is_phased()));
    if let History::Phased(phased) = &history {
        if let Some(competence) = &phased.competence {
            log(level, LogLevel::Verbose, &format!("  Competence: {competence:?}"));
        }
    }
    Ok(())
}
