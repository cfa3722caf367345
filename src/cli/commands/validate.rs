//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, source_paths, DataSpec, ValidateArgs};
use crate::data::DataSource;
use crate::train::TrainConfig;

/// Format the data section as a string
pub fn format_data_info(data: &DataSpec) -> String {
    let paths = |source: &DataSource| {
        source_paths(source)
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut lines = vec![format!("  Training data: {}", paths(&data.train))];
    if let Some(dev) = &data.dev {
        lines.push(format!("  Dev data: {}", paths(dev)));
    }
    if let Some(cache) = &data.cache_dir {
        lines.push(format!("  Cache dir: {}", cache.display()));
    }
    lines.join("\n")
}

/// Format the training section as a string
pub fn format_training_info(training: &TrainConfig) -> String {
    let mut lines = vec![
        format!("  Curriculum: {}", training.curriculum),
        format!("  Epochs: {}", training.epochs),
        format!("  Batch size: {}", training.train_batch_size),
    ];
    if let Some(patience) = training.train_patience {
        lines.push(format!("  Patience: {patience}"));
    }
    if let Some(seed) = training.seed {
        lines.push(format!("  Seed: {seed}"));
    }
    lines.push(format!("  Output dir: {}", training.output_dir.display()));
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");
    if args.detailed || level == LogLevel::Verbose {
        log(level, LogLevel::Normal, "\nData:");
        log(level, LogLevel::Normal, &format_data_info(&spec.data));
        log(level, LogLevel::Normal, "\nTraining:");
        log(level, LogLevel::Normal, &format_training_info(&spec.training));
    }
    Ok(())
}
