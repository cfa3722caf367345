//! Plan command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, PlanArgs};
use crate::curriculum::BucketCurriculum;
use crate::data::Dataset;
use crate::train::{CurriculumMode, TrainConfig};

/// Describe the phases `config` would train on `dataset`
pub fn format_plan(dataset: &Dataset, config: &TrainConfig) -> crate::Result<String> {
    let batch_size = config.train_batch_size.max(1);
    let batches = |n: usize| n.div_ceil(batch_size);
    let mut lines = vec![
        format!("Curriculum: {}", config.curriculum),
        format!("Examples: {}", dataset.len()),
    ];

    match config.curriculum {
        CurriculumMode::Bucket(policy) => {
            let scorer = config.difficulty.scorer();
            let curriculum = BucketCurriculum::new(dataset.clone(), scorer.as_ref());
            let ranges = curriculum.phase_ranges(config.num_buckets, policy)?;
            lines.push(format!("Difficulty: {}", scorer.name()));
            lines.push(format!("Phases: {}", ranges.len()));
            for (i, range) in ranges.iter().enumerate() {
                let difficulties = &curriculum.difficulties()[range.clone()];
                let hardest = difficulties.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                lines.push(format!(
                    "  Phase {}: examples {}..{} ({} examples, {} batches, max difficulty {})",
                    i + 1,
                    range.start,
                    range.end,
                    range.len(),
                    batches(range.len()),
                    hardest
                ));
            }
        }
        CurriculumMode::NoCurriculum | CurriculumMode::SelfPaced(_) => {
            lines.push(format!(
                "Phases: 1 ({} batches per epoch)",
                batches(dataset.len())
            ));
            if let CurriculumMode::SelfPaced(variant) = config.curriculum {
                lines.push(format!(
                    "  Regularizer: {variant} (lam {}, gam {:?})",
                    config.spl.lam, config.spl.gam
                ));
            }
        }
        CurriculumMode::Dynamic => {
            let params = &config.dynamic;
            lines.push(format!("Phases: {}", params.phases));
            lines.push(format!(
                "  Competence: c0 {}, alpha {}, beta {}, loss window {}",
                params.c0, params.alpha, params.beta, params.a
            ));
            lines.push("  Phase subsets are selected from model losses during training".to_string());
        }
    }
    Ok(lines.join("\n"))
}

pub fn run_plan(args: PlanArgs, level: LogLevel) -> Result<(), String> {
    let mut spec = load_config(&args.config).map_err(|e| e.to_string())?;
    if let Some(name) = &args.curriculum {
        spec.training.curriculum = name.parse().map_err(|e: crate::error::ConfigError| e.to_string())?;
    }
    if let Some(num_buckets) = args.num_buckets {
        spec.training.num_buckets = num_buckets;
    }
    if let Some(batch_size) = args.batch_size {
        spec.training.train_batch_size = batch_size;
    }

    let dataset = spec.data.load_train().map_err(|e| e.to_string())?;
    let plan = format_plan(&dataset, &spec.training).map_err(|e| e.to_string())?;
    log(level, LogLevel::Normal, &plan);
    Ok(())
}
