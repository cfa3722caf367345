//! Manifest validation logic

use super::error::ValidationError;
use crate::config::schema::ExperimentSpec;
#[cfg(not(test))]
use crate::config::schema::source_paths;
use crate::curriculum::SplVariant;
use crate::train::{CurriculumMode, TrainConfig};

/// Validate an experiment manifest
///
/// Checks:
/// - Data paths exist
/// - Sizes and counts are non-zero
/// - The selected curriculum has the parameters it needs
pub fn validate_config(spec: &ExperimentSpec) -> Result<(), ValidationError> {
    // Paths are not checked in unit tests, where files do not exist
    #[cfg(not(test))]
    {
        for path in source_paths(&spec.data.train) {
            if !path.exists() {
                return Err(ValidationError::TrainDataNotFound(path.display().to_string()));
            }
        }
        if let Some(dev) = &spec.data.dev {
            for path in source_paths(dev) {
                if !path.exists() {
                    return Err(ValidationError::DevDataNotFound(path.display().to_string()));
                }
            }
        }
    }

    let training = &spec.training;
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.train_batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(training.train_batch_size));
    }
    if training.eval_batch_size == 0 {
        return Err(ValidationError::InvalidEvalBatchSize(training.eval_batch_size));
    }
    if training.max_generation_length == 0 {
        return Err(ValidationError::InvalidGenerationLength(
            training.max_generation_length,
        ));
    }

    match training.curriculum {
        CurriculumMode::NoCurriculum => Ok(()),
        CurriculumMode::Bucket(_) => {
            if training.num_buckets == 0 {
                return Err(ValidationError::InvalidBucketCount(training.num_buckets));
            }
            Ok(())
        }
        CurriculumMode::SelfPaced(variant) => validate_spl(training, variant),
        CurriculumMode::Dynamic => validate_dynamic(training, spec.data.dev.is_some()),
    }
}

fn validate_spl(training: &TrainConfig, variant: SplVariant) -> Result<(), ValidationError> {
    let lam = training.spl.lam;
    if lam.is_nan() || lam <= 0.0 {
        return Err(ValidationError::InvalidSplLambda(lam));
    }
    if variant == SplVariant::Mixture {
        match training.spl.gam {
            None => return Err(ValidationError::MissingSplGamma),
            Some(gam) if gam.is_nan() || gam <= 0.0 => {
                return Err(ValidationError::InvalidSplGamma(gam));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_dynamic(training: &TrainConfig, has_dev: bool) -> Result<(), ValidationError> {
    let params = &training.dynamic;
    if !has_dev {
        return Err(ValidationError::MissingDevData);
    }
    let reference = params.reference.ok_or(ValidationError::MissingReference)?;
    for (name, value) in [
        ("bleu", reference.bleu),
        ("slot_accuracy", reference.slot_accuracy),
    ] {
        if value.is_nan() || value <= 0.0 {
            return Err(ValidationError::InvalidReference { name, value });
        }
    }

    if params.phases == 0 {
        return Err(ValidationError::InvalidPhases(params.phases));
    }
    if params.a == 0 {
        return Err(ValidationError::InvalidLossWindow(params.a));
    }
    if !(params.c0 > 0.0 && params.c0 <= 1.0) {
        return Err(ValidationError::InvalidInitialCompetence(params.c0));
    }
    if !(0.0..=1.0).contains(&params.alpha) {
        return Err(ValidationError::InvalidAlpha(params.alpha));
    }
    if params.beta.is_nan() || params.beta <= 0.0 {
        return Err(ValidationError::InvalidBeta(params.beta));
    }
    Ok(())
}
