//! Validation error types

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Training data path does not exist: {0}")]
    TrainDataNotFound(String),

    #[error("Dev data path does not exist: {0}")]
    DevDataNotFound(String),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid eval batch size: {0} (must be > 0)")]
    InvalidEvalBatchSize(usize),

    #[error("Invalid generation length: {0} (must be > 0)")]
    InvalidGenerationLength(usize),

    #[error("Invalid bucket count: {0} (must be > 0)")]
    InvalidBucketCount(usize),

    #[error("Invalid SPL lambda: {0} (must be > 0.0)")]
    InvalidSplLambda(f32),

    #[error("SPL mixture requires spl.gam")]
    MissingSplGamma,

    #[error("Invalid SPL gamma: {0} (must be > 0.0)")]
    InvalidSplGamma(f32),

    #[error("Dynamic curriculum requires dev data")]
    MissingDevData,

    #[error("Dynamic curriculum requires dynamic.reference metrics")]
    MissingReference,

    #[error("Invalid reference metric {name}: {value} (must be > 0.0)")]
    InvalidReference { name: &'static str, value: f32 },

    #[error("Invalid dynamic phase count: {0} (must be > 0)")]
    InvalidPhases(usize),

    #[error("Invalid loss window: {0} (must be > 0)")]
    InvalidLossWindow(usize),

    #[error("Invalid initial competence: {0} (must be in (0.0, 1.0])")]
    InvalidInitialCompetence(f32),

    #[error("Invalid competence alpha: {0} (must be in [0.0, 1.0])")]
    InvalidAlpha(f32),

    #[error("Invalid competence beta: {0} (must be > 0.0)")]
    InvalidBeta(f32),
}
