//! Training configuration

use crate::curriculum::{BucketPolicy, DifficultyKind, ReferenceMetrics, SplVariant};
use crate::data::{SequenceFormat, SequenceLimits};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which curriculum drives training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CurriculumMode {
    /// Whole dataset, shuffled, every epoch (`NC`)
    #[default]
    NoCurriculum,
    /// Static difficulty buckets (`one_pass`, `baby_step`)
    Bucket(BucketPolicy),
    /// Self-paced sample weights (`spl.hard`, `spl.linear`, `spl.mixture`)
    SelfPaced(SplVariant),
    /// Competence-driven subsets (`dcl`)
    Dynamic,
}

impl CurriculumMode {
    /// Whether the run produces one history list per phase
    pub fn is_phased(self) -> bool {
        matches!(self, Self::Bucket(_) | Self::Dynamic)
    }
}

impl FromStr for CurriculumMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NC" => Ok(Self::NoCurriculum),
            "dcl" => Ok(Self::Dynamic),
            _ => {
                if let Some(variant) = s.strip_prefix("spl.") {
                    return variant
                        .parse()
                        .map(Self::SelfPaced)
                        .map_err(|_| ConfigError::InvalidCurriculum(s.to_string()));
                }
                s.parse()
                    .map(Self::Bucket)
                    .map_err(|_| ConfigError::InvalidCurriculum(s.to_string()))
            }
        }
    }
}

impl fmt::Display for CurriculumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCurriculum => f.write_str("NC"),
            Self::Bucket(policy) => write!(f, "{policy}"),
            Self::SelfPaced(variant) => write!(f, "spl.{variant}"),
            Self::Dynamic => f.write_str("dcl"),
        }
    }
}

impl TryFrom<String> for CurriculumMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurriculumMode> for String {
    fn from(mode: CurriculumMode) -> Self {
        mode.to_string()
    }
}

/// Self-paced regularizer parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplParams {
    /// Initial age parameter
    pub lam: f32,
    /// Mixture parameter (mixture only)
    pub gam: Option<f32>,
}

impl Default for SplParams {
    fn default() -> Self {
        Self { lam: 0.3, gam: None }
    }
}

/// Dynamic curriculum parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicParams {
    /// Number of phases
    pub phases: usize,
    /// Loss-window look-back (warm-up phases)
    pub a: usize,
    /// Initial competence
    pub c0: f32,
    /// Weight of slot accuracy against BLEU
    pub alpha: f32,
    /// Competence scaling
    pub beta: f32,
    /// Dev metrics of a fully trained baseline
    pub reference: Option<ReferenceMetrics>,
}

impl Default for DynamicParams {
    fn default() -> Self {
        Self {
            phases: 5,
            a: 1,
            c0: 0.2,
            alpha: 0.3,
            beta: 0.9,
            reference: None,
        }
    }
}

/// Training configuration
///
/// # Example
///
/// ```
/// use escalera::train::{CurriculumMode, TrainConfig};
///
/// let config = TrainConfig::new()
///     .with_epochs(3)
///     .with_curriculum("baby_step".parse::<CurriculumMode>().unwrap())
///     .with_num_buckets(4);
/// assert!(config.curriculum.is_phased());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Epochs per inner loop (per phase for phased curricula)
    pub epochs: usize,
    /// Training batch size
    pub train_batch_size: usize,
    /// Batch size for dev generation and loss measurement
    pub eval_batch_size: usize,
    /// Stop after this many epochs without dev improvement
    pub train_patience: Option<usize>,
    /// Epochs that always checkpoint and reset patience
    pub patience_grace_epochs: usize,
    /// Seed for batch shuffling (OS entropy when unset)
    pub seed: Option<u64>,
    /// Sequence layout
    pub format: SequenceFormat,
    /// Tokenization limits
    pub limits: SequenceLimits,
    /// Maximum generated length for dev evaluation
    pub max_generation_length: usize,
    /// Checkpoints and history go here
    pub output_dir: PathBuf,
    /// Curriculum strategy
    pub curriculum: CurriculumMode,
    /// Buckets for the bucket curriculum
    pub num_buckets: usize,
    /// Difficulty scorer for the bucket curriculum
    pub difficulty: DifficultyKind,
    /// Self-paced parameters
    pub spl: SplParams,
    /// Dynamic curriculum parameters
    pub dynamic: DynamicParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            train_batch_size: 1,
            eval_batch_size: 20,
            train_patience: None,
            patience_grace_epochs: 0,
            seed: None,
            format: SequenceFormat::default(),
            limits: SequenceLimits::default(),
            max_generation_length: 80,
            output_dir: PathBuf::from("output"),
            curriculum: CurriculumMode::default(),
            num_buckets: 5,
            difficulty: DifficultyKind::default(),
            spl: SplParams::default(),
            dynamic: DynamicParams::default(),
        }
    }
}

impl TrainConfig {
    /// Defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set epochs per inner loop
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set training batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.train_batch_size = batch_size;
        self
    }

    /// Set evaluation batch size
    pub fn with_eval_batch_size(mut self, batch_size: usize) -> Self {
        self.eval_batch_size = batch_size;
        self
    }

    /// Enable early stopping
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.train_patience = Some(patience);
        self
    }

    /// Set grace epochs
    pub fn with_grace_epochs(mut self, epochs: usize) -> Self {
        self.patience_grace_epochs = epochs;
        self
    }

    /// Fix the shuffling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set sequence layout
    pub fn with_format(mut self, format: SequenceFormat) -> Self {
        self.format = format;
        self
    }

    /// Set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set curriculum
    pub fn with_curriculum(mut self, mode: CurriculumMode) -> Self {
        self.curriculum = mode;
        self
    }

    /// Set bucket count
    pub fn with_num_buckets(mut self, num_buckets: usize) -> Self {
        self.num_buckets = num_buckets;
        self
    }

    /// Set difficulty scorer
    pub fn with_difficulty(mut self, kind: DifficultyKind) -> Self {
        self.difficulty = kind;
        self
    }

    /// Set self-paced parameters
    pub fn with_spl(mut self, lam: f32, gam: Option<f32>) -> Self {
        self.spl = SplParams { lam, gam };
        self
    }

    /// Set dynamic curriculum parameters
    pub fn with_dynamic(mut self, params: DynamicParams) -> Self {
        self.dynamic = params;
        self
    }
}
