//! Curriculum scheduling and sample weighting
//!
//! Three ways of ordering what the model sees:
//! - [`BucketCurriculum`]: static difficulty buckets, one-pass or baby-step
//! - [`SplRegularizer`]: self-paced per-example loss weights
//! - [`DynamicCurriculum`]: competence-gated subsets re-selected each phase
//!   from loss-derived difficulty ([`LossWindow`], [`CompetenceEstimator`])

mod bucket;
mod competence;
mod difficulty;
mod dynamic;
mod spl;


pub use bucket::{phase_ranges, BucketCurriculum, BucketPolicy, CurriculumIter};
pub use competence::{CompetenceEstimator, ReferenceMetrics};
pub use difficulty::{DifficultyKind, DifficultyScorer, IntentSlotScorer, LengthScorer, ACT_WEIGHT};
pub use dynamic::{quantile, DynamicCurriculum, LossWindow};
pub use spl::{SplRegularizer, SplVariant, SPL_GROWTH};
