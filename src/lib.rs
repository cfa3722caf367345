//! Escalera: curriculum learning for data-to-text dialogue generation
//!
//! Escalera orders, weights and selects training examples for sequence-to-
//! sequence models that turn dialogue acts into utterances. The model and
//! tokenizer stay external; this crate owns the curriculum.
//!
//! # Architecture
//!
//! - `data`: datasets, batch formatting and shuffled batch sources
//! - `curriculum`: difficulty scorers, bucket curricula, self-paced weights,
//!   competence-based dynamic selection
//! - `train`: the curriculum trainer, callbacks, patience, checkpoints and
//!   run histories
//! - `eval`: dev evaluation, decoding and slot accuracy
//! - `config`: YAML experiment manifests and CLI definitions
//!
//! # Example
//!
//! ```
//! use escalera::curriculum::{BucketCurriculum, BucketPolicy, LengthScorer};
//! use escalera::data::{Dataset, PairCollate};
//!
//! let data = Dataset::from_pairs(
//!     vec![("inform ( name = a )", "a"), ("inform ( name = b ; area = c )", "b is in c")],
//!     "&",
//! );
//! let curriculum = BucketCurriculum::new(data, &LengthScorer);
//! let phases = curriculum.generate(2, 1, BucketPolicy::BabyStep, PairCollate).unwrap();
//! assert_eq!(phases.len(), 2);
//! ```

pub mod cli;
pub mod config;
pub mod curriculum;
pub mod data;
pub mod dialog_act;
pub mod error;
pub mod eval;
pub mod model;
pub mod train;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
pub use model::{SavePretrained, Scorer, Seq2SeqModel, StepOutput, Tokenizer};
