//! Interfaces to the external collaborators of the training core
//!
//! The sequence model, its tokenizer, the text metric scorers and
//! persistence are all opaque here. The curriculum core only needs the
//! calls below; any backend (candle, tch, a remote trainer) can implement them.

use crate::data::TokenBatch;
use crate::error::Result;
use std::path::Path;

/// Output of a single optimisation step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    /// Reduced loss that was backpropagated (weighted when sample weights were given)
    pub loss: f32,
    /// Unweighted, token-averaged loss of each example in the batch
    pub sample_losses: Vec<f32>,
}

/// Persist model or tokenizer state into a directory
pub trait SavePretrained {
    /// Write state into `dir`. The directory already exists.
    fn save_pretrained(&self, dir: &Path) -> Result<()>;
}

/// Trainable sequence-to-sequence model
pub trait Seq2SeqModel: SavePretrained {
    /// Forward, backward and optimizer step on one batch
    ///
    /// When `sample_weights` is given, each example's loss is multiplied by its
    /// weight before reduction. The weights slice has one entry per example.
    fn train_step(&mut self, batch: &TokenBatch, sample_weights: Option<&[f32]>)
        -> Result<StepOutput>;

    /// Per-example losses without updating parameters
    fn sample_losses(&mut self, batch: &TokenBatch) -> Result<Vec<f32>>;

    /// Generate output token ids for each input sequence
    fn generate(&mut self, input_ids: &[Vec<u32>], max_length: usize) -> Result<Vec<Vec<u32>>>;
}

/// Text encoder/decoder
pub trait Tokenizer: SavePretrained {
    /// Encode texts, truncating to `max_length` and padding to the longest sequence
    fn encode(&self, texts: &[&str], max_length: usize) -> Result<Vec<Vec<u32>>>;

    /// Decode token ids back to text, skipping special tokens
    fn decode(&self, ids: &[Vec<u32>]) -> Result<Vec<String>>;
}

/// Sentence-level text metric
///
/// Degenerate inputs may produce NaN; callers propagate it.
pub trait Scorer {
    /// Score a candidate against one or more references
    fn score(&self, candidate: &str, references: &[&str]) -> f32;

    /// Name of the metric
    fn name(&self) -> &str;
}
