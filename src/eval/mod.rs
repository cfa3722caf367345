//! Evaluation and decoding
//!
//! - [`DevEvaluator`]: dev BLEU / slot accuracy between epochs
//! - [`decode`]: generate a test set and write `results.txt` + `decode_loss.json`
//! - [`SlotAccuracy`]: in-crate slot realisation metric

mod decode;
mod evaluator;
mod metrics;


pub use decode::{
    decode, evaluate_loss, generate_outputs, sample_losses, DecodeLoss, DecodeReport,
    GenerationSettings, DECODE_LOSS_FILE, RESULTS_FILE,
};
pub use evaluator::{DevEvaluator, DevMetrics};
pub use metrics::{score_corpus, SlotAccuracy};
