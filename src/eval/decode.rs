//! Generation and decode output files

use crate::data::{BatchSource, Collate, Dataset, SequenceFormat, SequenceLimits, TokenBatch, TokenCollate};
use crate::error::{DataError, Result};
use crate::model::{Seq2SeqModel, Tokenizer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Generated outputs file name
pub const RESULTS_FILE: &str = "results.txt";
/// Loss summary file name
pub const DECODE_LOSS_FILE: &str = "decode_loss.json";

/// How inputs are prepared for generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Examples per generate call
    pub batch_size: usize,
    /// Sequence layout
    pub format: SequenceFormat,
    /// Tokenization limits
    pub limits: SequenceLimits,
    /// Maximum generated length
    pub max_length: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            batch_size: 32,
            format: SequenceFormat::default(),
            limits: SequenceLimits::default(),
            max_length: 80,
        }
    }
}

/// Generate one output per example from its intent
///
/// Encoder-decoder models see the intent alone; unified models are prompted
/// with `"{intent} {separator}"`.
pub fn generate_outputs<M, T>(
    model: &mut M,
    tokenizer: &T,
    dataset: &Dataset,
    settings: &GenerationSettings,
) -> Result<Vec<String>>
where
    M: Seq2SeqModel,
    T: Tokenizer,
{
    if settings.batch_size == 0 {
        return Err(crate::error::ConfigError::InvalidBatchSize(0).into());
    }
    let prompts: Vec<String> = match settings.format {
        SequenceFormat::EncoderDecoder => dataset.intents().to_vec(),
        SequenceFormat::Unified => dataset
            .intents()
            .iter()
            .map(|i| format!("{i} {}", dataset.separator()))
            .collect(),
    };
    let max_input = match settings.format {
        SequenceFormat::EncoderDecoder => settings.limits.max_intent_len,
        SequenceFormat::Unified => settings.limits.max_len,
    };

    let mut outputs = Vec::with_capacity(prompts.len());
    for chunk in prompts.chunks(settings.batch_size) {
        let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
        let input_ids = tokenizer.encode(&refs, max_input)?;
        let generated = model.generate(&input_ids, settings.max_length)?;
        outputs.extend(tokenizer.decode(&generated)?);
    }
    Ok(outputs)
}

/// Example-weighted mean of per-sample losses over one sequential pass
pub fn evaluate_loss<M, C>(model: &mut M, source: &mut BatchSource<C>) -> Result<f32>
where
    M: Seq2SeqModel,
    C: Collate<Batch = TokenBatch>,
{
    let losses = sample_losses(model, source)?;
    if losses.is_empty() {
        return Err(DataError::EmptyDataset.into());
    }
    Ok(losses.iter().sum::<f32>() / losses.len() as f32)
}

/// Per-sample losses aligned with the source dataset's order
pub fn sample_losses<M, C>(model: &mut M, source: &mut BatchSource<C>) -> Result<Vec<f32>>
where
    M: Seq2SeqModel,
    C: Collate<Batch = TokenBatch>,
{
    let mut losses = vec![0.0; source.len()];
    for batch in source.iter() {
        let batch = batch?;
        let batch_losses = model.sample_losses(&batch.batch)?;
        if batch_losses.len() != batch.len() {
            return Err(DataError::LengthMismatch {
                what: "sample losses",
                expected: batch.len(),
                actual: batch_losses.len(),
            }
            .into());
        }
        for (idx, loss) in batch.indices.iter().zip(batch_losses) {
            losses[*idx] = loss;
        }
    }
    Ok(losses)
}

/// Average test loss and perplexity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodeLoss {
    /// Mean per-example loss
    #[serde(rename = "avg loss")]
    pub avg_loss: f32,
    /// `exp(avg_loss)`
    pub perplexity: f32,
}

/// Outputs of a decode run
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport {
    /// One generated text per example
    pub outputs: Vec<String>,
    /// Loss summary written alongside
    pub loss: DecodeLoss,
}

/// Generate outputs for `dataset`, measure its loss and write both to `out_dir`
///
/// Writes `results.txt` (one output per line) and `decode_loss.json`.
pub fn decode<M, T>(
    model: &mut M,
    tokenizer: Arc<T>,
    dataset: &Dataset,
    settings: &GenerationSettings,
    out_dir: &Path,
) -> Result<DecodeReport>
where
    M: Seq2SeqModel,
    T: Tokenizer,
{
    let outputs = generate_outputs(model, tokenizer.as_ref(), dataset, settings)?;

    let collate = TokenCollate::new(
        tokenizer,
        settings.format,
        settings.limits,
        dataset.separator(),
    );
    let mut source = BatchSource::sequential(dataset.clone(), settings.batch_size, collate)?;
    let avg_loss = evaluate_loss(model, &mut source)?;
    let loss = DecodeLoss {
        avg_loss,
        perplexity: avg_loss.exp(),
    };

    fs::create_dir_all(out_dir)?;
    let mut text = outputs.join("\n");
    text.push('\n');
    fs::write(out_dir.join(RESULTS_FILE), text)?;
    fs::write(
        out_dir.join(DECODE_LOSS_FILE),
        serde_json::to_string_pretty(&loss)?,
    )?;

    tracing::info!(
        examples = outputs.len(),
        avg_loss,
        perplexity = loss.perplexity,
        dir = %out_dir.display(),
        "decoded"
    );
    Ok(DecodeReport { outputs, loss })
}
