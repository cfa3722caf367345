//! Deterministic collaborators for unit tests

use crate::data::TokenBatch;
use crate::error::Result;
use crate::model::{SavePretrained, Scorer, Seq2SeqModel, StepOutput, Tokenizer};
use std::fs;
use std::path::Path;

/// One id per byte (`byte + 1`), padded with 0
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteTokenizer;

impl SavePretrained for ByteTokenizer {
    fn save_pretrained(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join("tokenizer.txt"), "bytes")?;
        Ok(())
    }
}

impl Tokenizer for ByteTokenizer {
    fn encode(&self, texts: &[&str], max_length: usize) -> Result<Vec<Vec<u32>>> {
        let mut rows: Vec<Vec<u32>> = texts
            .iter()
            .map(|t| t.bytes().take(max_length).map(|b| u32::from(b) + 1).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, 0);
        }
        Ok(rows)
    }

    fn decode(&self, ids: &[Vec<u32>]) -> Result<Vec<String>> {
        Ok(ids
            .iter()
            .map(|row| {
                let bytes: Vec<u8> = row
                    .iter()
                    .filter(|&&id| id > 0)
                    .map(|&id| (id - 1) as u8)
                    .collect();
                String::from_utf8_lossy(&bytes).into_owned()
            })
            .collect())
    }
}

/// Model whose per-sample loss is the label length scaled by `1 / (1 + steps)`
///
/// `generate` echoes its input. Every call is recorded.
#[derive(Debug, Default)]
pub struct EchoModel {
    pub steps: usize,
    pub weights_seen: Vec<Option<Vec<f32>>>,
    pub batch_sizes: Vec<usize>,
    pub saves: usize,
}

impl EchoModel {
    fn losses(&self, batch: &TokenBatch) -> Vec<f32> {
        let scale = 1.0 / (1.0 + self.steps as f32);
        batch
            .labels
            .iter()
            .map(|row| row.iter().filter(|&&id| id > 0).count() as f32 * 0.01 * scale)
            .collect()
    }
}

impl SavePretrained for EchoModel {
    fn save_pretrained(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join("model.txt"), self.steps.to_string())?;
        Ok(())
    }
}

impl Seq2SeqModel for EchoModel {
    fn train_step(&mut self, batch: &TokenBatch, sample_weights: Option<&[f32]>) -> Result<StepOutput> {
        let sample_losses = self.losses(batch);
        let loss = match sample_weights {
            Some(w) => sample_losses.iter().zip(w).map(|(l, w)| l * w).sum::<f32>(),
            None => sample_losses.iter().sum::<f32>(),
        } / sample_losses.len().max(1) as f32;
        self.weights_seen.push(sample_weights.map(<[f32]>::to_vec));
        self.batch_sizes.push(batch.len());
        self.steps += 1;
        Ok(StepOutput {
            loss,
            sample_losses,
        })
    }

    fn sample_losses(&mut self, batch: &TokenBatch) -> Result<Vec<f32>> {
        Ok(self.losses(batch))
    }

    fn generate(&mut self, input_ids: &[Vec<u32>], max_length: usize) -> Result<Vec<Vec<u32>>> {
        Ok(input_ids
            .iter()
            .map(|row| row.iter().copied().take(max_length).collect())
            .collect())
    }
}

/// Fraction of candidate words that occur in the first reference
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapScorer;

impl Scorer for OverlapScorer {
    fn score(&self, candidate: &str, references: &[&str]) -> f32 {
        let Some(reference) = references.first() else {
            return f32::NAN;
        };
        let words: Vec<&str> = candidate.split_whitespace().collect();
        if words.is_empty() {
            return 0.0;
        }
        let hits = words
            .iter()
            .filter(|w| reference.split_whitespace().any(|r| r == **w))
            .count();
        hits as f32 / words.len() as f32
    }

    fn name(&self) -> &'static str {
        "overlap"
    }
}
