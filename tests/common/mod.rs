//! Shared collaborators for integration tests

#![allow(dead_code)]

use escalera::data::{Dataset, TokenBatch};
use escalera::{Result, SavePretrained, Scorer, Seq2SeqModel, StepOutput, Tokenizer};
use std::fs;
use std::path::Path;

/// One id per byte (`byte + 1`), padded with 0
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteTokenizer;

impl SavePretrained for ByteTokenizer {
    fn save_pretrained(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join("vocab.txt"), "bytes")?;
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

/// Deterministic model: per-sample loss is `label_tokens / 100 / (1 + steps)`
///
/// `generate` echoes the encoder input, so dev metrics stay constant.
#[derive(Debug, Default)]
pub struct DecayModel {
    pub steps: usize,
    pub examples_trained: usize,
    pub weighted_calls: usize,
}

impl DecayModel {
    fn losses(&self, batch: &TokenBatch) -> Vec<f32> {
        let scale = 1.0 / (1.0 + self.steps as f32);
        batch
            .labels
            .iter()
            .map(|row| row.iter().filter(|&&id| id > 0).count() as f32 / 100.0 * scale)
            .collect()
    }
}

impl SavePretrained for DecayModel {
    fn save_pretrained(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join("weights.txt"), self.steps.to_string())?;
        Ok(())
    }
}

impl Seq2SeqModel for DecayModel {
    fn train_step(
        &mut self,
        batch: &TokenBatch,
        sample_weights: Option<&[f32]>,
    ) -> Result<StepOutput> {
        let sample_losses = self.losses(batch);
        let weights = sample_weights.map_or_else(|| vec![1.0; sample_losses.len()], <[f32]>::to_vec);
        if sample_weights.is_some() {
            self.weighted_calls += 1;
        }
        let loss = sample_losses.iter().zip(&weights).map(|(l, w)| l * w).sum::<f32>()
            / sample_losses.len().max(1) as f32;
        self.steps += 1;
        self.examples_trained += batch.len();
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

    fn name(&self) -> &str {
        "overlap"
    }
}

/// `n` restaurant examples; example `i` informs `i % 4 + 1` slots
pub fn restaurant_data(n: usize) -> Dataset {
    let slots = ["name", "area", "food", "pricerange"];
    let pairs: Vec<(String, String)> = (0..n)
        .map(|i| {
            let used = &slots[..i % 4 + 1];
            let intent = used
                .iter()
                .map(|s| format!("{s} = v{i}"))
                .collect::<Vec<_>>()
                .join(" ; ");
            let utterance = used.iter().map(|_| format!("v{i}")).collect::<Vec<_>>().join(" and ");
            (format!("inform ( {intent} )"), utterance)
        })
        .collect();
    Dataset::from_pairs(pairs, "&")
}

/// Write a dataset as `intent & utterance` lines
pub fn write_joined(path: &Path, data: &Dataset) {
    let text: String = data
        .iter()
        .map(|(intent, utterance)| format!("{intent} & {utterance}\n"))
        .collect();
    fs::write(path, text).unwrap();
}
