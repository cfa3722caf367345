//! Dev-set evaluation during training

use super::decode::{generate_outputs, GenerationSettings};
use crate::data::Dataset;
use crate::error::{DataError, Result};
use crate::model::{Scorer, Seq2SeqModel, Tokenizer};
use serde::{Deserialize, Serialize};

/// Per-example mean dev metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevMetrics {
    /// Mean BLEU against the gold utterances
    pub bleu: f32,
    /// Mean slot accuracy against the dialogue acts
    pub slot_accuracy: f32,
}

impl DevMetrics {
    /// Value tracked for early stopping (lower is better)
    pub fn eval_loss(&self) -> f32 {
        -self.bleu
    }
}

/// Generates dev outputs and scores them
pub struct DevEvaluator {
    dataset: Dataset,
    bleu: Box<dyn Scorer>,
    slot: Box<dyn Scorer>,
    settings: GenerationSettings,
}

impl DevEvaluator {
    /// Evaluator over `dataset` with the given BLEU and slot-accuracy scorers
    pub fn new(dataset: Dataset, bleu: Box<dyn Scorer>, slot: Box<dyn Scorer>) -> Result<Self> {
        if dataset.is_empty() {
            return Err(DataError::EmptyDataset.into());
        }
        Ok(Self {
            dataset,
            bleu,
            slot,
            settings: GenerationSettings::default(),
        })
    }

    /// Override generation settings
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Dev examples
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Generation settings in use
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generate for every dev intent and average both metrics
    pub fn evaluate<M, T>(&self, model: &mut M, tokenizer: &T) -> Result<DevMetrics>
    where
        M: Seq2SeqModel,
        T: Tokenizer,
    {
        let outputs = generate_outputs(model, tokenizer, &self.dataset, &self.settings)?;
        if outputs.len() != self.dataset.len() {
            return Err(DataError::LengthMismatch {
                what: "generated outputs",
                expected: self.dataset.len(),
                actual: outputs.len(),
            }
            .into());
        }

        let mut bleu = 0.0;
        let mut slot_accuracy = 0.0;
        for (output, (intent, utterance)) in outputs.iter().zip(self.dataset.iter()) {
            bleu += self.bleu.score(output, &[utterance]);
            slot_accuracy += self.slot.score(output, &[intent]);
        }
        let n = self.dataset.len() as f32;
        let metrics = DevMetrics {
            bleu: bleu / n,
            slot_accuracy: slot_accuracy / n,
        };
        tracing::debug!(
            bleu = metrics.bleu,
            slot_accuracy = metrics.slot_accuracy,
            bleu_scorer = self.bleu.name(),
            slot_scorer = self.slot.name(),
            "dev metrics"
        );
        Ok(metrics)
    }
}

impl std::fmt::Debug for DevEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevEvaluator")
            .field("examples", &self.dataset.len())
            .field("bleu", &self.bleu.name())
            .field("slot", &self.slot.name())
            .field("settings", &self.settings)
            .finish()
    }
}
