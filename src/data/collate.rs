//! Batch formatting
//!
//! A [`Collate`] turns a slice of (intent, utterance) pairs into whatever the
//! model consumes. [`TokenCollate`] covers the two sequence formats used for
//! training; [`PairCollate`] keeps raw strings.

use super::dataset::join_pair;
use crate::error::Result;
use crate::model::Tokenizer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Formats a group of examples into one batch
pub trait Collate {
    /// Batch type produced
    type Batch;

    /// Format the examples into a batch
    fn collate(&self, examples: &[(&str, &str)]) -> Result<Self::Batch>;
}

/// Tokenized batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    /// Padded input ids, one row per example
    pub input_ids: Vec<Vec<u32>>,
    /// Padded label ids, one row per example
    pub labels: Vec<Vec<u32>>,
}

impl TokenBatch {
    /// Number of examples
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// How an example is laid out for the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceFormat {
    /// Intent is the encoder input, utterance the decoder label
    #[default]
    EncoderDecoder,
    /// `intent <sep> utterance` is both input and label
    Unified,
}

/// Sequence length limits applied while tokenizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceLimits {
    /// Max intent tokens (encoder-decoder)
    pub max_intent_len: usize,
    /// Max utterance tokens (encoder-decoder)
    pub max_utter_len: usize,
    /// Max joined tokens (unified)
    pub max_len: usize,
}

impl Default for SequenceLimits {
    fn default() -> Self {
        Self {
            max_intent_len: 40,
            max_utter_len: 60,
            max_len: 80,
        }
    }
}

/// Tokenizing collate for either sequence format
pub struct TokenCollate<T> {
    tokenizer: Arc<T>,
    format: SequenceFormat,
    limits: SequenceLimits,
    separator: String,
}

impl<T> Clone for TokenCollate<T> {
    fn clone(&self) -> Self {
        Self {
            tokenizer: Arc::clone(&self.tokenizer),
            format: self.format,
            limits: self.limits,
            separator: self.separator.clone(),
        }
    }
}

impl<T: Tokenizer> TokenCollate<T> {
    /// Create a collate for `format` using `separator` for the unified layout
    pub fn new(
        tokenizer: Arc<T>,
        format: SequenceFormat,
        limits: SequenceLimits,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            tokenizer,
            format,
            limits,
            separator: separator.into(),
        }
    }

    /// Sequence format in use
    pub fn format(&self) -> SequenceFormat {
        self.format
    }
}

impl<T: Tokenizer> Collate for TokenCollate<T> {
    type Batch = TokenBatch;

    fn collate(&self, examples: &[(&str, &str)]) -> Result<TokenBatch> {
        match self.format {
            SequenceFormat::EncoderDecoder => {
                let (intents, utterances): (Vec<&str>, Vec<&str>) =
                    examples.iter().copied().unzip();
                Ok(TokenBatch {
                    input_ids: self.tokenizer.encode(&intents, self.limits.max_intent_len)?,
                    labels: self.tokenizer.encode(&utterances, self.limits.max_utter_len)?,
                })
            }
            SequenceFormat::Unified => {
                let joined: Vec<String> = examples
                    .iter()
                    .map(|(i, u)| join_pair(i, u, &self.separator))
                    .collect();
                let refs: Vec<&str> = joined.iter().map(String::as_str).collect();
                let ids = self.tokenizer.encode(&refs, self.limits.max_len)?;
                Ok(TokenBatch {
                    input_ids: ids.clone(),
                    labels: ids,
                })
            }
        }
    }
}

/// Collate that keeps owned (intent, utterance) pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct PairCollate;

impl Collate for PairCollate {
    type Batch = Vec<(String, String)>;

    fn collate(&self, examples: &[(&str, &str)]) -> Result<Self::Batch> {
        Ok(examples
            .iter()
            .map(|(i, u)| ((*i).to_string(), (*u).to_string()))
            .collect())
    }
}
