//! Competence estimation from dev metrics

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Dev metrics of a fully trained reference model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMetrics {
    /// Reference BLEU
    pub bleu: f32,
    /// Reference slot accuracy
    pub slot_accuracy: f32,
}

/// Maps current dev metrics to a competence in `(0, 1]`
///
/// ```text
/// c_t = min(1, ((1 - alpha) * bleu_t / bleu_T + alpha * accu_t / accu_T) * (1 - c0) / beta + c0)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompetenceEstimator {
    c0: f32,
    alpha: f32,
    beta: f32,
    reference: ReferenceMetrics,
}

fn invalid(name: &'static str, value: f32, reason: &'static str) -> crate::Error {
    ConfigError::InvalidHyperparameter {
        name,
        value,
        reason,
    }
    .into()
}

impl CompetenceEstimator {
    /// Create an estimator
    pub fn new(c0: f32, alpha: f32, beta: f32, reference: ReferenceMetrics) -> Result<Self> {
        if !(c0 > 0.0 && c0 <= 1.0) {
            return Err(invalid("dcl_c0", c0, "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(invalid("dcl_alpha", alpha, "must be in [0, 1]"));
        }
        if !(beta > 0.0) {
            return Err(invalid("dcl_beta", beta, "must be > 0"));
        }
        if !(reference.bleu > 0.0) {
            return Err(invalid("ref_bleu", reference.bleu, "must be > 0"));
        }
        if !(reference.slot_accuracy > 0.0) {
            return Err(invalid("ref_accu", reference.slot_accuracy, "must be > 0"));
        }
        Ok(Self {
            c0,
            alpha,
            beta,
            reference,
        })
    }

    /// Competence before any dev evaluation
    pub fn initial(&self) -> f32 {
        self.c0
    }

    /// Competence implied by the current dev metrics
    pub fn update(&self, bleu: f32, slot_accuracy: f32) -> f32 {
        let progress = (1.0 - self.alpha) * bleu / self.reference.bleu
            + self.alpha * slot_accuracy / self.reference.slot_accuracy;
        (progress * (1.0 - self.c0) / self.beta + self.c0).min(1.0)
    }

    /// Reference metrics
    pub fn reference(&self) -> ReferenceMetrics {
        self.reference
    }
}
