//! Competence-driven curriculum
//!
//! Difficulty is re-estimated every phase from the model's own per-sample
//! losses, and the phase trains on every example whose difficulty falls
//! under the competence quantile.

use crate::data::{BatchSource, Collate, Dataset};
use crate::error::{ConfigError, DataError, Result};
use std::collections::VecDeque;

fn check_competence(competence: f32) -> Result<()> {
    if competence > 0.0 && competence <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCompetence(competence).into())
    }
}

/// `q`-quantile of `values` with linear interpolation between order statistics
///
/// NaN sorts last (`total_cmp`). Returns NaN for an empty slice.
pub fn quantile(values: &[f32], q: f32) -> f32 {
    if values.is_empty() {
        return f32::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f32;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Full training set with per-phase subset selection
#[derive(Debug, Clone)]
pub struct DynamicCurriculum {
    dataset: Dataset,
    seed: Option<u64>,
}

impl DynamicCurriculum {
    /// Wrap the full dataset; it is never reordered
    pub fn new(dataset: Dataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(DataError::EmptyDataset.into());
        }
        Ok(Self {
            dataset,
            seed: None,
        })
    }

    /// Make phase shuffling deterministic
    ///
    /// The shuffle seed of a phase is derived from `seed` and the competence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Full dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn check_difficulties(&self, difficulties: &[f32]) -> Result<()> {
        if difficulties.len() != self.dataset.len() {
            return Err(DataError::LengthMismatch {
                what: "difficulties",
                expected: self.dataset.len(),
                actual: difficulties.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Difficulty cut-off for `competence`
    pub fn threshold(&self, difficulties: &[f32], competence: f32) -> Result<f32> {
        check_competence(competence)?;
        self.check_difficulties(difficulties)?;
        Ok(quantile(difficulties, competence))
    }

    /// Indices of examples at or below the threshold, in dataset order
    pub fn select(&self, difficulties: &[f32], competence: f32) -> Result<Vec<usize>> {
        let threshold = self.threshold(difficulties, competence)?;
        Ok(difficulties
            .iter()
            .enumerate()
            .filter(|(_, d)| **d <= threshold)
            .map(|(i, _)| i)
            .collect())
    }

    /// Shuffled batch source over this phase's selection
    pub fn phase_batches<C: Collate>(
        &self,
        difficulties: &[f32],
        competence: f32,
        batch_size: usize,
        collate: C,
    ) -> Result<BatchSource<C>> {
        let selected = self.select(difficulties, competence)?;
        if selected.is_empty() {
            tracing::warn!(competence, "no example at or below the difficulty threshold");
        }
        tracing::info!(
            competence,
            selected = selected.len(),
            total = self.dataset.len(),
            "selected phase subset"
        );
        let subset = self.dataset.select(&selected);
        match self.seed {
            Some(seed) => BatchSource::seeded(
                subset,
                batch_size,
                collate,
                seed ^ u64::from(competence.to_bits()),
            ),
            None => BatchSource::shuffled(subset, batch_size, collate),
        }
    }
}

/// Sliding window of per-sample loss snapshots
///
/// During the first `a` phases the difficulty is the raw loss. After that it
/// is the relative change against the snapshot taken `a` phases earlier.
#[derive(Debug, Clone)]
pub struct LossWindow {
    a: usize,
    snapshots: VecDeque<Vec<f32>>,
}

impl LossWindow {
    /// Window looking back `a` phases
    pub fn new(a: usize) -> Result<Self> {
        if a == 0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "dcl_a",
                value: 0.0,
                reason: "must be >= 1",
            }
            .into());
        }
        Ok(Self {
            a,
            snapshots: VecDeque::with_capacity(a + 1),
        })
    }

    /// Look-back distance
    pub fn lookback(&self) -> usize {
        self.a
    }

    /// Record this phase's losses and return the difficulties they imply
    pub fn observe(&mut self, losses: Vec<f32>) -> Result<Vec<f32>> {
        if let Some(prev) = self.snapshots.back() {
            if prev.len() != losses.len() {
                return Err(DataError::LengthMismatch {
                    what: "sample losses",
                    expected: prev.len(),
                    actual: losses.len(),
                }
                .into());
            }
        }

        let difficulties = if self.snapshots.len() < self.a {
            losses.clone()
        } else {
            let past = &self.snapshots[self.snapshots.len() - self.a];
            losses
                .iter()
                .zip(past)
                .map(|(now, then)| (now - then) / then)
                .collect()
        };

        self.snapshots.push_back(losses);
        while self.snapshots.len() > self.a {
            self.snapshots.pop_front();
        }
        Ok(difficulties)
    }
}
