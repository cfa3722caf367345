//! Persisted training history
//!
//! Field names match the run logs consumed by the plotting scripts:
//! `batch_losses`, `batch_ex_seen`, `epoch_losses`, `epoch_ex_seen` and
//! `eval_losses` (negated dev BLEU). Single-loop runs store flat lists;
//! phased runs store one inner list per phase.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name inside the output directory
pub const HISTORY_FILE: &str = "history.json";

/// JSON has no NaN: non-finite values are written as `null` and read back as NaN
mod float_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f32>, D::Error> {
        let values = Vec::<Option<f32>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
    }
}

mod nested_float_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[Vec<f32>], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|phase| {
                phase
                    .iter()
                    .map(|v| v.is_finite().then_some(*v))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<f32>>, D::Error> {
        let values = Vec::<Vec<Option<f32>>>::deserialize(deserializer)?;
        Ok(values
            .into_iter()
            .map(|phase| phase.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
            .collect())
    }
}

/// History of one inner training loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunLog {
    /// Loss of every batch
    #[serde(with = "float_list")]
    pub batch_losses: Vec<f32>,
    /// Examples in every batch
    pub batch_ex_seen: Vec<usize>,
    /// Example-weighted mean loss of every epoch
    #[serde(with = "float_list")]
    pub epoch_losses: Vec<f32>,
    /// Examples seen in every epoch
    pub epoch_ex_seen: Vec<usize>,
    /// Negated dev BLEU after every evaluated epoch
    #[serde(with = "float_list")]
    pub eval_losses: Vec<f32>,
}

impl RunLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch
    pub fn record_batch(&mut self, loss: f32, examples: usize) {
        self.batch_losses.push(loss);
        self.batch_ex_seen.push(examples);
    }

    /// Record one epoch
    pub fn record_epoch(&mut self, loss: f32, examples: usize) {
        self.epoch_losses.push(loss);
        self.epoch_ex_seen.push(examples);
    }

    /// Record one dev evaluation
    pub fn record_eval(&mut self, eval_loss: f32) {
        self.eval_losses.push(eval_loss);
    }

    /// Number of completed epochs
    pub fn epochs(&self) -> usize {
        self.epoch_losses.len()
    }
}

/// History of a phased run, one inner list per phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhasedHistory {
    /// Per-phase batch losses
    #[serde(with = "nested_float_list")]
    pub batch_losses: Vec<Vec<f32>>,
    /// Per-phase batch sizes
    pub batch_ex_seen: Vec<Vec<usize>>,
    /// Per-phase epoch losses
    #[serde(with = "nested_float_list")]
    pub epoch_losses: Vec<Vec<f32>>,
    /// Per-phase epoch example counts
    pub epoch_ex_seen: Vec<Vec<usize>>,
    /// Per-phase dev losses
    #[serde(with = "nested_float_list")]
    pub eval_losses: Vec<Vec<f32>>,
    /// Competence used for each phase (dynamic runs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competence: Option<Vec<f32>>,
}

impl PhasedHistory {
    /// Empty history; `with_competence` adds the competence trajectory
    pub fn new(with_competence: bool) -> Self {
        Self {
            competence: with_competence.then(Vec::new),
            ..Self::default()
        }
    }

    /// Append a finished phase
    pub fn push_phase(&mut self, run: RunLog) {
        self.batch_losses.push(run.batch_losses);
        self.batch_ex_seen.push(run.batch_ex_seen);
        self.epoch_losses.push(run.epoch_losses);
        self.epoch_ex_seen.push(run.epoch_ex_seen);
        self.eval_losses.push(run.eval_losses);
    }

    /// Append a competence value (no-op for non-dynamic histories)
    pub fn push_competence(&mut self, competence: f32) {
        if let Some(c) = self.competence.as_mut() {
            c.push(competence);
        }
    }

    /// Number of phases recorded
    pub fn phases(&self) -> usize {
        self.epoch_losses.len()
    }
}

/// Either history shape
///
/// A phased history with no phases serializes like an empty flat one and
/// loads back as [`History::Flat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum History {
    /// Single inner loop
    Flat(RunLog),
    /// One inner loop per phase
    Phased(PhasedHistory),
}

/// Headline numbers of a history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistorySummary {
    /// Phases (1 for flat runs)
    pub phases: usize,
    /// Epochs across all phases
    pub epochs: usize,
    /// Batches across all phases
    pub batches: usize,
    /// Examples seen across all epochs
    pub examples_seen: usize,
    /// Loss of the last epoch
    pub final_epoch_loss: Option<f32>,
    /// Lowest dev loss (NaN entries ignored)
    pub best_eval_loss: Option<f32>,
}

fn min_ignoring_nan<'a>(values: impl Iterator<Item = &'a f32>) -> Option<f32> {
    values.copied().filter(|v| !v.is_nan()).reduce(f32::min)
}

impl History {
    /// Write as JSON indented with four spaces
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, buf)?;
        Ok(())
    }

    /// Read a history written by [`History::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Whether the history is per phase
    pub fn is_phased(&self) -> bool {
        matches!(self, Self::Phased(_))
    }

    /// Headline numbers
    pub fn summary(&self) -> HistorySummary {
        match self {
            Self::Flat(run) => HistorySummary {
                phases: 1,
                epochs: run.epochs(),
                batches: run.batch_losses.len(),
                examples_seen: run.epoch_ex_seen.iter().sum(),
                final_epoch_loss: run.epoch_losses.last().copied(),
                best_eval_loss: min_ignoring_nan(run.eval_losses.iter()),
            },
            Self::Phased(h) => HistorySummary {
                phases: h.phases(),
                epochs: h.epoch_losses.iter().map(Vec::len).sum(),
                batches: h.batch_losses.iter().map(Vec::len).sum(),
                examples_seen: h.epoch_ex_seen.iter().flatten().sum(),
                final_epoch_loss: h.epoch_losses.iter().rev().find_map(|p| p.last().copied()),
                best_eval_loss: min_ignoring_nan(h.eval_losses.iter().flatten()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(offset: f32) -> RunLog {
        let mut log = RunLog::new();
        log.record_batch(1.0 + offset, 2);
        log.record_batch(0.5 + offset, 1);
        log.record_epoch(0.75 + offset, 3);
        log.record_eval(-0.1 - offset);
        log
    }

    #[test]
    fn test_flat_json_shape() {
        let json = serde_json::to_value(History::Flat(run(0.0))).unwrap();
        assert_eq!(json["batch_ex_seen"], serde_json::json!([2, 1]));
        assert_eq!(json["epoch_losses"], serde_json::json!([0.75]));
        assert!(json.get("competence").is_none());
    }

    #[test]
    fn test_phased_round_trip_with_competence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);

        let mut phased = PhasedHistory::new(true);
        phased.push_competence(0.2);
        phased.push_phase(run(0.0));
        phased.push_competence(0.6);
        phased.push_phase(run(1.0));
        let history = History::Phased(phased);

        history.save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"batch_losses\""));

        assert_eq!(History::load(&path).unwrap(), history);
    }

    #[test]
    fn test_nan_eval_loss_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        let mut log = run(0.0);
        log.record_eval(f32::NAN);
        History::Flat(log).save(&path).unwrap();

        let History::Flat(back) = History::load(&path).unwrap() else {
            panic!("expected flat history");
        };
        assert!(back.eval_losses[1].is_nan());
        assert_eq!(back.eval_losses[0], -0.1);
    }

    #[test]
    fn test_push_competence_ignored_without_trajectory() {
        let mut phased = PhasedHistory::new(false);
        phased.push_competence(0.5);
        assert!(phased.competence.is_none());
    }

    #[test]
    fn test_summary() {
        let mut phased = PhasedHistory::new(false);
        phased.push_phase(run(0.0));
        phased.push_phase(run(1.0));
        let summary = History::Phased(phased).summary();
        assert_eq!(summary.phases, 2);
        assert_eq!(summary.epochs, 2);
        assert_eq!(summary.batches, 4);
        assert_eq!(summary.examples_seen, 6);
        assert_eq!(summary.final_epoch_loss, Some(1.75));
        assert_eq!(summary.best_eval_loss, Some(-1.1));
    }
}
