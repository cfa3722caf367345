//! Text metrics computed in-crate

use crate::dialog_act;
use crate::error::{DataError, Result};
use crate::model::Scorer;

/// Fraction of the reference act's slot values that appear in the candidate
///
/// The reference is a dialogue-act string. Matching is a case-insensitive
/// substring test. Value-less slots and special values (`dont_care`, `?`,
/// ...) are not checked; an act with nothing to check scores 1. With several
/// references the best score counts, and no references gives NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotAccuracy;

impl SlotAccuracy {
    fn score_one(candidate: &str, reference: &str) -> f32 {
        let values: Vec<String> = dialog_act::parse(reference)
            .into_iter()
            .flat_map(|act| act.slots)
            .filter(|slot| slot.is_realisable())
            .filter_map(|slot| slot.value.map(|v| v.to_lowercase()))
            .collect();
        if values.is_empty() {
            return 1.0;
        }
        let hits = values.iter().filter(|v| candidate.contains(v.as_str())).count();
        hits as f32 / values.len() as f32
    }
}

impl Scorer for SlotAccuracy {
    fn score(&self, candidate: &str, references: &[&str]) -> f32 {
        let candidate = candidate.to_lowercase();
        references
            .iter()
            .map(|r| Self::score_one(&candidate, r))
            .reduce(f32::max)
            .unwrap_or(f32::NAN)
    }

    fn name(&self) -> &'static str {
        "slot_accuracy"
    }
}

/// Mean per-example score of `candidates` against aligned single references
pub fn score_corpus<A, B>(candidates: &[A], references: &[B], scorer: &dyn Scorer) -> Result<f32>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    if candidates.len() != references.len() {
        return Err(DataError::LengthMismatch {
            what: "references",
            expected: candidates.len(),
            actual: references.len(),
        }
        .into());
    }
    if candidates.is_empty() {
        return Err(DataError::EmptyDataset.into());
    }
    let total: f32 = candidates
        .iter()
        .zip(references)
        .map(|(c, r)| scorer.score(c.as_ref(), &[r.as_ref()]))
        .sum();
    Ok(total / candidates.len() as f32)
}
