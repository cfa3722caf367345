//! Example difficulty scoring

use crate::dialog_act;
use serde::{Deserialize, Serialize};

/// Weight of one dialogue act relative to one slot in [`IntentSlotScorer`]
pub const ACT_WEIGHT: f32 = 100.0;

/// Maps an (intent, utterance) pair to a scalar difficulty
///
/// Higher scores are harder. Scores only need to induce an ordering.
pub trait DifficultyScorer {
    /// Difficulty of one example
    fn score(&self, intent: &str, utterance: &str) -> f32;

    /// Name of the scorer
    fn name(&self) -> &str;
}

/// Whitespace token count of intent plus utterance
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthScorer;

impl DifficultyScorer for LengthScorer {
    fn score(&self, intent: &str, utterance: &str) -> f32 {
        (intent.split_whitespace().count() + utterance.split_whitespace().count()) as f32
    }

    fn name(&self) -> &'static str {
        "length"
    }
}

/// Encodes the number of dialogue acts and slots in the intent
///
/// `acts * 100 + slots`: more acts is always harder, and slot count breaks
/// ties between intents with the same number of acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentSlotScorer;

impl DifficultyScorer for IntentSlotScorer {
    fn score(&self, intent: &str, _utterance: &str) -> f32 {
        let (acts, slots) = dialog_act::count_acts_and_slots(intent);
        acts as f32 * ACT_WEIGHT + slots as f32
    }

    fn name(&self) -> &'static str {
        "intent_slot"
    }
}

/// Scorer selection for configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyKind {
    /// [`LengthScorer`]
    Length,
    /// [`IntentSlotScorer`]
    #[default]
    IntentSlot,
}

impl DifficultyKind {
    /// Instantiate the scorer
    pub fn scorer(self) -> Box<dyn DifficultyScorer> {
        match self {
            Self::Length => Box::new(LengthScorer),
            Self::IntentSlot => Box::new(IntentSlotScorer),
        }
    }
}
