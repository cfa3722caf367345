//! Static bucket curriculum
//!
//! Sorts a dataset by difficulty once, then slices the sorted order into
//! phases. One-pass phases are disjoint consecutive buckets; baby-step
//! phases are cumulative, each retraining on everything easier as well.

use super::difficulty::DifficultyScorer;
use crate::data::{BatchSource, Collate, Dataset};
use crate::error::{ConfigError, DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::str::FromStr;

/// How phases are cut from the sorted dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketPolicy {
    /// Disjoint consecutive buckets
    OnePass,
    /// Bucket `k` is the union of buckets `0..=k`
    BabyStep,
}

impl BucketPolicy {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnePass => "one_pass",
            Self::BabyStep => "baby_step",
        }
    }
}

impl FromStr for BucketPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "one_pass" => Ok(Self::OnePass),
            "baby_step" => Ok(Self::BabyStep),
            other => Err(ConfigError::InvalidPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for BucketPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase index ranges over `dataset_len` sorted examples
///
/// `bucket_size = floor(len / num_buckets)` and there are
/// `ceil(len / bucket_size)` phases: exactly `num_buckets` when the length
/// divides evenly, one more holding the remainder otherwise. The last phase
/// always ends at `dataset_len`, so no example is dropped.
pub fn phase_ranges(
    dataset_len: usize,
    num_buckets: usize,
    policy: BucketPolicy,
) -> Result<Vec<Range<usize>>> {
    if num_buckets == 0 || num_buckets > dataset_len {
        return Err(ConfigError::InvalidBucketCount {
            num_buckets,
            dataset_len,
        }
        .into());
    }

    let bucket_size = dataset_len / num_buckets;
    let num_phases = dataset_len.div_ceil(bucket_size);

    Ok((0..num_phases)
        .map(|b| {
            let end = ((b + 1) * bucket_size).min(dataset_len);
            match policy {
                BucketPolicy::OnePass => b * bucket_size..end,
                BucketPolicy::BabyStep => 0..end,
            }
        })
        .collect())
}

/// Dataset sorted by ascending difficulty, ready to be cut into phases
#[derive(Debug, Clone)]
pub struct BucketCurriculum {
    sorted: Dataset,
    difficulties: Vec<f32>,
}

impl BucketCurriculum {
    /// Score every example with `scorer` and sort
    pub fn new(dataset: Dataset, scorer: &dyn DifficultyScorer) -> Self {
        let difficulties: Vec<f32> = dataset
            .iter()
            .map(|(intent, utterance)| scorer.score(intent, utterance))
            .collect();
        tracing::debug!(scorer = scorer.name(), examples = dataset.len(), "scored dataset");
        Self::sorted(dataset, difficulties)
    }

    /// Sort by a precomputed difficulty vector aligned with `dataset`
    pub fn from_difficulties(dataset: Dataset, difficulties: Vec<f32>) -> Result<Self> {
        if difficulties.len() != dataset.len() {
            return Err(DataError::LengthMismatch {
                what: "difficulties",
                expected: dataset.len(),
                actual: difficulties.len(),
            }
            .into());
        }
        Ok(Self::sorted(dataset, difficulties))
    }

    fn sorted(dataset: Dataset, difficulties: Vec<f32>) -> Self {
        // Stable: ties keep their original order
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.sort_by(|&a, &b| difficulties[a].total_cmp(&difficulties[b]));

        Self {
            sorted: dataset.select(&order),
            difficulties: order.iter().map(|&i| difficulties[i]).collect(),
        }
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Whether there are no examples
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Examples in ascending difficulty
    pub fn dataset(&self) -> &Dataset {
        &self.sorted
    }

    /// Difficulties in ascending order, aligned with [`Self::dataset`]
    pub fn difficulties(&self) -> &[f32] {
        &self.difficulties
    }

    /// Phase ranges over the sorted examples
    pub fn phase_ranges(&self, num_buckets: usize, policy: BucketPolicy) -> Result<Vec<Range<usize>>> {
        phase_ranges(self.len(), num_buckets, policy)
    }

    /// Lazily build one shuffled batch source per phase
    ///
    /// The returned iterator is finite and can be cloned to replay the same
    /// phases. Each item is the phase's batch source and its example count.
    pub fn generate<C: Collate + Clone>(
        &self,
        num_buckets: usize,
        batch_size: usize,
        policy: BucketPolicy,
        collate: C,
    ) -> Result<CurriculumIter<'_, C>> {
        let batch_size =
            NonZeroUsize::new(batch_size).ok_or(ConfigError::InvalidBatchSize(batch_size))?;
        let ranges = self.phase_ranges(num_buckets, policy)?;

        tracing::info!("Number of instances={}", self.len());
        tracing::info!("Total Number of curriculums={}", ranges.len());

        Ok(CurriculumIter {
            curriculum: self,
            ranges,
            next: 0,
            batch_size,
            collate,
            seed: None,
        })
    }
}

/// Phases of a [`BucketCurriculum`], produced on demand
#[derive(Clone)]
pub struct CurriculumIter<'a, C> {
    curriculum: &'a BucketCurriculum,
    ranges: Vec<Range<usize>>,
    next: usize,
    batch_size: NonZeroUsize,
    collate: C,
    seed: Option<u64>,
}

impl<C> CurriculumIter<'_, C> {
    /// Seed each phase's shuffling (phase `b` uses `seed + b`, wrapping)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Remaining phase ranges
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges[self.next..]
    }
}

impl<C: Collate + Clone> Iterator for CurriculumIter<'_, C> {
    type Item = (BatchSource<C>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.ranges.get(self.next)?.clone();
        let phase = self.next as u64;
        self.next += 1;

        let subset = self.curriculum.sorted.subset(range);
        let size = subset.len();
        let seed = self.seed.map(|seed| seed.wrapping_add(phase));
        let source =
            BatchSource::shuffled_with(subset, self.batch_size, self.collate.clone(), seed);
        Some((source, size))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ranges.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<C: Collate + Clone> ExactSizeIterator for CurriculumIter<'_, C> {}
