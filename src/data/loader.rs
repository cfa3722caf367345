//! Batch sources over a dataset

use super::collate::Collate;
use super::dataset::Dataset;
use crate::error::{ConfigError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::num::NonZeroUsize;

/// A formatted batch together with the dataset indices it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedBatch<B> {
    /// Positions of the batch's examples in the source dataset
    pub indices: Vec<usize>,
    /// Formatted batch
    pub batch: B,
}

impl<B> IndexedBatch<B> {
    /// Number of examples
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Produces fixed-size batches over a dataset
///
/// A shuffled source draws a fresh permutation on every pass; a sequential
/// source always walks the dataset in order. The final short batch is kept.
#[derive(Clone)]
pub struct BatchSource<C> {
    dataset: Dataset,
    batch_size: usize,
    collate: C,
    rng: Option<StdRng>,
}

impl<C: Collate> BatchSource<C> {
    /// Shuffled source seeded from the OS
    pub fn shuffled(dataset: Dataset, batch_size: usize, collate: C) -> Result<Self> {
        Self::build(dataset, batch_size, collate, Some(StdRng::from_os_rng()))
    }

    /// Shuffled source with a fixed seed
    pub fn seeded(dataset: Dataset, batch_size: usize, collate: C, seed: u64) -> Result<Self> {
        Self::build(dataset, batch_size, collate, Some(StdRng::seed_from_u64(seed)))
    }

    /// In-order source
    pub fn sequential(dataset: Dataset, batch_size: usize, collate: C) -> Result<Self> {
        Self::build(dataset, batch_size, collate, None)
    }

    /// Shuffled source whose batch size is known to be non-zero
    pub(crate) fn shuffled_with(
        dataset: Dataset,
        batch_size: NonZeroUsize,
        collate: C,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            dataset,
            batch_size: batch_size.get(),
            collate,
            rng: Some(rng),
        }
    }

    fn build(dataset: Dataset, batch_size: usize, collate: C, rng: Option<StdRng>) -> Result<Self> {
        if batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(batch_size).into());
        }
        Ok(Self {
            dataset,
            batch_size,
            collate,
            rng,
        })
    }

    /// Underlying dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether the source holds no examples
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Configured batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches per pass
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Example order for the next pass
    fn next_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if let Some(rng) = self.rng.as_mut() {
            order.shuffle(rng);
        }
        order
    }

    /// Start a new pass over the dataset
    pub fn iter(&mut self) -> Batches<'_, C> {
        let order = self.next_order();
        Batches {
            source: self,
            order,
            cursor: 0,
        }
    }
}

/// One pass over a [`BatchSource`]
pub struct Batches<'a, C> {
    source: &'a BatchSource<C>,
    order: Vec<usize>,
    cursor: usize,
}

impl<C: Collate> Iterator for Batches<'_, C> {
    type Item = Result<IndexedBatch<C::Batch>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.source.batch_size).min(self.order.len());
        let indices = self.order[self.cursor..end].to_vec();
        self.cursor = end;

        let dataset = &self.source.dataset;
        let examples: Vec<(&str, &str)> =
            indices.iter().filter_map(|&i| dataset.get(i)).collect();
        Some(
            self.source
                .collate
                .collate(&examples)
                .map(|batch| IndexedBatch { indices, batch }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.source.batch_size);
        (remaining, Some(remaining))
    }
}

impl<C: Collate> ExactSizeIterator for Batches<'_, C> {}
