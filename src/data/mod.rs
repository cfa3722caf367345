//! Training data: loading, batch formatting and batch sources
//!
//! - [`Dataset`]: immutable (intent, utterance) pairs plus separator
//! - [`Collate`]: batch formatting (tokenized or raw pairs)
//! - [`BatchSource`]: shuffled or sequential batches carrying example indices

mod collate;
mod dataset;
mod loader;


pub use collate::{Collate, PairCollate, SequenceFormat, SequenceLimits, TokenBatch, TokenCollate};
pub use dataset::{join_pair, DataSource, Dataset, DEFAULT_SEPARATOR};
pub use loader::{BatchSource, Batches, IndexedBatch};
