//! Curriculum trainer
//!
//! [`CurriculumTrainer`] runs one inner training loop per curriculum phase
//! and records the losses of every loop in a [`History`](crate::train::History).
//!
//! - `core`: trainer state, accessors and batch sources
//! - `inner`: the epoch loop with dev evaluation, patience and checkpoints
//! - `modes`: no-curriculum, bucket, self-paced and dynamic strategies

mod core;
mod inner;
mod modes;

#[cfg(test)]
mod tests;

pub use self::core::{CurriculumTrainer, PhaseInfo};
