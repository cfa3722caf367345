//! Curriculum training loop
//!
//! This module provides:
//! - Training configuration with named curriculum modes
//! - The [`CurriculumTrainer`] and its inner epoch loop
//! - Dev-loss patience tracking
//! - Checkpoint persistence
//! - Flat and phased run histories
//! - Callback hooks
//!
//! # Example
//!
//! ```no_run
//! use escalera::train::{CurriculumMode, CurriculumTrainer, TrainConfig};
//! # fn run<M: escalera::Seq2SeqModel, T: escalera::Tokenizer>(
//! #     model: M, tokenizer: std::sync::Arc<T>, data: &escalera::data::Dataset,
//! # ) -> escalera::Result<()> {
//! let config = TrainConfig::new()
//!     .with_curriculum("one_pass".parse::<CurriculumMode>()?)
//!     .with_num_buckets(5);
//!
//! let mut trainer = CurriculumTrainer::new(model, tokenizer, config);
//! let history = trainer.train(data)?;
//! println!("{:?}", history.summary());
//! # Ok(())
//! # }
//! ```

pub mod callback;
mod checkpoint;
mod config;
mod early_stopping;
mod history;
mod trainer;

pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, ProgressCallback, TrainerCallback,
};
pub use checkpoint::{load_training_args, save_checkpoint, TrainingArgs, TRAINING_ARGS_FILE};
pub use config::{CurriculumMode, DynamicParams, SplParams, TrainConfig};
pub use early_stopping::{EarlyStopping, PatienceDecision};
pub use history::{History, HistorySummary, PhasedHistory, RunLog, HISTORY_FILE};
pub use trainer::{CurriculumTrainer, PhaseInfo};
