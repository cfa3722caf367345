//! Core trainer struct and basic methods

use crate::data::{BatchSource, Collate, Dataset, TokenCollate};
use crate::error::Result;
use crate::eval::{DevEvaluator, GenerationSettings};
use crate::model::{Seq2SeqModel, Tokenizer};
use crate::train::callback::{CallbackContext, CallbackManager, TrainerCallback};
use crate::train::TrainConfig;
use std::sync::Arc;
use std::time::Instant;

/// Position of an inner loop within a curriculum
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseInfo {
    /// Phase index (0 without phases)
    pub index: usize,
    /// Total phases (1 without phases)
    pub total: usize,
    /// Competence of the phase (dynamic curriculum)
    pub competence: Option<f32>,
}

impl PhaseInfo {
    /// The single phase of an unphased run
    pub fn single() -> Self {
        Self {
            index: 0,
            total: 1,
            competence: None,
        }
    }
}

/// Drives a [`Seq2SeqModel`] through a curriculum
///
/// # Example
///
/// ```no_run
/// use escalera::train::{CurriculumTrainer, TrainConfig, ProgressCallback};
/// # fn run<M: escalera::Seq2SeqModel, T: escalera::Tokenizer>(
/// #     model: M, tokenizer: std::sync::Arc<T>, data: &escalera::data::Dataset,
/// # ) -> escalera::Result<()> {
/// let config = TrainConfig::new().with_epochs(3).with_output_dir("out");
/// let mut trainer = CurriculumTrainer::new(model, tokenizer, config);
/// trainer.add_callback(ProgressCallback::default());
/// let history = trainer.train(data)?;
/// # Ok(())
/// # }
/// ```
pub struct CurriculumTrainer<M, T> {
    pub(crate) model: M,
    pub(crate) tokenizer: Arc<T>,
    pub(crate) config: TrainConfig,
    pub(crate) callbacks: CallbackManager,
    pub(crate) evaluator: Option<DevEvaluator>,
    pub(crate) global_step: usize,
    pub(crate) start_time: Option<Instant>,
}

impl<M: Seq2SeqModel, T: Tokenizer> CurriculumTrainer<M, T> {
    /// Create a trainer
    pub fn new(model: M, tokenizer: Arc<T>, config: TrainConfig) -> Self {
        Self {
            model,
            tokenizer,
            config,
            callbacks: CallbackManager::new(),
            evaluator: None,
            global_step: 0,
            start_time: None,
        }
    }

    /// Evaluate on a dev set after every epoch
    ///
    /// The evaluator's generation settings are aligned with the config.
    pub fn with_evaluator(mut self, evaluator: DevEvaluator) -> Self {
        let settings = GenerationSettings {
            batch_size: self.config.eval_batch_size,
            format: self.config.format,
            limits: self.config.limits,
            max_length: self.config.max_generation_length,
        };
        self.evaluator = Some(evaluator.with_settings(settings));
        self
    }

    /// Add a callback to the trainer
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Training configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Model being trained
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Shared tokenizer
    pub fn tokenizer(&self) -> &Arc<T> {
        &self.tokenizer
    }

    /// Dev evaluator, if any
    pub fn evaluator(&self) -> Option<&DevEvaluator> {
        self.evaluator.as_ref()
    }

    /// Callback manager
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Optimizer steps taken so far
    pub fn global_step(&self) -> usize {
        self.global_step
    }

    /// Consume the trainer and return the model
    pub fn into_model(self) -> M {
        self.model
    }

    /// Tokenizing collate for `dataset`
    pub(crate) fn collate(&self, dataset: &Dataset) -> TokenCollate<T> {
        TokenCollate::new(
            Arc::clone(&self.tokenizer),
            self.config.format,
            self.config.limits,
            dataset.separator(),
        )
    }

    /// Shuffled training source, seeded when the config fixes a seed
    pub(crate) fn training_source<C: Collate>(
        &self,
        dataset: Dataset,
        collate: C,
    ) -> Result<BatchSource<C>> {
        let batch_size = self.config.train_batch_size;
        match self.config.seed {
            Some(seed) => BatchSource::seeded(dataset, batch_size, collate, seed),
            None => BatchSource::shuffled(dataset, batch_size, collate),
        }
    }

    /// Build callback context from current state
    pub(crate) fn context(
        &self,
        phase: PhaseInfo,
        epoch: usize,
        step: usize,
        steps_per_epoch: usize,
        loss: f32,
    ) -> CallbackContext {
        CallbackContext {
            phase: phase.index,
            num_phases: phase.total,
            epoch,
            max_epochs: self.config.epochs,
            step,
            steps_per_epoch,
            global_step: self.global_step,
            loss,
            best_eval_loss: None,
            eval_loss: None,
            competence: phase.competence,
            elapsed_secs: self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64()),
        }
    }
}
