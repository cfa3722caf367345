//! One inner training loop over a batch source

use super::core::{CurriculumTrainer, PhaseInfo};
use crate::curriculum::SplRegularizer;
use crate::data::{BatchSource, Collate, TokenBatch};
use crate::error::{DataError, Result};
use crate::model::{Seq2SeqModel, Tokenizer};
use crate::train::callback::CallbackAction;
use crate::train::checkpoint::save_checkpoint;
use crate::train::early_stopping::{EarlyStopping, PatienceDecision};
use crate::train::history::RunLog;
use ndarray::Array1;

impl<M: Seq2SeqModel, T: Tokenizer> CurriculumTrainer<M, T> {
    /// Train for `config.epochs` epochs over `source`
    ///
    /// With a regularizer, each example's loss is weighted by the weight
    /// computed from its own loss in the previous epoch (1 in the first),
    /// and `lam` grows after every epoch. Checkpoints go to
    /// `config.output_dir` on dev improvement, or every epoch without a dev
    /// evaluator.
    pub fn train_source<C>(
        &mut self,
        source: &mut BatchSource<C>,
        phase: PhaseInfo,
        mut spl: Option<&mut SplRegularizer>,
    ) -> Result<RunLog>
    where
        C: Collate<Batch = TokenBatch>,
    {
        let n = source.len();
        let steps_per_epoch = source.num_batches();
        let mut log = RunLog::new();
        let mut patience =
            EarlyStopping::new(self.config.train_patience, self.config.patience_grace_epochs);
        let mut weights: Option<Array1<f32>> = spl.as_ref().map(|_| Array1::ones(n));

        for epoch in 0..self.config.epochs {
            let ctx = self.context(phase, epoch, 0, steps_per_epoch, 0.0);
            match self.callbacks.on_epoch_begin(&ctx) {
                CallbackAction::Stop => break,
                CallbackAction::SkipEpoch => continue,
                CallbackAction::Continue => {}
            }

            let mut epoch_sample_losses: Option<Array1<f32>> = weights.as_ref().map(|_| Array1::zeros(n));
            let mut loss_sum = 0.0f32;
            let mut examples = 0usize;
            let mut stop_requested = false;

            for (step, batch) in source.iter().enumerate() {
                let batch = batch?;
                let batch_weights: Option<Vec<f32>> = weights
                    .as_ref()
                    .map(|w| batch.indices.iter().map(|&i| w[i]).collect());
                let out = self.model.train_step(&batch.batch, batch_weights.as_deref())?;

                if let Some(losses) = epoch_sample_losses.as_mut() {
                    if out.sample_losses.len() != batch.len() {
                        return Err(DataError::LengthMismatch {
                            what: "sample losses",
                            expected: batch.len(),
                            actual: out.sample_losses.len(),
                        }
                        .into());
                    }
                    for (&i, &loss) in batch.indices.iter().zip(&out.sample_losses) {
                        losses[i] = loss;
                    }
                }

                log.record_batch(out.loss, batch.len());
                loss_sum += out.loss * batch.len() as f32;
                examples += batch.len();
                self.global_step += 1;

                let ctx = self.context(phase, epoch, step + 1, steps_per_epoch, out.loss);
                match self.callbacks.on_step_end(&ctx) {
                    CallbackAction::Stop => {
                        stop_requested = true;
                        break;
                    }
                    CallbackAction::SkipEpoch => break,
                    CallbackAction::Continue => {}
                }
            }

            let epoch_loss = loss_sum / examples.max(1) as f32;
            log.record_epoch(epoch_loss, examples);

            if let (Some(spl), Some(losses)) = (spl.as_deref_mut(), epoch_sample_losses.as_ref()) {
                weights = Some(spl.weights(losses.view()));
                spl.tighten();
                tracing::debug!(lam = spl.lam(), "self-paced threshold grown");
            }

            let mut ctx = self.context(phase, epoch, steps_per_epoch, steps_per_epoch, epoch_loss);
            let mut decision = PatienceDecision::Save;
            if let Some(evaluator) = self.evaluator.as_ref() {
                let metrics = evaluator.evaluate(&mut self.model, self.tokenizer.as_ref())?;
                let eval_loss = metrics.eval_loss();
                log.record_eval(eval_loss);
                decision = patience.observe(epoch, eval_loss);

                ctx.eval_loss = Some(eval_loss);
                ctx.best_eval_loss = patience.best_loss();
                if self.callbacks.on_validation(&ctx) == CallbackAction::Stop {
                    stop_requested = true;
                }
            }

            if decision == PatienceDecision::Save {
                save_checkpoint(
                    &self.config.output_dir,
                    &self.model,
                    self.tokenizer.as_ref(),
                    &self.config,
                )?;
            }

            if self.callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                stop_requested = true;
            }
            if decision == PatienceDecision::Stop || stop_requested {
                break;
            }
        }

        Ok(log)
    }
}
