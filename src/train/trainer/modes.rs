//! Curriculum strategies built on the inner loop

use super::core::{CurriculumTrainer, PhaseInfo};
use crate::curriculum::{
    BucketCurriculum, BucketPolicy, CompetenceEstimator, DynamicCurriculum, LossWindow,
    SplRegularizer, SplVariant,
};
use crate::data::{BatchSource, Dataset};
use crate::error::{ConfigError, Result};
use crate::eval::sample_losses;
use crate::model::{Seq2SeqModel, Tokenizer};
use crate::train::callback::CallbackAction;
use crate::train::history::{History, PhasedHistory, HISTORY_FILE};
use crate::train::CurriculumMode;
use std::time::Instant;

impl<M: Seq2SeqModel, T: Tokenizer> CurriculumTrainer<M, T> {
    /// Train on `dataset` with the configured curriculum
    ///
    /// The history is returned and written to `{output_dir}/history.json`.
    pub fn train(&mut self, dataset: &Dataset) -> Result<History> {
        self.start_time = Some(Instant::now());
        tracing::info!(
            curriculum = %self.config.curriculum,
            examples = dataset.len(),
            epochs = self.config.epochs,
            "starting training"
        );

        let ctx = self.context(PhaseInfo::single(), 0, 0, 0, 0.0);
        if self.callbacks.on_train_begin(&ctx) == CallbackAction::Stop {
            return Ok(History::Flat(Default::default()));
        }

        let history = match self.config.curriculum {
            CurriculumMode::NoCurriculum => self.train_plain(dataset)?,
            CurriculumMode::Bucket(policy) => self.train_buckets(dataset, policy)?,
            CurriculumMode::SelfPaced(variant) => self.train_self_paced(dataset, variant)?,
            CurriculumMode::Dynamic => self.train_dynamic(dataset)?,
        };

        let ctx = self.context(PhaseInfo::single(), self.config.epochs, 0, 0, 0.0);
        self.callbacks.on_train_end(&ctx);

        history.save(&self.config.output_dir.join(HISTORY_FILE))?;
        Ok(history)
    }

    fn train_plain(&mut self, dataset: &Dataset) -> Result<History> {
        let collate = self.collate(dataset);
        let mut source = self.training_source(dataset.clone(), collate)?;
        let log = self.train_source(&mut source, PhaseInfo::single(), None)?;
        Ok(History::Flat(log))
    }

    fn train_self_paced(&mut self, dataset: &Dataset, variant: SplVariant) -> Result<History> {
        let params = self.config.spl;
        let mut spl = SplRegularizer::from_name(variant.as_str(), params.lam, params.gam)?;
        tracing::info!(variant = %variant, lam = params.lam, "self-paced learning");

        let collate = self.collate(dataset);
        let mut source = self.training_source(dataset.clone(), collate)?;
        let log = self.train_source(&mut source, PhaseInfo::single(), Some(&mut spl))?;
        Ok(History::Flat(log))
    }

    fn train_buckets(&mut self, dataset: &Dataset, policy: BucketPolicy) -> Result<History> {
        let scorer = self.config.difficulty.scorer();
        let curriculum = BucketCurriculum::new(dataset.clone(), scorer.as_ref());
        let collate = self.collate(dataset);

        let mut phases = curriculum.generate(
            self.config.num_buckets,
            self.config.train_batch_size,
            policy,
            collate,
        )?;
        if let Some(seed) = self.config.seed {
            phases = phases.with_seed(seed);
        }

        let total = phases.len();
        let mut history = PhasedHistory::new(false);
        for (index, (mut source, size)) in phases.enumerate() {
            let phase = PhaseInfo {
                index,
                total,
                competence: None,
            };
            tracing::debug!(phase = index, examples = size, "bucket phase");
            let ctx = self.context(phase, 0, 0, source.num_batches(), 0.0);
            if self.callbacks.on_phase_begin(&ctx) == CallbackAction::Stop {
                break;
            }
            history.push_phase(self.train_source(&mut source, phase, None)?);
        }
        Ok(History::Phased(history))
    }

    fn train_dynamic(&mut self, dataset: &Dataset) -> Result<History> {
        let params = self.config.dynamic;
        if self.evaluator.is_none() {
            return Err(ConfigError::MissingHyperparameter("dev_data".into()).into());
        }
        let reference = params
            .reference
            .ok_or_else(|| ConfigError::MissingHyperparameter("dynamic.reference".into()))?;
        if params.phases == 0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "dcl_phase",
                value: 0.0,
                reason: "must be >= 1",
            }
            .into());
        }

        let estimator = CompetenceEstimator::new(params.c0, params.alpha, params.beta, reference)?;
        let mut window = LossWindow::new(params.a)?;
        let mut curriculum = DynamicCurriculum::new(dataset.clone())?;
        if let Some(seed) = self.config.seed {
            curriculum = curriculum.with_seed(seed);
        }

        let collate = self.collate(dataset);
        let mut measure =
            BatchSource::sequential(dataset.clone(), self.config.eval_batch_size, collate.clone())?;
        tracing::info!("Number of instances={}", dataset.len());
        tracing::info!("Total Number of curriculums={}", params.phases);

        let mut history = PhasedHistory::new(true);
        for index in 0..params.phases {
            let losses = sample_losses(&mut self.model, &mut measure)?;
            let difficulties = window.observe(losses)?;

            let competence = match (index, self.evaluator.as_ref()) {
                (0, _) | (_, None) => estimator.initial(),
                (_, Some(evaluator)) => {
                    let metrics = evaluator.evaluate(&mut self.model, self.tokenizer.as_ref())?;
                    estimator.update(metrics.bleu, metrics.slot_accuracy)
                }
            };
            let phase = PhaseInfo {
                index,
                total: params.phases,
                competence: Some(competence),
            };
            let mut source = curriculum.phase_batches(
                &difficulties,
                competence,
                self.config.train_batch_size,
                collate.clone(),
            )?;
            let ctx = self.context(phase, 0, 0, source.num_batches(), 0.0);
            if self.callbacks.on_phase_begin(&ctx) == CallbackAction::Stop {
                break;
            }
            history.push_competence(competence);
            history.push_phase(self.train_source(&mut source, phase, None)?);
        }
        Ok(History::Phased(history))
    }
}
