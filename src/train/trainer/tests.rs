//! Tests for the curriculum trainer

use super::*;
use crate::curriculum::{BucketPolicy, ReferenceMetrics, SplVariant};
use crate::data::Dataset;
use crate::error::{ConfigError, Error};
use crate::eval::DevEvaluator;
use crate::model::Scorer;
use crate::test_utils::{ByteTokenizer, EchoModel, OverlapScorer};
use crate::train::callback::{CallbackAction, CallbackContext, TrainerCallback};
use crate::train::{CurriculumMode, DynamicParams, History, TrainConfig, HISTORY_FILE};
use approx::assert_abs_diff_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Ten examples whose intents carry 1..=10 slots
fn ten_examples() -> Dataset {
    let pairs: Vec<(String, String)> = (1..=10)
        .map(|n| {
            let slots: Vec<String> = (0..n).map(|i| format!("s{i} = v{i}")).collect();
            (format!("inform ( {} )", slots.join(" ; ")), format!("utterance {n}"))
        })
        .collect();
    Dataset::from_pairs(pairs, "&")
}

/// Utterances of 1..=5 bytes, so per-sample losses are 0.01..=0.05 before training
fn growing_utterances() -> Dataset {
    Dataset::from_pairs(
        vec![
            ("inform ( a = 1 )", "a"),
            ("inform ( b = 2 )", "ab"),
            ("inform ( c = 3 )", "abc"),
            ("inform ( d = 4 )", "abcd"),
            ("inform ( e = 5 )", "abcde"),
        ],
        "&",
    )
}

fn dev_evaluator() -> DevEvaluator {
    let dev = Dataset::from_pairs(vec![("alpha beta", "alpha gamma")], "&");
    DevEvaluator::new(dev, Box::new(OverlapScorer), Box::new(OverlapScorer)).unwrap()
}

fn trainer(config: TrainConfig) -> CurriculumTrainer<EchoModel, ByteTokenizer> {
    CurriculumTrainer::new(EchoModel::default(), Arc::new(ByteTokenizer), config)
}

fn config_in(dir: &Path) -> TrainConfig {
    TrainConfig::new().with_seed(7).with_output_dir(dir)
}

fn phased(history: History) -> crate::train::PhasedHistory {
    match history {
        History::Phased(p) => p,
        History::Flat(_) => panic!("expected a phased history"),
    }
}

fn flat(history: History) -> crate::train::RunLog {
    match history {
        History::Flat(log) => log,
        History::Phased(_) => panic!("expected a flat history"),
    }
}

#[test]
fn test_no_curriculum_records_every_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).with_epochs(3).with_batch_size(2);
    let mut trainer = trainer(config);

    let log = flat(trainer.train(&growing_utterances()).unwrap());

    assert_eq!(log.batch_ex_seen, vec![2, 2, 1, 2, 2, 1, 2, 2, 1]);
    assert_eq!(log.epoch_ex_seen, vec![5, 5, 5]);
    assert_eq!(log.epochs(), 3);
    assert!(log.eval_losses.is_empty());
    assert_eq!(trainer.global_step(), 9);
    assert!(trainer.model().weights_seen.iter().all(Option::is_none));
}

#[test]
fn test_epoch_loss_is_example_weighted() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).with_batch_size(2);
    let mut trainer = trainer(config);

    let log = flat(trainer.train(&growing_utterances()).unwrap());

    let weighted: f32 = log
        .batch_losses
        .iter()
        .zip(&log.batch_ex_seen)
        .map(|(l, n)| l * *n as f32)
        .sum::<f32>()
        / 5.0;
    assert_abs_diff_eq!(log.epoch_losses[0], weighted, epsilon = 1e-6);
}

#[test]
fn test_history_and_checkpoint_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).with_epochs(2);
    let mut trainer = trainer(config);

    let history = trainer.train(&growing_utterances()).unwrap();

    let path = dir.path().join(HISTORY_FILE);
    assert_eq!(History::load(&path).unwrap(), history);
    // Without dev data every epoch checkpoints; the last one wins
    assert_eq!(fs::read_to_string(dir.path().join("model.txt")).unwrap(), "10");
    assert!(dir.path().join("tokenizer.txt").exists());
    assert!(dir.path().join(crate::train::TRAINING_ARGS_FILE).exists());
}

#[test]
fn test_one_pass_phases_are_disjoint_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::Bucket(BucketPolicy::OnePass))
        .with_num_buckets(3)
        .with_batch_size(2);
    let mut trainer = trainer(config);

    let history = phased(trainer.train(&ten_examples()).unwrap());

    assert_eq!(history.phases(), 4);
    assert_eq!(history.epoch_ex_seen, vec![vec![3], vec![3], vec![3], vec![1]]);
    assert_eq!(
        history.batch_ex_seen,
        vec![vec![2, 1], vec![2, 1], vec![2, 1], vec![1]]
    );
    assert!(history.competence.is_none());
}

#[test]
fn test_baby_step_phases_accumulate() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::Bucket(BucketPolicy::BabyStep))
        .with_num_buckets(3)
        .with_batch_size(4)
        .with_epochs(2);
    let mut trainer = trainer(config);

    let history = phased(trainer.train(&ten_examples()).unwrap());

    assert_eq!(
        history.epoch_ex_seen,
        vec![vec![3, 3], vec![6, 6], vec![9, 9], vec![10, 10]]
    );
    // Weights carry over: the step counter never resets between phases
    assert_eq!(trainer.global_step(), 2 * (1 + 2 + 3 + 3));
}

#[test]
fn test_bucket_count_larger_than_dataset_fails_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::Bucket(BucketPolicy::OnePass))
        .with_num_buckets(11);
    let mut trainer = trainer(config);

    let err = trainer.train(&ten_examples()).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidBucketCount { num_buckets: 11, dataset_len: 10 })
    ));
    assert_eq!(trainer.model().steps, 0);
}

#[test]
fn test_self_paced_weights_follow_previous_losses() {
    let dir = tempfile::tempdir().unwrap();
    let data = Dataset::from_pairs(
        vec![("inform ( a = 1 )", "ab".to_string()), ("inform ( b = 2 )", "x".repeat(50))],
        "&",
    );
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::SelfPaced(SplVariant::Hard))
        .with_spl(0.3, None)
        .with_batch_size(2)
        .with_epochs(3);
    let mut trainer = trainer(config);

    let log = flat(trainer.train(&data).unwrap());
    assert_eq!(log.epochs(), 3);

    let sorted = |w: &Option<Vec<f32>>| {
        let mut w = w.clone().unwrap();
        w.sort_by(f32::total_cmp);
        w
    };
    let seen = &trainer.model().weights_seen;
    // Epoch 1: all ones. Losses 0.02 and 0.5 against lam 0.3.
    assert_eq!(sorted(&seen[0]), vec![1.0, 1.0]);
    assert_eq!(sorted(&seen[1]), vec![0.0, 1.0]);
    // Losses halve after one step (0.01, 0.25) while lam grows to 0.39
    assert_eq!(sorted(&seen[2]), vec![1.0, 1.0]);
}

#[test]
fn test_mixture_without_gam_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::SelfPaced(SplVariant::Mixture))
        .with_spl(0.3, None);
    let mut trainer = trainer(config);

    let err = trainer.train(&growing_utterances()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingHyperparameter(ref name)) if name == "gam"));
}

#[test]
fn test_patience_stops_and_keeps_best_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_epochs(5)
        .with_batch_size(5)
        .with_patience(1);
    let mut trainer = trainer(config).with_evaluator(dev_evaluator());

    let log = flat(trainer.train(&growing_utterances()).unwrap());

    // Echoed dev output never changes, so epoch 1 does not improve
    assert_eq!(log.epochs(), 2);
    assert_eq!(log.eval_losses.len(), 2);
    assert_abs_diff_eq!(log.eval_losses[0], -0.5, epsilon = 1e-6);
    assert_eq!(fs::read_to_string(dir.path().join("model.txt")).unwrap(), "1");
}

/// Scorer that cannot produce a number
struct NanScorer;

impl Scorer for NanScorer {
    fn score(&self, _candidate: &str, _references: &[&str]) -> f32 {
        f32::NAN
    }

    fn name(&self) -> &'static str {
        "nan"
    }
}

#[test]
fn test_nan_dev_score_propagates_to_history_and_patience() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_epochs(5)
        .with_batch_size(5)
        .with_patience(2);
    let dev = Dataset::from_pairs(vec![("alpha beta", "alpha gamma")], "&");
    let evaluator = DevEvaluator::new(dev, Box::new(NanScorer), Box::new(OverlapScorer)).unwrap();
    let mut trainer = trainer(config).with_evaluator(evaluator);

    let log = flat(trainer.train(&growing_utterances()).unwrap());

    // NaN never improves on the best loss, so patience runs out after two epochs
    assert_eq!(log.epochs(), 2);
    assert_eq!(log.eval_losses.len(), 2);
    assert!(log.eval_losses.iter().all(|l| l.is_nan()));
    assert!(!dir.path().join("model.txt").exists());

    let loaded = flat(History::load(&dir.path().join(HISTORY_FILE)).unwrap());
    assert!(loaded.eval_losses.iter().all(|l| l.is_nan()));
    assert_eq!(loaded.epoch_ex_seen, vec![5, 5]);
}

#[test]
fn test_grace_epochs_keep_checkpointing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .with_epochs(3)
        .with_batch_size(5)
        .with_patience(1)
        .with_grace_epochs(2);
    let mut trainer = trainer(config).with_evaluator(dev_evaluator());

    let log = flat(trainer.train(&growing_utterances()).unwrap());

    assert_eq!(log.epochs(), 3);
    assert_eq!(fs::read_to_string(dir.path().join("model.txt")).unwrap(), "2");
}

#[test]
fn test_dynamic_requires_dev_data_and_reference() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).with_curriculum(CurriculumMode::Dynamic);

    let err = trainer(config.clone()).train(&growing_utterances()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingHyperparameter(ref name)) if name == "dev_data"));

    let err = trainer(config)
        .with_evaluator(dev_evaluator())
        .train(&growing_utterances())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::MissingHyperparameter(ref name)) if name == "dynamic.reference"
    ));
}

#[test]
fn test_dynamic_competence_grows_selection() {
    let dir = tempfile::tempdir().unwrap();
    let dynamic = DynamicParams {
        phases: 2,
        a: 2,
        reference: Some(ReferenceMetrics {
            bleu: 1.0,
            slot_accuracy: 1.0,
        }),
        ..DynamicParams::default()
    };
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::Dynamic)
        .with_dynamic(dynamic);
    let mut trainer = trainer(config).with_evaluator(dev_evaluator());

    let history = phased(trainer.train(&growing_utterances()).unwrap());

    let competence = history.competence.clone().unwrap();
    assert_eq!(competence.len(), 2);
    assert_abs_diff_eq!(competence[0], 0.2);
    // ((0.7 * 0.5 + 0.3 * 1.0) * 0.8 / 0.9) + 0.2
    assert_abs_diff_eq!(competence[1], 0.777_777_8, epsilon = 1e-5);

    // 0.2-quantile of 0.01..0.05 keeps one example, the 0.78-quantile four
    assert_eq!(history.epoch_ex_seen, vec![vec![1], vec![4]]);
    assert_eq!(history.eval_losses.len(), 2);
}

#[test]
fn test_dynamic_zero_phases_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dynamic = DynamicParams {
        phases: 0,
        reference: Some(ReferenceMetrics {
            bleu: 0.5,
            slot_accuracy: 0.9,
        }),
        ..DynamicParams::default()
    };
    let config = config_in(dir.path())
        .with_curriculum(CurriculumMode::Dynamic)
        .with_dynamic(dynamic);

    let err = trainer(config)
        .with_evaluator(dev_evaluator())
        .train(&growing_utterances())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidHyperparameter { name: "dcl_phase", .. })
    ));
}

struct StopAfterSteps {
    limit: usize,
}

impl TrainerCallback for StopAfterSteps {
    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if ctx.global_step >= self.limit {
            CallbackAction::Stop
        } else {
            CallbackAction::Continue
        }
    }

    fn name(&self) -> &'static str {
        "StopAfterSteps"
    }
}

#[test]
fn test_callback_stop_ends_inner_loop() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).with_epochs(4);
    let mut trainer = trainer(config);
    trainer.add_callback(StopAfterSteps { limit: 3 });

    let log = flat(trainer.train(&growing_utterances()).unwrap());

    assert_eq!(log.batch_ex_seen, vec![1, 1, 1]);
    assert_eq!(log.epoch_ex_seen, vec![3]);
    assert_eq!(trainer.callbacks().names(), vec!["StopAfterSteps"]);
}

#[test]
fn test_evaluator_inherits_generation_settings() {
    let config = TrainConfig::new().with_eval_batch_size(3);
    let trainer = trainer(config).with_evaluator(dev_evaluator());
    assert_eq!(trainer.evaluator().unwrap().settings().batch_size, 3);
}
