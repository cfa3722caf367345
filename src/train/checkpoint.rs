//! Checkpoint persistence

use super::config::TrainConfig;
use crate::error::Result;
use crate::model::{Seq2SeqModel, Tokenizer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Training arguments file written next to the model
pub const TRAINING_ARGS_FILE: &str = "training_args.json";

/// Contents of `training_args.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArgs {
    /// Configuration the checkpoint was trained with
    #[serde(flatten)]
    pub config: TrainConfig,
    /// RFC 3339 save time
    pub saved_at: String,
}

/// Save model, tokenizer and training arguments into `dir`
pub fn save_checkpoint<M, T>(dir: &Path, model: &M, tokenizer: &T, config: &TrainConfig) -> Result<()>
where
    M: Seq2SeqModel,
    T: Tokenizer,
{
    fs::create_dir_all(dir)?;
    model.save_pretrained(dir)?;
    tokenizer.save_pretrained(dir)?;

    let args = TrainingArgs {
        config: config.clone(),
        saved_at: chrono::Utc::now().to_rfc3339(),
    };
    fs::write(dir.join(TRAINING_ARGS_FILE), serde_json::to_string_pretty(&args)?)?;
    tracing::info!("Saving model checkpoint to {}", dir.display());
    Ok(())
}

/// Read the training arguments of a checkpoint
pub fn load_training_args(dir: &Path) -> Result<TrainingArgs> {
    let text = fs::read_to_string(dir.join(TRAINING_ARGS_FILE))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ByteTokenizer, EchoModel};
    use crate::train::CurriculumMode;

    #[test]
    fn test_save_checkpoint_writes_all_parts() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = dir.path().join("nested").join("ckpt");
        let config = TrainConfig::new()
            .with_epochs(3)
            .with_curriculum(CurriculumMode::Dynamic);

        save_checkpoint(&ckpt, &EchoModel::default(), &ByteTokenizer, &config).unwrap();

        assert!(ckpt.join("model.txt").exists());
        assert!(ckpt.join("tokenizer.txt").exists());
        let args = load_training_args(&ckpt).unwrap();
        assert_eq!(args.config, config);
        assert!(chrono::DateTime::parse_from_rfc3339(&args.saved_at).is_ok());
    }
}
