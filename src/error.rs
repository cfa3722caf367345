//! Crate-wide error types
//!
//! Configuration and data errors are fatal: they are raised at construction
//! or load time and never retried. Failures reported by external collaborators
//! (model, tokenizer, persistence) surface as [`Error::Model`] or [`Error::Io`].

use thiserror::Error;

/// Invalid names or hyperparameters, detected before any training happens
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid curriculum name: {0} (must be one of: NC, one_pass, baby_step, spl.hard, spl.linear, spl.mixture, dcl)")]
    InvalidCurriculum(String),

    #[error("Invalid BucketCurriculum policy: {0} (must be one of: one_pass, baby_step)")]
    InvalidPolicy(String),

    #[error("Invalid SPL regularizer name: {0} (must be one of: hard, linear, mixture)")]
    InvalidRegularizerName(String),

    #[error("Missing required hyperparameter: {0}")]
    MissingHyperparameter(String),

    #[error("Invalid hyperparameter {name}={value}: {reason}")]
    InvalidHyperparameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("Invalid bucket count {num_buckets} for {dataset_len} examples (must be in 1..={dataset_len})")]
    InvalidBucketCount {
        num_buckets: usize,
        dataset_len: usize,
    },

    #[error("Invalid competence {0} (must be in (0, 1])")]
    InvalidCompetence(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),
}

/// Malformed or inconsistent input data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("Malformed line {line} in {path}: missing separator '{separator}'")]
    MalformedLine {
        path: String,
        line: usize,
        separator: String,
    },

    #[error("Line count mismatch: {source_path} has {source_lines} lines, {target_path} has {target_lines}")]
    LineCountMismatch {
        source_path: String,
        source_lines: usize,
        target_path: String,
        target_lines: usize,
    },

    #[error("Length mismatch in {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Dataset is empty")]
    EmptyDataset,
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Validation(#[from] crate::config::ValidationError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::InvalidPolicy("zigzag".to_string()).into();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidPolicy(ref name)) if name == "zigzag"
        ));
        assert!(err.to_string().contains("one_pass, baby_step"));
    }

    #[test]
    fn test_data_error_display() {
        let err = DataError::LineCountMismatch {
            source_path: "a.src".to_string(),
            source_lines: 3,
            target_path: "a.tgt".to_string(),
            target_lines: 2,
        };
        assert_eq!(
            err.to_string(),
            "Line count mismatch: a.src has 3 lines, a.tgt has 2"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
