//! YAML schema for experiment manifests

use super::validate::validate_config;
use crate::data::{DataSource, Dataset};
use crate::error::Result;
use crate::train::TrainConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete experiment manifest
///
/// ```yaml
/// data:
///   train: { path: data/train.txt }
///   dev: { source: data/dev.src, target: data/dev.tgt }
///   cache_dir: cache
/// training:
///   epochs: 3
///   curriculum: baby_step
///   num_buckets: 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSpec {
    /// Where examples come from
    pub data: DataSpec,

    /// Trainer settings
    #[serde(default)]
    pub training: TrainConfig,
}

/// Data section of a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// Training examples
    pub train: DataSource,

    /// Dev examples for evaluation and patience
    #[serde(default)]
    pub dev: Option<DataSource>,

    /// Directory for JSON caches of parsed datasets
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Re-parse even when a cache exists
    #[serde(default)]
    pub overwrite_cache: bool,
}

impl DataSpec {
    /// Load the training set, through the cache when configured
    pub fn load_train(&self) -> Result<Dataset> {
        Dataset::load_cached(&self.train, self.cache_dir.as_deref(), self.overwrite_cache)
    }

    /// Load the dev set, if any
    pub fn load_dev(&self) -> Result<Option<Dataset>> {
        self.dev
            .as_ref()
            .map(|source| Dataset::load_cached(source, self.cache_dir.as_deref(), self.overwrite_cache))
            .transpose()
    }
}

/// Paths a data source reads
pub(crate) fn source_paths(source: &DataSource) -> Vec<&Path> {
    match source {
        DataSource::Joined { path, .. } => vec![path.as_path()],
        DataSource::Parallel { source, target } => vec![source.as_path(), target.as_path()],
    }
}

/// Parse a manifest without validating it
pub fn parse_config(yaml: &str) -> Result<ExperimentSpec> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read, parse and validate a manifest
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ExperimentSpec> {
    let yaml = fs::read_to_string(config_path.as_ref())?;
    let spec = parse_config(&yaml)?;
    validate_config(&spec)?;
    tracing::debug!(path = %config_path.as_ref().display(), "loaded experiment manifest");
    Ok(spec)
}
