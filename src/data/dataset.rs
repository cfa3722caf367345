//! Intent/utterance dataset

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Default separator between the dialogue act and the utterance
pub const DEFAULT_SEPARATOR: &str = "&";

/// Ordered collection of (intent, utterance) pairs
///
/// Intents are dialogue-act strings; utterances are the natural-language
/// realisations. The separator is kept so the two halves can be rejoined for
/// the unified sequence format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    intents: Vec<String>,
    utterances: Vec<String>,
    separator: String,
}

impl Dataset {
    /// Build a dataset from aligned intent and utterance lists
    pub fn new(
        intents: Vec<String>,
        utterances: Vec<String>,
        separator: impl Into<String>,
    ) -> Result<Self> {
        if intents.len() != utterances.len() {
            return Err(DataError::LengthMismatch {
                what: "utterances",
                expected: intents.len(),
                actual: utterances.len(),
            }
            .into());
        }
        Ok(Self {
            intents,
            utterances,
            separator: separator.into(),
        })
    }

    /// Build from string pairs
    pub fn from_pairs<I, A, B>(pairs: I, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let (intents, utterances) = pairs
            .into_iter()
            .map(|(i, u)| (i.into(), u.into()))
            .unzip();
        Self {
            intents,
            utterances,
            separator: separator.into(),
        }
    }

    /// Load a `intent <sep> utterance` text file, one example per line
    ///
    /// Lines are lowercased and both halves trimmed. Blank lines are skipped;
    /// a non-blank line without the separator aborts the load.
    pub fn from_txt_file(path: impl AsRef<Path>, separator: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut intents = Vec::new();
        let mut utterances = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let lowered = line.to_lowercase();
            let mut fields = lowered.split(separator);
            let intent = fields.next().unwrap_or_default();
            let utterance = fields.next().ok_or_else(|| DataError::MalformedLine {
                path: path.display().to_string(),
                line: line_no + 1,
                separator: separator.to_string(),
            })?;
            intents.push(intent.trim().to_string());
            utterances.push(utterance.trim().to_string());
        }

        tracing::debug!(path = %path.display(), examples = intents.len(), "loaded text dataset");
        Ok(Self {
            intents,
            utterances,
            separator: separator.to_string(),
        })
    }

    /// Load intents and utterances from two line-aligned files
    pub fn from_parallel_files(
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
        separator: &str,
    ) -> Result<Self> {
        let (source, target) = (source.as_ref(), target.as_ref());
        let intents = read_lines(source)?;
        let utterances = read_lines(target)?;

        if intents.len() != utterances.len() {
            return Err(DataError::LineCountMismatch {
                source_path: source.display().to_string(),
                source_lines: intents.len(),
                target_path: target.display().to_string(),
                target_lines: utterances.len(),
            }
            .into());
        }

        Ok(Self {
            intents,
            utterances,
            separator: separator.to_string(),
        })
    }

    /// Load from a JSON cache when present, otherwise parse and write the cache
    pub fn load_cached(
        source: &DataSource,
        cache_dir: Option<&Path>,
        overwrite_cache: bool,
    ) -> Result<Self> {
        let Some(cache_dir) = cache_dir else {
            return source.load();
        };
        let cache_path = source.cache_path(cache_dir);

        if !overwrite_cache && cache_path.exists() {
            tracing::info!(path = %cache_path.display(), "Loading processed data from cached file");
            let cached = fs::read_to_string(&cache_path)?;
            return Ok(serde_json::from_str(&cached)?);
        }

        tracing::info!(
            path = %cache_path.display(),
            "Creating features from dataset file, caching processed data"
        );
        let dataset = source.load()?;
        fs::create_dir_all(cache_dir)?;
        fs::write(&cache_path, serde_json::to_string(&dataset)?)?;
        Ok(dataset)
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Whether the dataset holds no examples
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Separator token
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// All intents, in order
    pub fn intents(&self) -> &[String] {
        &self.intents
    }

    /// All utterances, in order
    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    /// Example at `idx`
    pub fn get(&self, idx: usize) -> Option<(&str, &str)> {
        Some((self.intents.get(idx)?.as_str(), self.utterances.get(idx)?.as_str()))
    }

    /// Iterate over (intent, utterance) pairs
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.intents
            .iter()
            .zip(&self.utterances)
            .map(|(i, u)| (i.as_str(), u.as_str()))
    }

    /// Contiguous slice as a new dataset with the same separator
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn subset(&self, range: Range<usize>) -> Self {
        Self {
            intents: self.intents[range.clone()].to_vec(),
            utterances: self.utterances[range].to_vec(),
            separator: self.separator.clone(),
        }
    }

    /// Examples at `indices`, in the given order
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            intents: indices.iter().map(|&i| self.intents[i].clone()).collect(),
            utterances: indices.iter().map(|&i| self.utterances[i].clone()).collect(),
            separator: self.separator.clone(),
        }
    }

    /// Rejoin example `idx` as `"{intent} {sep} {utterance}"`
    pub fn joined(&self, idx: usize) -> Option<String> {
        self.get(idx)
            .map(|(intent, utterance)| join_pair(intent, utterance, &self.separator))
    }
}

/// Join an intent and utterance for the unified sequence format
pub fn join_pair(intent: &str, utterance: &str, separator: &str) -> String {
    format!("{intent} {separator} {utterance}")
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// Where a dataset is read from
///
/// In YAML a joined source is `{ path, separator }` (separator defaults to
/// `&`) and a parallel source is `{ source, target }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    /// Single file of `intent <sep> utterance` lines
    Joined {
        path: PathBuf,
        #[serde(default = "default_separator")]
        separator: String,
    },
    /// Line-aligned intent and utterance files
    Parallel { source: PathBuf, target: PathBuf },
}

impl DataSource {
    /// Parse the source without caching
    pub fn load(&self) -> Result<Dataset> {
        match self {
            Self::Joined { path, separator } => Dataset::from_txt_file(path, separator),
            Self::Parallel { source, target } => {
                Dataset::from_parallel_files(source, target, DEFAULT_SEPARATOR)
            }
        }
    }

    /// Cache file for this source under `cache_dir`
    ///
    /// Named `{stem}-{digest}.json`, where the digest covers every path of the
    /// source and the separator, so sources sharing a file stem never collide.
    pub fn cache_path(&self, cache_dir: &Path) -> PathBuf {
        let mut hasher = Sha256::new();
        let primary = match self {
            Self::Joined { path, separator } => {
                hasher.update(b"joined\0");
                hasher.update(path.as_os_str().as_encoded_bytes());
                hasher.update(b"\0");
                hasher.update(separator.as_bytes());
                path
            }
            Self::Parallel { source, target } => {
                hasher.update(b"parallel\0");
                hasher.update(source.as_os_str().as_encoded_bytes());
                hasher.update(b"\0");
                hasher.update(target.as_os_str().as_encoded_bytes());
                source
            }
        };
        let digest = hasher.finalize();
        let stem = primary
            .file_stem()
            .map_or_else(|| "dataset".into(), |s| s.to_string_lossy().into_owned());
        cache_dir.join(format!("{stem}-{}.json", hex::encode(&digest[..8])))
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(|l| l.trim().to_string()).collect())
}
