//! Scoring configuration, loaded from YAML
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. The binary overrides individual fields from flags.

use crate::builder::SceneGraphBuilder;
use crate::parse::{CachedParser, KnpConfig, KnpParser, SentenceParser};
use crate::scoring::{BatchScorer, Scorer};
use crate::storage::{OpenStore, SqliteParseCache, StorageResult};
use crate::synonym::{CachedSynonyms, NoSynonyms, SynonymLookup, WordNetSynonyms};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Number of batch workers, each with its own analyzer pipeline
    pub workers: usize,
    /// Upper bound for scoring one batch item
    pub task_timeout_seconds: u64,
    /// Add placeholder subjects to subjectless relations
    pub zero_pronoun: bool,
    pub parser: KnpConfig,
    /// Parse cache database; defaults to the user data directory
    pub cache_path: Option<PathBuf>,
    pub use_cache: bool,
    /// Japanese WordNet database; defaults to the user data directory
    pub wordnet_path: Option<PathBuf>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            workers: 16,
            task_timeout_seconds: 120,
            zero_pronoun: true,
            parser: KnpConfig::default(),
            cache_path: None,
            use_cache: true,
            wordnet_path: None,
        }
    }
}

/// `~/.local/share/scenescore` or the platform equivalent
pub fn default_data_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("scenescore")
}

impl ScoreConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| default_data_dir().join("parse-cache.db"))
    }

    pub fn wordnet_path(&self) -> PathBuf {
        self.wordnet_path
            .clone()
            .unwrap_or_else(|| default_data_dir().join("wnjpn.db"))
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_seconds)
    }

    pub fn builder(&self) -> SceneGraphBuilder {
        SceneGraphBuilder::new().with_zero_pronouns(self.zero_pronoun)
    }

    /// Memoized WordNet lookup, or exact matching when the database is
    /// missing or unreadable
    pub fn open_synonyms(&self) -> Arc<dyn SynonymLookup> {
        let path = self.wordnet_path();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "wordnet database not found, matching without synonyms");
            return Arc::new(NoSynonyms);
        }
        match WordNetSynonyms::open(&path) {
            Ok(wordnet) => Arc::new(CachedSynonyms::new(wordnet)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open wordnet database");
                Arc::new(NoSynonyms)
            }
        }
    }

    /// The shared parse cache, unless caching is disabled
    pub fn open_cache(&self) -> StorageResult<Option<Arc<SqliteParseCache>>> {
        if !self.use_cache {
            return Ok(None);
        }
        let cache = SqliteParseCache::open(self.cache_path())?;
        Ok(Some(Arc::new(cache)))
    }

    /// One KNP-backed scorer, sharing `synonyms` and `cache`
    pub fn scorer(
        &self,
        synonyms: Arc<dyn SynonymLookup>,
        cache: Option<Arc<SqliteParseCache>>,
    ) -> Scorer<Box<dyn SentenceParser>> {
        let knp = KnpParser::new(self.parser.clone());
        let parser: Box<dyn SentenceParser> = match cache {
            Some(cache) => Box::new(CachedParser::new(knp, cache)),
            None => Box::new(knp),
        };
        Scorer::new(parser, synonyms).with_builder(self.builder())
    }

    /// A worker pool of KNP-backed scorers. Must be called inside a tokio
    /// runtime.
    pub fn batch_scorer(&self) -> StorageResult<BatchScorer> {
        let synonyms = self.open_synonyms();
        let cache = self.open_cache()?;
        let scorers = (0..self.workers.max(1)).map(|_| self.scorer(synonyms.clone(), cache.clone()));
        Ok(BatchScorer::spawn(scorers, self.task_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(ScoreConfig::from_yaml_str("").unwrap(), ScoreConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = ScoreConfig::from_yaml_str(
            "workers: 4\nzero_pronoun: false\nparser:\n  timeout_seconds: 10\n",
        )
        .unwrap();
        assert_eq!(config.workers, 4);
        assert!(!config.zero_pronoun);
        assert_eq!(config.parser.timeout_seconds, 10);
        assert_eq!(config.parser.knp_args, vec!["-tab"]);
        assert_eq!(config.task_timeout_seconds, 120);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            ScoreConfig::from_yaml_str("workers: many\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenescore.yaml");
        std::fs::write(&path, "cache_path: /tmp/cache.db\nuse_cache: false\n").unwrap();

        let config = ScoreConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/cache.db"));
        assert!(!config.use_cache);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ScoreConfig::from_yaml_file(dir.path().join("absent.yaml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn missing_wordnet_means_no_synonyms() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScoreConfig {
            wordnet_path: Some(dir.path().join("absent.db")),
            ..Default::default()
        };
        assert!(config.open_synonyms().synonyms_of("熊").is_empty());
    }

    #[test]
    fn disabled_cache_opens_nothing() {
        let config = ScoreConfig {
            use_cache: false,
            ..Default::default()
        };
        assert!(config.open_cache().unwrap().is_none());
    }

    #[test]
    fn cache_opens_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("parse.db");
        let config = ScoreConfig {
            cache_path: Some(path.clone()),
            ..Default::default()
        };
        assert!(config.open_cache().unwrap().is_some());
        assert!(path.exists());
    }
}
