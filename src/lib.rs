//! scenescore: scene-graph relation scoring for Japanese captions
//!
//! A caption is analyzed by KNP, turned into a small scene graph of
//! objects, attributes and relations, and flattened into tuples. Candidate
//! tuples are matched against reference tuples with synonym tolerance,
//! giving precision, recall and F.
//!
//! # Core Concepts
//!
//! - **ParsedSentence**: chunks, morphemes and case frames from the analyzer
//! - **SceneGraph**: nodes with derived kinds (object, attribute, relation)
//! - **Tuples**: `word`, `head_attr`, `subject_relation_object`
//!
//! # Example
//!
//! ```
//! use scenescore::{ParsedSentence, PredicateTag, SceneGraphBuilder};
//!
//! let parsed = ParsedSentence::new()
//!     .with_predicate(PredicateTag::new("赤い").with_argument("ガ", "ボール"));
//! let mut graph = SceneGraphBuilder::new().build(&parsed);
//! assert_eq!(graph.tuples().attributes, vec!["ボール_赤い"]);
//! ```

pub mod builder;
pub mod config;
pub mod graph;
pub mod parse;
pub mod scoring;
pub mod storage;
pub mod synonym;

pub use builder::SceneGraphBuilder;
pub use config::{ConfigError, ScoreConfig};
pub use graph::{GraphTuples, NodeId, NodeKind, PartOfSpeech, SceneGraph, SceneNode};
pub use parse::{
    CachedParser, Chunk, ChunkKind, KnpConfig, KnpParser, MockParser, ParseError, ParseOutcome,
    ParsedSentence, PredicateTag, SentenceParser,
};
pub use scoring::{BatchError, BatchScorer, ItemScore, Score, ScorePair, Scorer};
pub use storage::{OpenStore, ParseCache, SqliteParseCache, StorageError, StorageResult};
pub use synonym::{CachedSynonyms, NoSynonyms, StaticSynonyms, SynonymLookup, WordNetSynonyms};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
