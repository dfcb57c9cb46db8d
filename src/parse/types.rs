//! Parsed sentence structure as delivered by the external analyzer

use serde::{Deserialize, Serialize};

/// Syntactic kind of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    /// Verbal predicate (`<用言:動>`)
    Verb,
    /// Adjectival predicate (`<用言:形>`)
    Adjective,
    /// Nominal (`<体言>`)
    Noun,
    #[default]
    Unknown,
}

/// A single morpheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    /// Surface form
    pub surface: String,
    /// Dictionary (base) form
    pub base: String,
    /// Part-of-speech subcategory, e.g. `普通名詞`, `名詞性名詞接尾辞`
    pub category: String,
    /// Representative form without the reading, e.g. `熊`; empty for particles
    pub representative: String,
    /// Lexical subcategory tags, e.g. `動物`, `色`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<String>,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            surface: surface.into(),
            representative: base.clone(),
            base,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_representative(mut self, representative: impl Into<String>) -> Self {
        self.representative = representative.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategories.push(subcategory.into());
        self
    }

    /// Suffixes do not contribute to the canonical text of their unit
    pub fn is_suffix(&self) -> bool {
        self.category.contains("接尾辞")
    }
}

/// Canonical text of a unit: representative forms of its non-suffix morphemes
pub fn canonical_text(morphemes: &[Morpheme]) -> String {
    morphemes
        .iter()
        .filter(|m| !m.is_suffix())
        .map(|m| m.representative.as_str())
        .collect()
}

/// A dependency unit (bunsetsu)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Canonical (representative-form) text
    pub text: String,
    /// Concatenated base forms, particles included
    pub raw_text: String,
    pub kind: ChunkKind,
    /// Index of the chunk this one depends on
    pub parent: Option<usize>,
    pub morphemes: Vec<Morpheme>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, raw_text: impl Into<String>, kind: ChunkKind) -> Self {
        Self {
            text: text.into(),
            raw_text: raw_text.into(),
            kind,
            parent: None,
            morphemes: Vec::new(),
        }
    }

    /// Build a chunk whose texts are derived from its morphemes
    pub fn from_morphemes(morphemes: Vec<Morpheme>, kind: ChunkKind) -> Self {
        Self {
            text: canonical_text(&morphemes),
            raw_text: morphemes.iter().map(|m| m.base.as_str()).collect(),
            kind,
            parent: None,
            morphemes,
        }
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_morpheme(mut self, morpheme: Morpheme) -> Self {
        self.morphemes.push(morpheme);
        self
    }

    /// True if any morpheme carries one of `subcategories`
    pub fn has_subcategory(&self, subcategories: &[&str]) -> bool {
        self.morphemes
            .iter()
            .flat_map(|m| m.subcategories.iter())
            .any(|sub| subcategories.contains(&sub.as_str()))
    }
}

/// One (case, argument) pair attached to a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseArgument {
    /// Case-particle label, e.g. `ガ`, `ヲ`, `時間`
    pub case: String,
    /// Canonical text of the argument
    pub argument: String,
}

/// A predicate with its case frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateTag {
    /// Canonical text of the predicate
    pub text: String,
    pub arguments: Vec<CaseArgument>,
}

impl PredicateTag {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, case: impl Into<String>, argument: impl Into<String>) -> Self {
        self.arguments.push(CaseArgument {
            case: case.into(),
            argument: argument.into(),
        });
        self
    }
}

/// Everything the graph builder needs to know about one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSentence {
    pub morphemes: Vec<Morpheme>,
    pub chunks: Vec<Chunk>,
    pub predicates: Vec<PredicateTag>,
}

impl ParsedSentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.morphemes.is_empty() && self.chunks.is_empty() && self.predicates.is_empty()
    }

    pub fn with_chunk(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    pub fn with_predicate(mut self, predicate: PredicateTag) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The chunk `index` depends on, if any
    pub fn parent_of(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)?.parent.and_then(|p| self.chunks.get(p))
    }
}
