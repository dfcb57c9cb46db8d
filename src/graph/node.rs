//! Node representation in the scene graph

use serde::{Deserialize, Serialize};

/// Placeholder lexeme for an omitted subject (zero pronoun)
pub const ZERO_PRONOUN: &str = "[PHI]";

/// Text of the connector node inserted between genitive-linked nouns
pub const GENITIVE_MARKER: &str = "の";

/// Index of a node in the graph arena
pub type NodeId = usize;

/// Coarse part of speech assigned when a node is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    /// Noun phrase; always becomes an object
    NounPhrase,
    /// Predicates, modifiers, markers
    Other,
}

/// Role of a node, derived during `SceneGraph::build`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Unset,
    Object,
    Attribute,
    Relation,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unset => "unset",
            Self::Object => "object",
            Self::Attribute => "attribute",
            Self::Relation => "relation",
        };
        f.write_str(name)
    }
}

/// A node in the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Surface text; the deduplication key
    pub text: String,
    /// Word used when rendering tuples
    pub lemma: String,
    pub part_of_speech: PartOfSpeech,
    pub kind: NodeKind,
    pub id: NodeId,
}

impl SceneNode {
    pub(crate) fn new(
        id: NodeId,
        text: impl Into<String>,
        lemma: impl Into<String>,
        part_of_speech: PartOfSpeech,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            part_of_speech,
            kind: NodeKind::Unset,
            id,
        }
    }

    pub(crate) fn zero_pronoun(id: NodeId) -> Self {
        Self {
            text: ZERO_PRONOUN.to_string(),
            lemma: ZERO_PRONOUN.to_string(),
            part_of_speech: PartOfSpeech::Other,
            kind: NodeKind::Object,
            id,
        }
    }

    pub fn is_noun_phrase(&self) -> bool {
        self.part_of_speech == PartOfSpeech::NounPhrase
    }
}
