//! Scene graph data structures

mod node;
mod scene;
mod tuples;


pub use node::{NodeId, NodeKind, PartOfSpeech, SceneNode, GENITIVE_MARKER, ZERO_PRONOUN};
pub use scene::SceneGraph;
pub use tuples::GraphTuples;
