//! Sentence analysis boundary
//!
//! The graph builder consumes [`ParsedSentence`] values. They come from a
//! [`SentenceParser`]: the KNP pipeline in production, [`MockParser`] in
//! tests, optionally wrapped in a [`CachedParser`].

mod cached;
pub mod knp;
mod mock;
mod process;
mod traits;
mod types;

pub use cached::CachedParser;
pub use mock::MockParser;
pub use process::{KnpConfig, KnpParser};
pub use traits::{ParseError, ParseOutcome, SentenceParser};
pub use types::{canonical_text, CaseArgument, Chunk, ChunkKind, Morpheme, ParsedSentence, PredicateTag};
