//! Parser boundary trait for the external analyzer

use super::types::ParsedSentence;
use async_trait::async_trait;
use thiserror::Error;

/// Why a sentence could not be analyzed
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("analyzer not available: {0}")]
    Unavailable(String),

    #[error("analyzer I/O failed: {0}")]
    Io(String),

    #[error("analyzer timed out after {0} seconds")]
    Timeout(u64),

    #[error("analyzer rejected input: {0}")]
    Analyzer(String),

    #[error("malformed analyzer output at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Outcome of analyzing one sentence
pub type ParseOutcome = Result<ParsedSentence, ParseError>;

/// Turns raw text into a [`ParsedSentence`].
///
/// Implementations hold whatever handle the analyzer needs (a subprocess,
/// a socket, a fixture table). A scoring worker owns one parser for its
/// whole lifetime, so `parse` is called sequentially per instance.
#[async_trait]
pub trait SentenceParser: Send + Sync {
    /// Short name used in diagnostics
    fn id(&self) -> &str;

    /// Analyze one sentence
    async fn parse(&self, sentence: &str) -> ParseOutcome;
}

#[async_trait]
impl<P: SentenceParser + ?Sized> SentenceParser for Box<P> {
    fn id(&self) -> &str {
        (**self).id()
    }

    async fn parse(&self, sentence: &str) -> ParseOutcome {
        (**self).parse(sentence).await
    }
}
