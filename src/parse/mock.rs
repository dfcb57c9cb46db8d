//! Fixture-backed parser for tests and offline runs

use super::traits::{ParseError, ParseOutcome, SentenceParser};
use super::types::ParsedSentence;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock parser: returns preconfigured parses keyed by sentence text.
///
/// Blank input parses to an empty sentence. Any other sentence without a
/// registered parse or failure is reported as an analyzer error.
#[derive(Default)]
pub struct MockParser {
    parses: HashMap<String, ParsedSentence>,
    failures: HashMap<String, ParseError>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the parse returned for `sentence`
    pub fn with_parse(mut self, sentence: impl Into<String>, parsed: ParsedSentence) -> Self {
        self.parses.insert(sentence.into(), parsed);
        self
    }

    /// Register a failure for `sentence`
    pub fn with_failure(mut self, sentence: impl Into<String>, error: ParseError) -> Self {
        self.failures.insert(sentence.into(), error);
        self
    }

    /// Sleep before answering for `sentence`
    pub fn with_delay(mut self, sentence: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(sentence.into(), delay);
        self
    }

    /// Number of non-blank sentences handed to this parser
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SentenceParser for MockParser {
    fn id(&self) -> &str {
        "mock"
    }

    async fn parse(&self, sentence: &str) -> ParseOutcome {
        if sentence.trim().is_empty() {
            return Ok(ParsedSentence::new());
        }
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.delays.get(sentence) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failures.get(sentence) {
            return Err(error.clone());
        }
        self.parses
            .get(sentence)
            .cloned()
            .ok_or_else(|| ParseError::Analyzer(format!("no mock parse for '{}'", sentence)))
    }
}
