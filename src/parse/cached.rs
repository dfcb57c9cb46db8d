//! Parser decorator that consults a [`ParseCache`] before the analyzer

use super::traits::{ParseOutcome, SentenceParser};
use crate::storage::ParseCache;
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps a parser with a read-through, write-through parse cache.
///
/// Cache failures are logged and otherwise ignored; failed parses are never
/// stored.
pub struct CachedParser<P> {
    inner: P,
    cache: Arc<dyn ParseCache>,
}

impl<P: SentenceParser> CachedParser<P> {
    pub fn new(inner: P, cache: Arc<dyn ParseCache>) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: SentenceParser> SentenceParser for CachedParser<P> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn parse(&self, sentence: &str) -> ParseOutcome {
        match self.cache.get(sentence) {
            Ok(Some(parsed)) => return Ok(parsed),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "parse cache lookup failed"),
        }

        let parsed = self.inner.parse(sentence).await?;
        if let Err(e) = self.cache.put(sentence, &parsed) {
            tracing::warn!(error = %e, "parse cache write failed");
        }
        Ok(parsed)
    }
}
