//! Synonym lookup used by the tuple matcher
//!
//! A lookup maps a lemma to the lemmas considered interchangeable with it.
//! Lookups never fail: an unknown word, a missing database or a broken row
//! all come back as an empty list.

mod wordnet;

pub use wordnet::WordNetSynonyms;

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only synonym capability shared by every scoring worker
pub trait SynonymLookup: Send + Sync {
    /// Synonyms of `lemma`, not including `lemma` itself
    fn synonyms_of(&self, lemma: &str) -> Vec<String>;
}

impl<L: SynonymLookup + ?Sized> SynonymLookup for Arc<L> {
    fn synonyms_of(&self, lemma: &str) -> Vec<String> {
        (**self).synonyms_of(lemma)
    }
}

/// Lookup that knows no synonyms; matching becomes exact
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynonyms;

impl SynonymLookup for NoSynonyms {
    fn synonyms_of(&self, _lemma: &str) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory synonym groups
///
/// Every member of a group is a synonym of every other member.
#[derive(Debug, Clone, Default)]
pub struct StaticSynonyms {
    table: HashMap<String, Vec<String>>,
}

impl StaticSynonyms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group<S: AsRef<str>>(mut self, group: &[S]) -> Self {
        for member in group {
            let member = member.as_ref();
            let entry = self.table.entry(member.to_string()).or_default();
            for other in group {
                let other: &str = other.as_ref();
                if other != member && !entry.iter().any(|e| e == other) {
                    entry.push(other.to_string());
                }
            }
        }
        self
    }
}

impl SynonymLookup for StaticSynonyms {
    fn synonyms_of(&self, lemma: &str) -> Vec<String> {
        self.table.get(lemma).cloned().unwrap_or_default()
    }
}

/// Memoizes another lookup in a concurrent map
pub struct CachedSynonyms<L> {
    inner: L,
    memo: DashMap<String, Vec<String>>,
}

impl<L: SynonymLookup> CachedSynonyms<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            memo: DashMap::new(),
        }
    }

    /// Number of memoized lemmas
    pub fn cached_len(&self) -> usize {
        self.memo.len()
    }
}

impl<L: SynonymLookup> SynonymLookup for CachedSynonyms<L> {
    fn synonyms_of(&self, lemma: &str) -> Vec<String> {
        if let Some(hit) = self.memo.get(lemma) {
            return hit.clone();
        }
        let synonyms = self.inner.synonyms_of(lemma);
        self.memo.insert(lemma.to_string(), synonyms.clone());
        synonyms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl SynonymLookup for Counting {
        fn synonyms_of(&self, lemma: &str) -> Vec<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            vec![format!("{}-like", lemma)]
        }
    }

    #[test]
    fn static_groups_are_symmetric() {
        let synonyms = StaticSynonyms::new().with_group(&["熊", "クマ", "ベア"]);
        assert_eq!(synonyms.synonyms_of("熊"), vec!["クマ", "ベア"]);
        assert_eq!(synonyms.synonyms_of("ベア"), vec!["熊", "クマ"]);
        assert!(synonyms.synonyms_of("犬").is_empty());
    }

    #[test]
    fn overlapping_groups_merge_without_duplicates() {
        let synonyms = StaticSynonyms::new()
            .with_group(&["川", "河"])
            .with_group(&["川", "河", "河川"]);
        assert_eq!(synonyms.synonyms_of("川"), vec!["河", "河川"]);
    }

    #[test]
    fn no_synonyms_is_empty() {
        assert!(NoSynonyms.synonyms_of("熊").is_empty());
    }

    #[test]
    fn cached_lookup_hits_inner_once() {
        let cached = CachedSynonyms::new(Counting {
            calls: AtomicUsize::new(0),
        });
        assert_eq!(cached.synonyms_of("熊"), vec!["熊-like"]);
        assert_eq!(cached.synonyms_of("熊"), vec!["熊-like"]);
        cached.synonyms_of("犬");
        assert_eq!(cached.inner.calls.load(Ordering::Relaxed), 2);
        assert_eq!(cached.cached_len(), 2);
    }
}
