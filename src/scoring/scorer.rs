//! Single-pair scoring: parse, build, extract, match

use super::matcher::{score_tuples, strip_zero_pronoun, Score};
use crate::builder::SceneGraphBuilder;
use crate::graph::SceneGraph;
use crate::parse::SentenceParser;
use crate::synonym::SynonymLookup;
use std::collections::HashSet;
use std::sync::Arc;

/// Tuple sets of one (references, candidate) pair, placeholder tuples removed
#[derive(Debug, Clone, Default)]
pub struct TupleSets {
    pub candidate: HashSet<String>,
    /// Union over every reference sentence
    pub reference: HashSet<String>,
    /// Analyzer errors met along the way; those sentences count as empty
    pub failures: Vec<String>,
}

/// Scores candidates against references with one parser
pub struct Scorer<P> {
    parser: P,
    synonyms: Arc<dyn SynonymLookup>,
    builder: SceneGraphBuilder,
}

impl<P: SentenceParser> Scorer<P> {
    pub fn new(parser: P, synonyms: Arc<dyn SynonymLookup>) -> Self {
        Self {
            parser,
            synonyms,
            builder: SceneGraphBuilder::new(),
        }
    }

    pub fn with_builder(mut self, builder: SceneGraphBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn synonyms(&self) -> &Arc<dyn SynonymLookup> {
        &self.synonyms
    }

    /// Parse and build the scene graph of one sentence
    pub async fn graph(&self, sentence: &str) -> SceneGraph {
        let outcome = self.parser.parse(sentence).await;
        if let Err(e) = &outcome {
            tracing::warn!(parser = self.parser.id(), sentence, error = %e, "parse failed");
        }
        self.builder.build_outcome(&outcome)
    }

    /// Collect the tuple sets of a pair. References are parsed before the
    /// candidate, one sentence at a time.
    pub async fn tuple_sets(&self, references: &[String], candidate: &str) -> TupleSets {
        let mut sets = TupleSets::default();
        for reference in references {
            let tuples = self.sentence_tuples(reference, &mut sets.failures).await;
            sets.reference.extend(tuples);
        }
        sets.candidate = self.sentence_tuples(candidate, &mut sets.failures).await;
        sets
    }

    async fn sentence_tuples(&self, sentence: &str, failures: &mut Vec<String>) -> HashSet<String> {
        let outcome = self.parser.parse(sentence).await;
        if let Err(e) = &outcome {
            tracing::warn!(parser = self.parser.id(), sentence, error = %e, "parse failed");
            failures.push(format!("{}: {}", sentence, e));
        }
        let mut tuples = self.builder.build_outcome(&outcome).tuples().into_set();
        strip_zero_pronoun(&mut tuples);
        tuples
    }

    /// Precision, recall and F of `candidate` against `references`
    pub async fn evaluate(&self, references: &[String], candidate: &str) -> Score {
        let sets = self.tuple_sets(references, candidate).await;
        let score = score_tuples(sets.candidate, sets.reference, self.synonyms.as_ref());
        tracing::debug!(
            candidate,
            precision = score.precision,
            recall = score.recall,
            f = score.f,
            "scored pair"
        );
        score
    }

    /// F score of `candidate` against `references`, in [0, 1]
    pub async fn score(&self, references: &[String], candidate: &str) -> f64 {
        self.evaluate(references, candidate).await.f
    }
}
