//! Scoring: tuple matching, single-pair scoring and batch scoring

mod batch;
mod matcher;
mod scorer;

pub use batch::{mean, BatchError, BatchScorer, ItemScore, ScorePair};
pub use matcher::{f_measure, match_count, score_tuples, strip_zero_pronoun, Score, TUPLE_SEPARATOR};
pub use scorer::{Scorer, TupleSets};
