//! Synonym-tolerant tuple matching and the precision/recall/F computation

use crate::graph::ZERO_PRONOUN;
use crate::synonym::SynonymLookup;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Separator between the words of a tuple
pub const TUPLE_SEPARATOR: char = '_';

/// Precision, recall and their harmonic mean
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub precision: f64,
    pub recall: f64,
    pub f: f64,
}

impl Score {
    pub fn new(precision: f64, recall: f64) -> Self {
        Self {
            precision,
            recall,
            f: f_measure(precision, recall),
        }
    }
}

/// Harmonic mean of precision and recall; 0 when both are 0
pub fn f_measure(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / sum
    }
}

/// Remove every tuple with a placeholder word in any position
pub fn strip_zero_pronoun(tuples: &mut HashSet<String>) {
    tuples.retain(|tuple| !has_zero_pronoun(tuple));
}

fn has_zero_pronoun(tuple: &str) -> bool {
    tuple.split(TUPLE_SEPARATOR).any(|word| word == ZERO_PRONOUN)
}

/// Number of tuples in the smaller set that have a match in the other
///
/// A tuple matches when some combination of its words, each replaced by
/// itself or one of its synonyms, is a member of the other set. Matched
/// tuples of the other set are not consumed. Sets of equal size are ordered
/// by their sorted contents, so the count does not depend on argument order.
pub fn match_count(
    a: &HashSet<String>,
    b: &HashSet<String>,
    synonyms: &dyn SynonymLookup,
) -> usize {
    let (query, target) = if queries_first(a, b) { (a, b) } else { (b, a) };
    query
        .iter()
        .filter(|tuple| has_match(tuple, target, synonyms))
        .count()
}

fn queries_first(a: &HashSet<String>, b: &HashSet<String>) -> bool {
    match a.len().cmp(&b.len()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => sorted(a) <= sorted(b),
    }
}

fn sorted(set: &HashSet<String>) -> Vec<&str> {
    let mut words: Vec<&str> = set.iter().map(String::as_str).collect();
    words.sort_unstable();
    words
}

fn has_match(tuple: &str, target: &HashSet<String>, synonyms: &dyn SynonymLookup) -> bool {
    let choices: Vec<Vec<String>> = tuple
        .split(TUPLE_SEPARATOR)
        .map(|word| {
            let mut options = synonyms.synonyms_of(word);
            options.push(word.to_string());
            options
        })
        .collect();

    // Odometer over the cross product, last position turning fastest
    let mut positions = vec![0usize; choices.len()];
    let mut joined = String::new();
    loop {
        joined.clear();
        for (i, (options, &p)) in choices.iter().zip(&positions).enumerate() {
            if i > 0 {
                joined.push(TUPLE_SEPARATOR);
            }
            joined.push_str(&options[p]);
        }
        if target.contains(joined.as_str()) {
            return true;
        }

        let mut column = choices.len();
        loop {
            if column == 0 {
                return false;
            }
            column -= 1;
            positions[column] += 1;
            if positions[column] < choices[column].len() {
                break;
            }
            positions[column] = 0;
        }
    }
}

/// Score a candidate tuple set against a reference tuple set
pub fn score_tuples(
    mut candidate: HashSet<String>,
    mut reference: HashSet<String>,
    synonyms: &dyn SynonymLookup,
) -> Score {
    strip_zero_pronoun(&mut candidate);
    strip_zero_pronoun(&mut reference);

    let matches = match_count(&candidate, &reference, synonyms) as f64;
    let precision = if candidate.is_empty() {
        0.0
    } else {
        matches / candidate.len() as f64
    };
    let recall = if reference.is_empty() {
        0.0
    } else {
        matches / reference.len() as f64
    };
    Score::new(precision, recall)
}
