//! Shared fixtures for the integration tests
//!
//! Sentences are paired with hand-built parses shaped like KNP output, so
//! the tests run without Juman++ or KNP installed.

#![allow(dead_code)]

use scenescore::{MockParser, ParsedSentence, PredicateTag};

pub const BEAR_FIGHTING: &str = "川の中で黒い熊が取っ組み合いをしている";
pub const BEARS_QUARRELING: &str = "湖の中で喧嘩をする熊";
pub const BEAR_SOAKING: &str = "川に浸かる熊";

/// Candidate on the same topic as the bear references
pub const BEAR_CANDIDATE: &str = "川の中で熊が喧嘩している";
/// Candidate on another topic that only shares the river with the references
pub const KITCHEN_CANDIDATE: &str = "キッチンの窓から男性が川を見ている";

pub fn bear_references() -> Vec<String> {
    [BEAR_FIGHTING, BEARS_QUARRELING, BEAR_SOAKING]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parser that knows every fixture sentence
pub fn fixture_parser() -> MockParser {
    MockParser::new()
        .with_parse(
            BEAR_FIGHTING,
            ParsedSentence::new()
                .with_predicate(PredicateTag::new("黒い").with_argument("ガ", "熊"))
                .with_predicate(
                    PredicateTag::new("取っ組み合う")
                        .with_argument("ガ", "熊")
                        .with_argument("デ", "川"),
                ),
        )
        .with_parse(
            BEARS_QUARRELING,
            ParsedSentence::new().with_predicate(
                PredicateTag::new("喧嘩する")
                    .with_argument("ガ", "熊")
                    .with_argument("デ", "湖"),
            ),
        )
        .with_parse(
            BEAR_SOAKING,
            ParsedSentence::new().with_predicate(
                PredicateTag::new("浸かる")
                    .with_argument("ガ", "熊")
                    .with_argument("ニ", "川"),
            ),
        )
        .with_parse(
            BEAR_CANDIDATE,
            ParsedSentence::new().with_predicate(
                PredicateTag::new("喧嘩する")
                    .with_argument("ガ", "熊")
                    .with_argument("デ", "川"),
            ),
        )
        .with_parse(
            KITCHEN_CANDIDATE,
            ParsedSentence::new().with_predicate(
                PredicateTag::new("見る")
                    .with_argument("ガ", "男性")
                    .with_argument("ヲ", "川")
                    .with_argument("デ", "キッチン"),
            ),
        )
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
