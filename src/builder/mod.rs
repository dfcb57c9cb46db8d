//! SceneGraphBuilder: turns a parsed sentence into a scene graph
//!
//! Two rule sets run in order. The predicate-argument rule reads the case
//! frames attached to predicates; the dependency rule reads chunk-to-parent
//! links. Both only add nodes and edges, so a sentence the rules do not
//! understand simply produces a smaller graph.

mod case;

pub use case::{is_location_term, Case, ATTRIBUTE_SUBCATEGORIES, COMPARISON_LABEL, LOCATION_TERMS};

use crate::graph::{NodeId, PartOfSpeech, SceneGraph, GENITIVE_MARKER};
use crate::parse::{ChunkKind, ParseOutcome, ParsedSentence, PredicateTag};

/// Builds [`SceneGraph`]s from [`ParsedSentence`]s
#[derive(Debug, Clone, Copy)]
pub struct SceneGraphBuilder {
    zero_pronouns: bool,
}

impl Default for SceneGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraphBuilder {
    pub fn new() -> Self {
        Self {
            zero_pronouns: true,
        }
    }

    /// Whether built graphs get placeholder subjects for subjectless relations
    pub fn with_zero_pronouns(mut self, enabled: bool) -> Self {
        self.zero_pronouns = enabled;
        self
    }

    /// Graph for the outcome of a parse; a failed parse gives an empty graph
    pub fn build_outcome(&self, outcome: &ParseOutcome) -> SceneGraph {
        match outcome {
            Ok(parsed) => self.build(parsed),
            Err(e) => {
                tracing::debug!(error = %e, "building empty graph for failed parse");
                self.empty_graph()
            }
        }
    }

    /// Apply the construction rules. Never fails.
    pub fn build(&self, parsed: &ParsedSentence) -> SceneGraph {
        let mut graph = self.empty_graph();
        apply_predicate_arguments(&mut graph, &parsed.predicates);
        apply_dependencies(&mut graph, parsed);
        graph
    }

    fn empty_graph(&self) -> SceneGraph {
        SceneGraph::new().with_zero_pronouns(self.zero_pronouns)
    }
}

fn add(graph: &mut SceneGraph, text: &str, part_of_speech: PartOfSpeech) -> NodeId {
    graph.add_node(text, text, part_of_speech)
}

fn apply_predicate_arguments(graph: &mut SceneGraph, predicates: &[PredicateTag]) {
    let mut temporal: Vec<(String, &str)> = Vec::new();
    let mut instrumental: Vec<(String, &str)> = Vec::new();

    for predicate in predicates {
        let text = if predicate.arguments.iter().any(|a| a.case == COMPARISON_LABEL) {
            format!("{}{}", COMPARISON_LABEL, predicate.text)
        } else {
            predicate.text.clone()
        };

        for argument in &predicate.arguments {
            let Some(case) = Case::from_label(&argument.case) else {
                continue;
            };
            match case {
                Case::Subject => {
                    let subject = add(graph, &argument.argument, PartOfSpeech::NounPhrase);
                    let relation = add(graph, &text, PartOfSpeech::Other);
                    graph.add_edge(subject, relation);
                }
                Case::Temporal => temporal.push((text.clone(), argument.argument.as_str())),
                Case::Instrumental => instrumental.push((text.clone(), argument.argument.as_str())),
                _ => {
                    debug_assert!(case.points_at_argument());
                    let relation = add(graph, &text, PartOfSpeech::Other);
                    let object = add(graph, &argument.argument, PartOfSpeech::NounPhrase);
                    graph.add_edge(relation, object);
                }
            }
        }
    }

    // Time expressions describe whoever performs the predicate
    for (predicate, argument) in temporal {
        let subject = graph.resolve_subject(&predicate, true);
        let attribute = add(graph, argument, PartOfSpeech::Other);
        if let Some(subject) = subject {
            graph.add_edge(subject, attribute);
        }
    }

    for (predicate, argument) in instrumental {
        let source = add(graph, &predicate, PartOfSpeech::NounPhrase);
        let target = add(graph, argument, PartOfSpeech::Other);
        graph.add_edge(source, target);
    }
}

fn apply_dependencies(graph: &mut SceneGraph, parsed: &ParsedSentence) {
    for (index, child) in parsed.chunks.iter().enumerate() {
        let Some(parent) = parsed.parent_of(index) else {
            continue;
        };

        match (child.kind, parent.kind) {
            (ChunkKind::Verb, ChunkKind::Verb) => {
                link_verb_chain(graph, &parent.text, &child.text);
            }
            (ChunkKind::Noun, ChunkKind::Noun) if child.raw_text.ends_with('の') => {
                if is_location_term(&parent.text) {
                    let source = add(graph, &child.text, PartOfSpeech::NounPhrase);
                    let target = add(graph, &parent.text, PartOfSpeech::Other);
                    graph.add_edge(source, target);
                } else if is_location_term(&child.text) {
                    let source = add(graph, &child.text, PartOfSpeech::Other);
                    let target = add(graph, &parent.text, PartOfSpeech::NounPhrase);
                    graph.add_edge(source, target);
                } else if !child.has_subcategory(ATTRIBUTE_SUBCATEGORIES) {
                    let source = add(graph, &child.text, PartOfSpeech::NounPhrase);
                    let target = add(graph, &parent.text, PartOfSpeech::NounPhrase);
                    let marker =
                        graph.add_unique_node(GENITIVE_MARKER, GENITIVE_MARKER, PartOfSpeech::Other);
                    graph.add_edge(source, marker);
                    graph.add_edge(marker, target);
                } else {
                    let attribute = add(graph, &child.text, PartOfSpeech::Other);
                    let head = add(graph, &parent.text, PartOfSpeech::NounPhrase);
                    graph.add_edge(head, attribute);
                }
            }
            (ChunkKind::Noun, ChunkKind::Noun) if child.raw_text.ends_with('と') => {
                let a = add(graph, &child.text, PartOfSpeech::NounPhrase);
                let b = add(graph, &parent.text, PartOfSpeech::NounPhrase);
                graph.inherit_incoming_edges(a, b);
            }
            _ => {}
        }
    }
}

/// Connect two chained verbs through the subject of one of them
///
/// The parent side is tried first; the child side only when the parent
/// gives no subject or no node to attach to.
fn link_verb_chain(graph: &mut SceneGraph, parent: &str, child: &str) {
    let sides = [parent, child];
    let mut subject = None;
    let mut target = None;
    for f in 0..2 {
        if subject.is_some() && target.is_some() {
            continue;
        }
        subject = graph.resolve_subject(sides[f], true);
        target = graph.search_nodes(sides[1 - f]).first().copied();
    }
    if let (Some(subject), Some(target)) = (subject, target) {
        graph.add_edge(subject, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKind, ZERO_PRONOUN};
    use crate::parse::{Chunk, Morpheme, ParseError};
    use std::collections::HashSet;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn noun(text: &str, raw: &str) -> Chunk {
        Chunk::new(text, raw, ChunkKind::Noun)
    }

    #[test]
    fn small_red_ball_on_the_table() {
        let parsed = ParsedSentence::new()
            .with_predicate(PredicateTag::new("red").with_argument("ガ", "ball"))
            .with_predicate(PredicateTag::new("small").with_argument("ガ", "ball"))
            .with_predicate(
                PredicateTag::new("is-on")
                    .with_argument("ガ", "ball")
                    .with_argument("ニ", "table"),
            );
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        let tuples = graph.tuples();

        assert_eq!(set_of(&tuples.objects), set(&["ball", "table"]));
        assert_eq!(set_of(&tuples.attributes), set(&["ball_red", "ball_small"]));
        assert_eq!(set_of(&tuples.relations), set(&["ball_is-on_table"]));
    }

    fn set_of(items: &[String]) -> HashSet<String> {
        items.iter().cloned().collect()
    }

    #[test]
    fn subject_and_object_cases() {
        let parsed = ParsedSentence::new().with_predicate(
            PredicateTag::new("着る")
                .with_argument("ガ２", "男の子")
                .with_argument("ヲ", "ズボン"),
        );
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        assert_eq!(graph.relations(), Vec::<String>::new());
        assert_eq!(graph.tuples().relations, vec!["男の子_着る_ズボン"]);
    }

    #[test]
    fn comparison_prefixes_predicate() {
        let parsed = ParsedSentence::new().with_predicate(
            PredicateTag::new("大きい")
                .with_argument("ガ", "象")
                .with_argument("ヨリ", "犬"),
        );
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        assert_eq!(graph.tuples().relations, vec!["象_ヨリ大きい_犬"]);
        assert!(graph.search_nodes("大きい").is_empty());
    }

    #[test]
    fn unknown_cases_are_skipped() {
        let parsed = ParsedSentence::new()
            .with_predicate(PredicateTag::new("走る").with_argument("マデ", "駅"));
        let graph = SceneGraphBuilder::new().build(&parsed);
        assert!(graph.is_empty());
    }

    #[test]
    fn temporal_argument_attaches_to_subject() {
        let parsed = ParsedSentence::new().with_predicate(
            PredicateTag::new("遊ぶ")
                .with_argument("ガ", "子供")
                .with_argument("時間", "夕方"),
        );
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        let tuples = graph.tuples();
        assert!(tuples.attributes.contains(&"子供_夕方".to_string()));
        assert!(tuples.attributes.contains(&"子供_遊ぶ".to_string()));
    }

    #[test]
    fn temporal_without_subject_leaves_detached_node() {
        let parsed = ParsedSentence::new()
            .with_predicate(PredicateTag::new("遊ぶ").with_argument("時間", "夕方"));
        let graph = SceneGraphBuilder::new().build(&parsed);
        let evening = graph.search_nodes("夕方")[0];
        assert!(graph.predecessors(evening).is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn instrumental_argument_reuses_existing_predicate_node() {
        let parsed = ParsedSentence::new().with_predicate(
            PredicateTag::new("泳ぐ")
                .with_argument("ガ", "熊")
                .with_argument("デ", "川"),
        );
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        let swim = graph.search_nodes("泳ぐ")[0];
        let river = graph.search_nodes("川")[0];
        assert!(graph.has_edge(swim, river));
        assert_eq!(graph.node(swim).unwrap().part_of_speech, PartOfSpeech::Other);

        graph.build();
        assert_eq!(graph.node(swim).unwrap().kind, NodeKind::Relation);
        assert_eq!(graph.node(river).unwrap().kind, NodeKind::Attribute);
    }

    #[test]
    fn verb_chain_links_subject_to_other_verb() {
        // 男の子が 帽子を 被り 乗っている
        let parsed = ParsedSentence::new()
            .with_chunk(Chunk::new("被る", "被る", ChunkKind::Verb).with_parent(1))
            .with_chunk(Chunk::new("乗る", "乗る", ChunkKind::Verb))
            .with_predicate(
                PredicateTag::new("被る")
                    .with_argument("ガ", "男の子")
                    .with_argument("ヲ", "帽子"),
            )
            .with_predicate(PredicateTag::new("乗る").with_argument("ニ", "ボード"));
        let graph = SceneGraphBuilder::new().build(&parsed);

        let boy = graph.search_nodes("男の子")[0];
        let ride = graph.search_nodes("乗る")[0];
        assert!(graph.has_edge(boy, ride));
    }

    #[test]
    fn verb_chain_without_subject_adds_nothing() {
        let parsed = ParsedSentence::new()
            .with_chunk(Chunk::new("走る", "走る", ChunkKind::Verb).with_parent(1))
            .with_chunk(Chunk::new("跳ぶ", "跳ぶ", ChunkKind::Verb));
        let graph = SceneGraphBuilder::new().build(&parsed);
        assert!(graph.is_empty());
    }

    #[test]
    fn genitive_with_location_parent() {
        // テーブルの 上
        let parsed = ParsedSentence::new()
            .with_chunk(noun("テーブル", "テーブルの").with_parent(1))
            .with_chunk(noun("上", "上"));
        let graph = SceneGraphBuilder::new().build(&parsed);
        let table = graph.search_nodes("テーブル")[0];
        let on = graph.search_nodes("上")[0];
        assert!(graph.has_edge(table, on));
        assert_eq!(graph.node(on).unwrap().part_of_speech, PartOfSpeech::Other);
    }

    #[test]
    fn genitive_with_location_child() {
        // 上の 棚
        let parsed = ParsedSentence::new()
            .with_chunk(noun("上", "上の").with_parent(1))
            .with_chunk(noun("棚", "棚"));
        let graph = SceneGraphBuilder::new().build(&parsed);
        let above = graph.search_nodes("上")[0];
        let shelf = graph.search_nodes("棚")[0];
        assert!(graph.has_edge(above, shelf));
        assert!(graph.node(shelf).unwrap().is_noun_phrase());
    }

    #[test]
    fn genitive_with_attribute_subcategory() {
        // 赤色の 帽子
        let parsed = ParsedSentence::new()
            .with_chunk(
                noun("赤色", "赤色の")
                    .with_morpheme(Morpheme::new("赤色", "赤色").with_subcategory("色"))
                    .with_parent(1),
            )
            .with_chunk(noun("帽子", "帽子"));
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        assert_eq!(graph.tuples().attributes, vec!["帽子_赤色"]);
    }

    #[test]
    fn genitive_marker_is_fresh_per_link() {
        // 男の子の 犬の 首輪
        let parsed = ParsedSentence::new()
            .with_chunk(noun("男の子", "男の子の").with_parent(1))
            .with_chunk(noun("犬", "犬の").with_parent(2))
            .with_chunk(noun("首輪", "首輪"));
        let mut graph = SceneGraphBuilder::new().build(&parsed);

        let markers = graph.search_nodes(GENITIVE_MARKER).to_vec();
        assert_eq!(markers.len(), 2);
        assert_ne!(markers[0], markers[1]);

        let relations: HashSet<String> = graph.tuples().relations.into_iter().collect();
        assert_eq!(relations, set(&["男の子_の_犬", "犬_の_首輪"]));
    }

    #[test]
    fn coordination_shares_incoming_edges() {
        // 犬と 猫を 撫でる
        let parsed = ParsedSentence::new()
            .with_chunk(noun("犬", "犬と").with_parent(1))
            .with_chunk(noun("猫", "猫を").with_parent(2))
            .with_chunk(Chunk::new("撫でる", "撫でる", ChunkKind::Verb))
            .with_predicate(
                PredicateTag::new("撫でる")
                    .with_argument("ガ", "少女")
                    .with_argument("ヲ", "猫"),
            );
        let mut graph = SceneGraphBuilder::new().build(&parsed);
        let relations: HashSet<String> = graph.tuples().relations.into_iter().collect();
        assert_eq!(relations, set(&["少女_撫でる_猫", "少女_撫でる_犬"]));
    }

    #[test]
    fn zero_pronoun_setting_is_passed_to_graph() {
        let parsed = ParsedSentence::new()
            .with_predicate(PredicateTag::new("置く").with_argument("ヲ", "本"));

        let mut with = SceneGraphBuilder::new().build(&parsed);
        assert_eq!(with.tuples().relations, vec![format!("{}_置く_本", ZERO_PRONOUN)]);

        let mut without = SceneGraphBuilder::new().with_zero_pronouns(false).build(&parsed);
        assert!(without.tuples().relations.is_empty());
    }

    #[test]
    fn failed_parse_builds_empty_graph() {
        let outcome: ParseOutcome = Err(ParseError::Timeout(3));
        let mut graph = SceneGraphBuilder::new().build_outcome(&outcome);
        assert!(graph.is_empty());
        assert!(graph.tuples().is_empty());
    }
}
