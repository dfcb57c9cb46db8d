//! SceneGraph: node arena with forward and reverse adjacency tables

use super::node::{NodeId, NodeKind, PartOfSpeech, SceneNode, GENITIVE_MARKER};
use super::tuples::GraphTuples;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Directed graph of the objects, attributes and relations in one sentence
///
/// Nodes live in an append-only arena addressed by [`NodeId`]. Every edge
/// is recorded in the forward table of its source and the reverse table of
/// its destination; insertion updates both or neither. Cycles are allowed
/// (coordination mirrors incoming edges in both directions).
///
/// The graph is mutated while a sentence is being read and during one
/// [`build`](SceneGraph::build) pass; tuple extraction only reads it.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    forward: Vec<Vec<NodeId>>,
    reverse: Vec<Vec<NodeId>>,
    edge_set: HashSet<(NodeId, NodeId)>,
    text_index: HashMap<String, Vec<NodeId>>,
    built: bool,
    zero_pronouns: bool,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create an empty graph with zero-pronoun completion enabled
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            forward: Vec::new(),
            reverse: Vec::new(),
            edge_set: HashSet::new(),
            text_index: HashMap::new(),
            built: false,
            zero_pronouns: true,
        }
    }

    /// Enable or disable zero-pronoun completion during `build`
    pub fn with_zero_pronouns(mut self, enabled: bool) -> Self {
        self.zero_pronouns = enabled;
        self
    }

    // === Construction ===

    /// Add a node, reusing an existing node with the same text
    pub fn add_node(
        &mut self,
        text: &str,
        lemma: &str,
        part_of_speech: PartOfSpeech,
    ) -> NodeId {
        if let Some(&existing) = self.text_index.get(text).and_then(|ids| ids.first()) {
            return existing;
        }
        self.push_node(SceneNode::new(self.nodes.len(), text, lemma, part_of_speech))
    }

    /// Add a node even if another node already carries the same text
    pub fn add_unique_node(
        &mut self,
        text: &str,
        lemma: &str,
        part_of_speech: PartOfSpeech,
    ) -> NodeId {
        self.push_node(SceneNode::new(self.nodes.len(), text, lemma, part_of_speech))
    }

    fn push_node(&mut self, node: SceneNode) -> NodeId {
        let id = node.id;
        self.text_index.entry(node.text.clone()).or_default().push(id);
        self.nodes.push(node);
        self.forward.push(Vec::new());
        self.reverse.push(Vec::new());
        id
    }

    /// Add a directed edge
    ///
    /// Returns false when the edge already exists or an endpoint is unknown.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        if source >= self.nodes.len() || target >= self.nodes.len() {
            return false;
        }
        if !self.edge_set.insert((source, target)) {
            return false;
        }
        self.forward[source].push(target);
        self.reverse[target].push(source);
        true
    }

    /// Give each node every incoming edge of the other
    ///
    /// Models coordination ("A と B"): whatever points at one conjunct also
    /// points at the other. The nodes themselves stay distinct. Returns
    /// false, changing nothing, when either id is unknown.
    pub fn inherit_incoming_edges(&mut self, a: NodeId, b: NodeId) -> bool {
        if a >= self.nodes.len() || b >= self.nodes.len() {
            return false;
        }
        let sources_of_a = self.reverse[a].clone();
        let sources_of_b = self.reverse[b].clone();
        for source in sources_of_a {
            self.add_edge(source, b);
        }
        for source in sources_of_b {
            self.add_edge(source, a);
        }
        true
    }

    // === Accessors ===

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Destinations of edges leaving `id`, in insertion order
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.forward.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sources of edges entering `id`, in insertion order
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.reverse.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.edge_set.contains(&(source, target))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// All nodes carrying exactly `text`, in creation order
    pub fn search_nodes(&self, text: &str) -> &[NodeId] {
        self.text_index.get(text).map(Vec::as_slice).unwrap_or(&[])
    }

    // === Build pass ===

    /// Assign node kinds, then recover implicit subjects and zero pronouns
    ///
    /// Runs once; later calls are no-ops.
    pub fn build(&mut self) {
        if self.built {
            return;
        }
        self.assign_node_kinds();
        self.complete_subjects();
        if self.zero_pronouns {
            self.complete_zero_pronouns();
        }
        self.built = true;
    }

    /// Noun phrases are objects; other nodes are attributes when nothing
    /// leaves them and relations otherwise.
    fn assign_node_kinds(&mut self) {
        for (node, targets) in self.nodes.iter_mut().zip(&self.forward) {
            node.kind = match node.part_of_speech {
                PartOfSpeech::NounPhrase => NodeKind::Object,
                PartOfSpeech::Other if targets.is_empty() => NodeKind::Attribute,
                PartOfSpeech::Other => NodeKind::Relation,
            };
        }
    }

    /// Borrow a subject for relations that have none.
    ///
    /// For a subject-less relation `r -> noun`, look at the other relations
    /// pointing at the same noun and take the nearest noun ancestor of the
    /// first one that has any.
    fn complete_subjects(&mut self) {
        for id in 0..self.nodes.len() {
            if self.nodes[id].kind != NodeKind::Relation || !self.reverse[id].is_empty() {
                continue;
            }
            let targets = self.forward[id].clone();
            for target in targets {
                if !self.nodes[target].is_noun_phrase() {
                    continue;
                }
                let sources = self.reverse[target].clone();
                for source in sources {
                    let candidate = &self.nodes[source];
                    if candidate.kind != NodeKind::Relation || candidate.text == GENITIVE_MARKER {
                        continue;
                    }
                    let text = candidate.text.clone();
                    if let Some(subject) = self.resolve_subject(&text, true) {
                        self.add_edge(subject, id);
                        break;
                    }
                }
            }
        }
    }

    /// Attach a placeholder subject to every relation still lacking one
    fn complete_zero_pronouns(&mut self) {
        let existing = self.nodes.len();
        for id in 0..existing {
            if self.nodes[id].kind != NodeKind::Relation || !self.reverse[id].is_empty() {
                continue;
            }
            let placeholder = self.push_node(SceneNode::zero_pronoun(self.nodes.len()));
            self.add_edge(placeholder, id);
        }
    }

    /// Find the nearest noun-phrase ancestor of the first node named `text`
    ///
    /// Walks reverse edges with unit cost in (distance, id) order. The start
    /// node never answers for itself. With `allow_direct == false`, ancestors
    /// within one hop are skipped as well.
    pub fn resolve_subject(&self, text: &str, allow_direct: bool) -> Option<NodeId> {
        let start = *self.search_nodes(text).first()?;
        if self.reverse[start].is_empty() {
            return None;
        }

        let mut distances = vec![usize::MAX; self.nodes.len()];
        distances[start] = 0;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((0usize, start)));
        let mut best: Option<(usize, NodeId)> = None;

        while let Some(Reverse((distance, current))) = queue.pop() {
            if let Some((best_distance, _)) = best {
                if distance >= best_distance {
                    break;
                }
            }
            let eligible = current != start
                && self.nodes[current].is_noun_phrase()
                && (allow_direct || distance > 1);
            if eligible {
                best = Some((distance, current));
            }
            for &source in &self.reverse[current] {
                if distances[source] > distance + 1 {
                    distances[source] = distance + 1;
                    queue.push(Reverse((distance + 1, source)));
                }
            }
        }

        best.map(|(_, id)| id)
    }

    // === Tuple extraction ===

    /// Build (if needed) and extract every tuple
    pub fn tuples(&mut self) -> GraphTuples {
        self.build();
        GraphTuples {
            objects: self.objects(),
            attributes: self.attributes(),
            relations: self.relations(),
        }
    }

    /// Words of all object nodes
    pub fn objects(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Object)
            .map(|node| node.lemma.clone())
            .collect()
    }

    /// `head_attr` for every edge entering an attribute node
    pub fn attributes(&self) -> Vec<String> {
        let mut attributes = Vec::new();
        for node in self.nodes.iter().filter(|n| n.kind == NodeKind::Attribute) {
            for &head in &self.reverse[node.id] {
                attributes.push(format!("{}_{}", self.nodes[head].lemma, node.lemma));
            }
        }
        attributes
    }

    /// `subject_relation_object` for every (source, target) pair of each relation
    pub fn relations(&self) -> Vec<String> {
        let mut relations = Vec::new();
        for node in self.nodes.iter().filter(|n| n.kind == NodeKind::Relation) {
            for &object in &self.forward[node.id] {
                for &subject in &self.reverse[node.id] {
                    relations.push(format!(
                        "{}_{}_{}",
                        self.nodes[subject].lemma, node.lemma, self.nodes[object].lemma
                    ));
                }
            }
        }
        relations
    }
}

impl std::fmt::Display for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (source, targets) in self.forward.iter().enumerate() {
            let src = &self.nodes[source];
            for &target in targets {
                let dst = &self.nodes[target];
                writeln!(f, "{}({}) ----> {}({})", src.lemma, src.kind, dst.lemma, dst.kind)?;
            }
        }
        Ok(())
    }
}
