//! Relation tuples extracted from a built scene graph

use std::collections::HashSet;

/// Tuples of one sentence, grouped by shape
///
/// - objects: `word`
/// - attributes: `head_attr`
/// - relations: `subject_relation_object`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphTuples {
    pub objects: Vec<String>,
    pub attributes: Vec<String>,
    pub relations: Vec<String>,
}

impl GraphTuples {
    /// Total number of tuples (duplicates included)
    pub fn len(&self) -> usize {
        self.objects.len() + self.attributes.len() + self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_set(self) -> HashSet<String> {
        self.objects
            .into_iter()
            .chain(self.attributes)
            .chain(self.relations)
            .collect()
    }
}
