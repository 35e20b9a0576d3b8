use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use minpair_morph::orthography::normalize;
use minpair_protocol::{LemmaId, Relation, SemanticNetwork};
use std::collections::HashMap;

use crate::LexiconError;

/// Concepts are words or attribute names; `IsA` edges point at the parent,
/// `HasAttribute` edges at the attribute.
pub struct SemanticGraph {
    graph: Graph<LemmaId, Relation, Directed>,
    index_map: HashMap<LemmaId, NodeIndex>,
    labels: HashMap<String, NodeIndex>,
    names: HashMap<NodeIndex, String>,
}

impl SemanticGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            index_map: HashMap::new(),
            labels: HashMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn from_network(network: &SemanticNetwork) -> Result<Self, LexiconError> {
        let mut graph = Self::new();
        for concept in &network.concepts {
            graph.add_concept(concept.id, &concept.label);
        }
        for edge in &network.edges {
            for id in [edge.from, edge.to] {
                if !graph.index_map.contains_key(&id) {
                    return Err(LexiconError::UnknownConcept(id));
                }
            }
            graph.add_relation(edge.from, edge.to, edge.relation);
        }
        Ok(graph)
    }

    pub fn add_concept(&mut self, id: LemmaId, label: &str) {
        if !self.index_map.contains_key(&id) {
            let idx = self.graph.add_node(id);
            self.index_map.insert(id, idx);
            self.labels.insert(normalize(label), idx);
            self.names.insert(idx, label.to_string());
        }
    }

    pub fn add_relation(&mut self, from: LemmaId, to: LemmaId, rel: Relation) {
        let from_idx = *self.index_map.entry(from).or_insert_with(|| self.graph.add_node(from));
        let to_idx = *self.index_map.entry(to).or_insert_with(|| self.graph.add_node(to));

        self.graph.add_edge(from_idx, to_idx, rel);
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn node(&self, label: &str) -> Option<NodeIndex> {
        self.labels.get(&normalize(label)).copied()
    }

    /// Whether `word` has `attribute`, directly or through its `IsA` ancestors.
    pub fn has_attribute(&self, word: &str, attribute: &str) -> bool {
        let (Some(start_idx), Some(attribute_idx)) = (self.node(word), self.node(attribute)) else {
            return false;
        };

        let mut stack = vec![start_idx];
        let mut visited = vec![];

        while let Some(current_idx) = stack.pop() {
            if visited.contains(&current_idx) {
                continue;
            }
            visited.push(current_idx);

            for edge in self.graph.edges(current_idx) {
                match edge.weight() {
                    Relation::HasAttribute if edge.target() == attribute_idx => return true,
                    Relation::IsA => stack.push(edge.target()),
                    Relation::HasAttribute => {}
                }
            }
        }

        false
    }

    /// Every word carrying `attribute`, inherited ones included, in network order.
    pub fn members(&self, attribute: &str) -> Vec<&str> {
        let Some(attribute_idx) = self.node(attribute) else {
            return Vec::new();
        };

        let mut stack: Vec<NodeIndex> = self
            .graph
            .edges_directed(attribute_idx, Direction::Incoming)
            .filter(|edge| *edge.weight() == Relation::HasAttribute)
            .map(|edge| edge.source())
            .collect();
        let mut members = Vec::new();

        while let Some(current_idx) = stack.pop() {
            if members.contains(&current_idx) {
                continue;
            }
            members.push(current_idx);
            stack.extend(
                self.graph
                    .edges_directed(current_idx, Direction::Incoming)
                    .filter(|edge| *edge.weight() == Relation::IsA)
                    .map(|edge| edge.source()),
            );
        }

        members.sort();
        members
            .into_iter()
            .filter_map(|idx| self.names.get(&idx).map(String::as_str))
            .collect()
    }

    pub fn label_of(&self, id: LemmaId) -> Option<&str> {
        let idx = self.index_map.get(&id)?;
        self.names.get(idx).map(String::as_str)
    }
}

impl Default for SemanticGraph {
    fn default() -> Self {
        Self::new()
    }
}
