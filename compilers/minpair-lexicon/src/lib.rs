pub mod graph;
pub mod solver;

pub use graph::SemanticGraph;
pub use solver::{excluded_class, LexicalClass};

use minpair_protocol::LemmaId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("semantic edge references unknown concept {0}")]
    UnknownConcept(LemmaId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::{Concept, FeatureAxis, PartOfSpeech, Relation, SemanticEdge, SemanticNetwork};

    fn network() -> SemanticNetwork {
        let concept = |id: u32, label: &str| Concept {
            id: LemmaId(id),
            label: label.to_string(),
        };
        let edge = |from: u32, to: u32, relation| SemanticEdge {
            from: LemmaId(from),
            to: LemmaId(to),
            relation,
        };
        SemanticNetwork {
            version: 1,
            concepts: vec![
                concept(1, "коллектив"),
                concept(2, "бригада"),
                concept(3, "руководство"),
                concept(4, "collective"),
                concept(5, "врач"),
                concept(6, "occupation"),
                concept(7, "спать"),
                concept(8, "гулять"),
                concept(9, "intransitive"),
                concept(10, "министр"),
            ],
            edges: vec![
                edge(1, 4, Relation::HasAttribute),
                edge(2, 1, Relation::IsA),
                edge(3, 1, Relation::IsA),
                edge(5, 6, Relation::HasAttribute),
                edge(7, 9, Relation::HasAttribute),
                edge(8, 9, Relation::HasAttribute),
            ],
        }
    }

    #[test]
    fn test_semantic_validation() {
        let graph = SemanticGraph::from_network(&network()).unwrap();

        // "Бригада" inherits "collective" from "коллектив"
        assert!(graph.has_attribute("Бригада", "collective"));
        assert!(!graph.has_attribute("министр", "collective"));
        assert!(!graph.has_attribute("неизвестное", "collective"));

        assert_eq!(graph.members("intransitive"), vec!["спать", "гулять"]);
        assert_eq!(graph.label_of(LemmaId(3)), Some("руководство"));
    }

    #[test]
    fn test_class_exclusion() {
        let graph = SemanticGraph::from_network(&network()).unwrap();
        let noun = PartOfSpeech::Noun;

        assert_eq!(
            excluded_class(&graph, "руководство", noun, FeatureAxis::Number),
            Some(LexicalClass::Collective)
        );
        assert_eq!(excluded_class(&graph, "руководство", noun, FeatureAxis::Gender), None);
        assert_eq!(
            excluded_class(&graph, "врач", noun, FeatureAxis::Gender),
            Some(LexicalClass::Occupation)
        );
        assert_eq!(
            excluded_class(&graph, "Окот", PartOfSpeech::ProperNoun, FeatureAxis::Number),
            Some(LexicalClass::ProperName)
        );
        assert_eq!(excluded_class(&graph, "министр", noun, FeatureAxis::Person), None);
    }

    #[test]
    fn test_dangling_edge() {
        let mut network = network();
        network.edges.push(SemanticEdge {
            from: LemmaId(1),
            to: LemmaId(77),
            relation: Relation::IsA,
        });
        assert!(matches!(
            SemanticGraph::from_network(&network),
            Err(LexiconError::UnknownConcept(LemmaId(77)))
        ));
    }
}
