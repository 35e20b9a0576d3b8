use minpair_protocol::{FeatureAxis, PartOfSpeech};

use crate::graph::SemanticGraph;

/// Lexical classes the engine consults. Each maps to an attribute concept of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalClass {
    /// бригада, руководство: singular form, plural meaning.
    Collective,
    /// сирота, коллега: either gender on the predicate.
    CommonGender,
    /// врач, директор: masculine noun, feminine referent allowed.
    Occupation,
    /// Verbs taking no direct object.
    Intransitive,
    ProperName,
}

impl LexicalClass {
    pub const fn attribute(self) -> &'static str {
        match self {
            LexicalClass::Collective => "collective",
            LexicalClass::CommonGender => "common_gender",
            LexicalClass::Occupation => "occupation",
            LexicalClass::Intransitive => "intransitive",
            LexicalClass::ProperName => "proper_name",
        }
    }
}

/// Decides whether a controller noun belongs to a class that makes the alternation on
/// `axis` acceptable anyway, and so must not serve as a controller.
pub fn excluded_class(
    graph: &SemanticGraph,
    lemma: &str,
    upos: PartOfSpeech,
    axis: FeatureAxis,
) -> Option<LexicalClass> {
    let is = |class: LexicalClass| graph.has_attribute(lemma, class.attribute());
    let proper = upos == PartOfSpeech::ProperNoun || is(LexicalClass::ProperName);

    match axis {
        FeatureAxis::Number if proper => Some(LexicalClass::ProperName),
        FeatureAxis::Number if is(LexicalClass::Collective) => Some(LexicalClass::Collective),
        FeatureAxis::Gender if proper => Some(LexicalClass::ProperName),
        FeatureAxis::Gender if is(LexicalClass::CommonGender) => Some(LexicalClass::CommonGender),
        FeatureAxis::Gender if is(LexicalClass::Occupation) => Some(LexicalClass::Occupation),
        _ => None,
    }
}
