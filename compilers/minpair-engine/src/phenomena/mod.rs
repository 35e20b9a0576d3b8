//! Matchers and rules, one module per family.

pub mod agreement;
pub mod argument_structure;
pub mod aspect;
pub mod government;
pub mod inflection;
pub mod negation;
pub mod reflexives;
pub mod tense;
pub mod word_formation;

use minpair_protocol::{DepRel, MorphFlags, PartOfSpeech, Token, TokenId};
use minpair_syntax::AnnotatedSentence;

/// The predicate carries a `не` particle.
pub(crate) fn is_negated(sentence: &AnnotatedSentence, id: TokenId) -> bool {
    negation_particle(sentence, id).is_some()
}

pub(crate) fn negation_particle(sentence: &AnnotatedSentence, id: TokenId) -> Option<&Token> {
    sentence
        .dependents(id)
        .find(|t| t.lemma_is("не") && matches!(t.upos, PartOfSpeech::Particle | PartOfSpeech::Adverb))
}

/// The token that shows agreement for a predicate: a finite auxiliary or copula when
/// there is one, the predicate itself otherwise.
pub(crate) fn agreement_host<'s>(sentence: &'s AnnotatedSentence, predicate: &'s Token) -> &'s Token {
    sentence
        .dependents(predicate.id)
        .find(|t| {
            matches!(t.deprel, DepRel::Aux | DepRel::AuxPass | DepRel::Cop)
                && t.features.intersects(MorphFlags::SINGULAR | MorphFlags::PLURAL)
        })
        .unwrap_or(predicate)
}

pub(crate) fn subject_of(sentence: &AnnotatedSentence, predicate: TokenId) -> Option<&Token> {
    sentence.dependents(predicate).find(|t| t.deprel.is_subject())
}

pub(crate) fn is_verb(token: &Token) -> bool {
    matches!(token.upos, PartOfSpeech::Verb | PartOfSpeech::Auxiliary)
}

/// Questions, imperatives and conditionals license both pronoun series.
pub(crate) fn is_irrealis(sentence: &AnnotatedSentence, verb: &Token) -> bool {
    sentence.text().trim_end().ends_with('?')
        || verb.features.intersects(MorphFlags::IMPERATIVE | MorphFlags::CONDITIONAL)
        || sentence.has_dependent(verb.id, |t| t.lemma_is("бы"))
}
