use minpair_protocol::{DepRel, FeatureAxis, MorphFlags, PartOfSpeech, Token, TokenId};

use crate::AnnotatedSentence;

/// Parser tags of a dependent and its head disagree on an axis they should share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementMismatch {
    pub source: TokenId,
    pub target: TokenId,
    pub axis: FeatureAxis,
    pub source_value: MorphFlags,
    pub target_value: MorphFlags,
}

/// Audits the parser's own tags before any perturbation is attempted.
pub fn check_agreement(sentence: &AnnotatedSentence) -> Vec<AgreementMismatch> {
    let mut errors = Vec::new();

    // 1. Subject-Predicate Agreement
    errors.extend(check_subject_predicate_agreement(sentence));

    // 2. Modifier-Noun Agreement
    errors.extend(check_modifier_agreement(sentence));

    errors
}

fn mismatch(source: &Token, target: &Token, axis: FeatureAxis) -> Option<AgreementMismatch> {
    let source_value = source.features & axis.mask();
    let target_value = target.features & axis.mask();
    (!source_value.is_empty() && !target_value.is_empty() && source_value != target_value).then(|| {
        AgreementMismatch {
            source: source.id,
            target: target.id,
            axis,
            source_value,
            target_value,
        }
    })
}

fn check_subject_predicate_agreement(sentence: &AnnotatedSentence) -> Vec<AgreementMismatch> {
    let mut errors = Vec::new();

    for subject in sentence.tokens().iter().filter(|t| t.deprel == DepRel::Nsubj) {
        let Some(predicate) = sentence.head(subject.id) else {
            continue;
        };
        if !predicate.has(MorphFlags::FINITE) {
            continue;
        }
        errors.extend(mismatch(subject, predicate, FeatureAxis::Number));

        // Nouns carry no person; only pronoun subjects are checked.
        if subject.upos == PartOfSpeech::Pronoun {
            errors.extend(mismatch(subject, predicate, FeatureAxis::Person));
        }
    }
    errors
}

fn check_modifier_agreement(sentence: &AnnotatedSentence) -> Vec<AgreementMismatch> {
    let mut errors = Vec::new();

    for modifier in sentence
        .tokens()
        .iter()
        .filter(|t| matches!(t.deprel, DepRel::Amod | DepRel::Det))
    {
        let Some(head) = sentence.head(modifier.id) else {
            continue;
        };
        if !head.upos.is_nominal() {
            continue;
        }
        errors.extend(mismatch(modifier, head, FeatureAxis::Number));
        errors.extend(mismatch(modifier, head, FeatureAxis::Case));
        if head.has(MorphFlags::SINGULAR) {
            errors.extend(mismatch(modifier, head, FeatureAxis::Gender));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: u32, form: &str, upos: PartOfSpeech, features: MorphFlags, head: u32, deprel: &str) -> Token {
        Token {
            id: TokenId(id),
            form: form.to_string(),
            lemma: form.to_string(),
            upos,
            features,
            head: (head != 0).then_some(TokenId(head)),
            deprel: DepRel::from_label(deprel),
            space_after: true,
        }
    }

    #[test]
    fn test_agreement_check() {
        let sg = MorphFlags::SINGULAR;
        let pl = MorphFlags::PLURAL;
        let nom = MorphFlags::NOMINATIVE;
        let tokens = vec![
            token(1, "Новые", PartOfSpeech::Adjective, pl | nom, 2, "amod"),
            token(2, "дети", PartOfSpeech::Noun, pl | nom, 3, "nsubj"),
            token(3, "играет", PartOfSpeech::Verb, sg | MorphFlags::FINITE | MorphFlags::THIRD_PERSON, 0, "root"),
        ];
        let sentence = AnnotatedSentence::new("s", "Новые дети играет", None, tokens).unwrap();

        let errors = check_agreement(&sentence);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].axis, FeatureAxis::Number);
        assert_eq!(errors[0].source, TokenId(2));
        assert_eq!(errors[0].target_value, sg);
    }
}
