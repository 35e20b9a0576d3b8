use minpair_morph::orthography::unify_alphabet;
use minpair_protocol::{MinimalPair, TokenId};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::error::CandidateError;
use crate::resources::Resources;
use crate::rule::Perturbation;

/// Lemmas above this frequency count towards a sentence's coverage.
const COMMON_IPM: f64 = 1.0;

/// Renders the target sentence and fills in the pair's bookkeeping fields.
pub fn assemble(
    sentence: &AnnotatedSentence,
    resources: &Resources,
    candidate: &Candidate,
    perturbation: &Perturbation,
) -> Result<MinimalPair, CandidateError> {
    let rendered = sentence
        .render(&perturbation.edits)
        .map_err(|e| CandidateError::StructuralMismatch(e.to_string()))?;
    let source_sentence = unify_alphabet(sentence.text());
    let target_sentence = unify_alphabet(&rendered.text);

    if source_sentence == target_sentence {
        return Err(CandidateError::StructuralMismatch("target renders as the source".to_string()));
    }
    if !(1..=2).contains(&rendered.spans.len()) {
        return Err(CandidateError::StructuralMismatch(format!(
            "{} altered spans",
            rendered.spans.len()
        )));
    }

    let primary = &perturbation.primary;
    let source_word = sentence
        .token(primary.token)
        .map(|t| t.form.clone())
        .unwrap_or_default();
    let partner = measured_against(candidate);

    Ok(MinimalPair {
        sentence_id: sentence.id().to_string(),
        source_sentence,
        target_sentence,
        source_word,
        target_word: primary.form.clone(),
        phenomenon: candidate.phenomenon,
        family: candidate.phenomenon.family(),
        subtype: perturbation.subtype.unwrap_or(candidate.subtype).to_string(),
        feature: perturbation.feature.label().to_string(),
        source_value: perturbation.source_value.clone(),
        target_value: perturbation.target_value.clone(),
        spans: rendered.spans,
        domain: sentence.domain().map(str::to_string),
        tree_length: partner.and_then(|id| sentence.tree_distance(candidate.target, id)),
        tree_depth: sentence.tree_depth(),
        length: sentence.len() as u32,
        ipm: coverage(sentence, resources),
    })
}

/// Share of non-punctuation tokens whose lemma is common.
fn coverage(sentence: &AnnotatedSentence, resources: &Resources) -> f64 {
    let words: Vec<_> = sentence.tokens().iter().filter(|t| !t.is_punct()).collect();
    if words.is_empty() {
        return 0.0;
    }
    let common = words.iter().filter(|t| resources.ipm(&t.lemma) > COMMON_IPM).count();
    common as f64 / words.len() as f64
}

/// Distance from the target to whichever token the change is measured against.
fn measured_against(candidate: &Candidate) -> Option<TokenId> {
    candidate.controller.or(candidate.anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::{Feature, FeatureAxis, MorphFlags, PartOfSpeech, Phenomenon};
    use minpair_syntax::Edit;

    use crate::rule::PerturbedForm;
    use crate::testkit::{parse, Fixture, PLECHI};

    fn replacement(token: u32, form: &str) -> Perturbation {
        let form = PerturbedForm {
            token: TokenId(token),
            lemma: "плечо".to_string(),
            pos: PartOfSpeech::Noun,
            source_features: MorphFlags::ACCUSATIVE | MorphFlags::PLURAL,
            target_features: MorphFlags::ACCUSATIVE | MorphFlags::SINGULAR,
            form: form.to_string(),
            homonymous: false,
            known: true,
        };
        Perturbation::along(form, FeatureAxis::Number, MorphFlags::PLURAL, MorphFlags::SINGULAR)
    }

    #[test]
    fn test_pair_fields() {
        let sentence = parse(PLECHI);
        let resources = Fixture::new().frequency("рука", 500.0).frequency("широкий", 80.0).resources();
        let candidate = Candidate::new(Phenomenon::NpNumber, TokenId(4)).controlled_by(TokenId(3));

        let pair = assemble(&sentence, &resources, &candidate, &replacement(4, "плечо")).unwrap();
        assert_eq!(pair.target_sentence, "Руками обхватила широкие плечо Окота.");
        assert_eq!((pair.source_word.as_str(), pair.target_word.as_str()), ("плечи", "плечо"));
        assert_eq!(pair.feature, "number");
        assert_eq!(pair.spans.len(), 1);
        assert_eq!(pair.spans[0].source, "плечи");
        assert_eq!(pair.tree_length, Some(1));
        assert_eq!(pair.length, 6);
        assert!((pair.ipm - 0.4).abs() < 1e-9);
        assert_eq!(pair.subtype, "plain");
    }

    #[test]
    fn test_rejects_unchanged_and_scattered_edits() {
        let sentence = parse(PLECHI);
        let resources = Resources::default();
        let candidate = Candidate::new(Phenomenon::NpNumber, TokenId(4));

        let same = replacement(4, "плечи");
        assert!(matches!(
            assemble(&sentence, &resources, &candidate, &same),
            Err(CandidateError::StructuralMismatch(_))
        ));

        let mut scattered = replacement(4, "плечо");
        for (token, form) in [(1, "Рукой"), (6, "!")] {
            scattered.edits.push(Edit::Replace { token: TokenId(token), form: form.to_string() });
        }
        assert!(assemble(&sentence, &resources, &candidate, &scattered).is_err());

        let mut outside = replacement(4, "плечо");
        outside.edits.push(Edit::Replace { token: TokenId(40), form: "x".to_string() });
        assert!(assemble(&sentence, &resources, &candidate, &outside).is_err());
    }

    #[test]
    fn test_rule_subtype_wins() {
        let sentence = parse(PLECHI);
        let candidate = Candidate::new(Phenomenon::AddNewSuffix, TokenId(4)).subtype("plain");
        let mut perturbation = replacement(4, "плечники").with_subtype("suffix");
        perturbation.feature = Feature::Suffix;
        let pair = assemble(&sentence, &Resources::default(), &candidate, &perturbation).unwrap();
        assert_eq!(pair.subtype, "suffix");
        assert_eq!(pair.feature, "suffix");
        assert_eq!(pair.tree_length, None);
    }
}
