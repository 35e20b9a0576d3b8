use minpair_morph::orthography::normalize;
use minpair_morph::MorphAgreementResolver;
use minpair_protocol::{
    Case, DepRel, Feature, FeatureAxis, Gender, MorphFlags, Number, PartOfSpeech, Person, Phenomenon, Tense,
    Token,
};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::closed_class::{marker_tense, FUTURE_ADJECTIVES, MARKER_PARTNERS, PAST_ADJECTIVES};
use crate::error::Unsynthesizable;
use crate::phenomena::subject_of;
use crate::rule::{derive, inflect, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    /// An adverb: вчера, завтра.
    Simple,
    /// An adjective inside a time phrase: в прошлом году.
    Expression,
}

/// Tense of a perfective past or future indicative verb whose tense can be flipped.
fn flippable_tense(sentence: &AnnotatedSentence, verb: &Token) -> Option<Tense> {
    let f = verb.features;
    if verb.upos != PartOfSpeech::Verb || !f.contains(MorphFlags::FINITE | MorphFlags::PERFECTIVE) {
        return None;
    }
    if f.intersects(MorphFlags::IMPERATIVE | MorphFlags::CONDITIONAL) {
        return None;
    }
    let tense = Tense::from_flags(f)?;
    // Gendered futures and personal pasts are mistagged.
    let consistent = match tense {
        Tense::Past => !f.intersects(Person::MASK),
        Tense::Future => !f.intersects(Gender::MASK),
        Tense::Present => false,
    };
    let controls_infinitive = sentence
        .has_dependent(verb.id, |t| t.deprel == DepRel::Xcomp && t.has(MorphFlags::INFINITIVE));
    (consistent && !controls_infinitive).then_some(tense)
}

/// The first marker of `tense` among the verb's dependents.
fn find_marker<'s>(sentence: &'s AnnotatedSentence, verb: &Token, tense: Tense) -> Option<(MarkerKind, &'s Token)> {
    let simple = sentence.dependents(verb.id).find(|t| {
        t.deprel == DepRel::Advmod
            && marker_tense(&t.lemma) == Some(tense)
            && !sentence.has_dependent(t.id, |d| d.upos == PartOfSpeech::Adposition)
    });
    if let Some(adverb) = simple {
        return Some((MarkerKind::Simple, adverb));
    }
    sentence
        .dependents(verb.id)
        .filter(|t| t.deprel == DepRel::Obl && t.upos == PartOfSpeech::Noun)
        .find_map(|phrase| {
            sentence.dependents(phrase.id).find(|t| {
                t.deprel == DepRel::Amod && t.upos == PartOfSpeech::Adjective && marker_tense(&t.lemma) == Some(tense)
            })
        })
        .map(|adjective| (MarkerKind::Expression, adjective))
}

/// Perfective verb with a marker of its own tense.
pub fn marked_verb(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(tense) = flippable_tense(sentence, token) else {
        return Vec::new();
    };
    let Some((kind, marker)) = find_marker(sentence, token, tense) else {
        return Vec::new();
    };
    let subtype = match kind {
        MarkerKind::Simple => "simple_marker",
        MarkerKind::Expression => "expression_marker",
    };
    vec![Candidate::new(phenomenon, token.id).anchored_at(marker.id).subtype(subtype)]
}

/// The marker of a perfective verb, which will be flipped instead of the verb.
pub fn verb_marker(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(tense) = flippable_tense(sentence, token) else {
        return Vec::new();
    };
    let Some((kind, marker)) = find_marker(sentence, token, tense) else {
        return Vec::new();
    };
    let subtype = match kind {
        MarkerKind::Simple => "simple",
        MarkerKind::Expression => "expression",
    };
    vec![Candidate::new(phenomenon, marker.id).anchored_at(token.id).subtype(subtype)]
}

fn opposite(tense: Tense) -> Option<Tense> {
    match tense {
        Tense::Past => Some(Tense::Future),
        Tense::Future => Some(Tense::Past),
        Tense::Present => None,
    }
}

/// Moves the verb into the other non-present tense. The future takes its person from
/// the subject (third by default); the singular past takes the subject's gender.
pub fn flip_tense(ctx: &RuleContext<'_>, _: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let Some(target) = resolved.target.as_ref() else {
        return Vec::new();
    };
    let Some((source, value)) = Tense::from_flags(target.features).and_then(|t| Some((t, opposite(t)?))) else {
        return Vec::new();
    };
    let subject = subject_of(ctx.sentence, target.token);

    let mut bundle = target.features.with_axis(FeatureAxis::Tense, value.flag());
    match value {
        Tense::Future => {
            bundle.remove(Gender::MASK);
            let person = subject
                .map(|s| s.features & Person::MASK)
                .filter(|p| !p.is_empty())
                .unwrap_or(MorphFlags::THIRD_PERSON);
            bundle |= person;
        }
        Tense::Past => {
            bundle.remove(Person::MASK);
            if bundle.contains(MorphFlags::SINGULAR) && !bundle.intersects(Gender::MASK) {
                let Some(gender) = subject.and_then(|s| FeatureAxis::Gender.value_of(s.features)) else {
                    return vec![Err(Unsynthesizable::MissingFeature("gender"))];
                };
                bundle |= gender;
            }
        }
        Tense::Present => return Vec::new(),
    }

    let outcome = inflect(ctx, target, &target.lemma, bundle, HomonymyGuard::Unguarded)
        .map(|form| Perturbation::along(form, FeatureAxis::Tense, source.flag(), value.flag()));
    vec![outcome]
}

fn paired_adjective(lemma: &str) -> Option<&'static str> {
    let lemma = normalize(lemma);
    let (from, to) = if FUTURE_ADJECTIVES.contains(&lemma.as_str()) {
        (FUTURE_ADJECTIVES, PAST_ADJECTIVES)
    } else {
        (PAST_ADJECTIVES, FUTURE_ADJECTIVES)
    };
    let index = from.iter().position(|a| *a == lemma)?;
    to.get(index).copied()
}

/// Replaces the marker with its opposite-tense counterpart: the partner adverb,
/// or the paired adjective in the same case, number and gender.
pub fn flip_marker(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(marker) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let Some(source) = marker_tense(&marker.lemma) else {
        return Vec::new();
    };
    let Some(target) = opposite(source) else {
        return Vec::new();
    };
    let (from, to) = (source.ud(), target.ud());

    let lemma = normalize(&marker.lemma);
    if let Some((_, partner)) = MARKER_PARTNERS.iter().find(|(adverb, _)| *adverb == lemma) {
        let outcome = derive(ctx, marker, partner, partner, HomonymyGuard::Unguarded)
            .map(|form| Perturbation::replace(form, Feature::TenseMarker, from, to));
        return vec![outcome];
    }

    let Some(partner) = paired_adjective(&lemma) else {
        return Vec::new();
    };
    let required = Case::MASK | Number::MASK | Gender::MASK;
    let Some(adjective) = MorphAgreementResolver::new(ctx.analyzer).resolve(marker, required).ok() else {
        return vec![Err(Unsynthesizable::NoForm {
            lemma: marker.lemma.clone(),
            features: marker.features,
        })];
    };
    let outcome = inflect(ctx, &adjective, partner, adjective.features, HomonymyGuard::Unguarded)
        .map(|form| Perturbation::replace(form, Feature::TenseMarker, from, to));
    vec![outcome]
}
