use minpair_protocol::{DepRel, FeatureAxis, MorphFlags, PartOfSpeech, Phenomenon, Token};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::error::Unsynthesizable;
use crate::phenomena::{agreement_host, is_verb};
use crate::rule::{inflect, target_bundle, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

/// Whether `target` shows a value on `axis` that the phenomenon may alternate.
fn licensed(axis: FeatureAxis, target: &Token) -> bool {
    let f = target.features;
    match axis {
        FeatureAxis::Number => {
            axis.value_of(f).is_some()
                && (f.intersects(MorphFlags::FINITE | MorphFlags::SHORT | MorphFlags::PARTICIPLE)
                    || target.upos.compatible(PartOfSpeech::Adjective)
                    || f.contains(MorphFlags::PAST))
        }
        FeatureAxis::Gender => {
            f.contains(MorphFlags::SINGULAR)
                && f.intersects(MorphFlags::PAST | MorphFlags::SHORT)
                && axis.value_of(f).is_some()
        }
        FeatureAxis::Person => {
            f.contains(MorphFlags::FINITE)
                && f.intersects(MorphFlags::PRESENT | MorphFlags::FUTURE)
                && axis.value_of(f).is_some()
        }
        _ => false,
    }
}

/// Nominal subject → finite predicate (or its agreeing auxiliary).
pub fn subject_predicate(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(axis) = phenomenon.axis() else {
        return Vec::new();
    };
    if !token.deprel.is_subject() || !token.upos.is_nominal() {
        return Vec::new();
    }
    let Some(predicate) = sentence.head(token.id) else {
        return Vec::new();
    };
    let target = agreement_host(sentence, predicate);
    if !is_verb(target) && !target.has(MorphFlags::SHORT) {
        return Vec::new();
    }
    if target.lemma_is("быть") && target.has(MorphFlags::PRESENT) {
        return Vec::new();
    }
    if axis == FeatureAxis::Person && token.lemma_is("который") {
        return Vec::new();
    }
    if !licensed(axis, target) {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, target.id).controlled_by(token.id)]
}

/// Clausal subject → singular (neuter) predicate.
pub fn clausal_subject(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(axis) = phenomenon.axis() else {
        return Vec::new();
    };
    if !token.deprel.is_clausal_subject() {
        return Vec::new();
    }
    let Some(predicate) = sentence.head(token.id) else {
        return Vec::new();
    };
    let target = agreement_host(sentence, predicate);
    let singular = target.has(MorphFlags::SINGULAR);
    let fits = match axis {
        FeatureAxis::Number => singular && licensed(axis, target),
        FeatureAxis::Gender => singular && target.has(MorphFlags::NEUTER) && licensed(axis, target),
        _ => false,
    };
    if !fits {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, target.id).controlled_by(token.id)]
}

/// Adjectival modifier → its head noun.
pub fn np_modifier(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(axis) = phenomenon.axis() else {
        return Vec::new();
    };
    if !matches!(token.deprel, DepRel::Amod | DepRel::Det) {
        return Vec::new();
    }
    let participle = token.has(MorphFlags::PARTICIPLE);
    if !(token.upos.compatible(PartOfSpeech::Adjective) || participle) {
        return Vec::new();
    }
    let Some(head) = sentence.head(token.id) else {
        return Vec::new();
    };
    if !head.upos.is_nominal() || sentence.has_dependent(token.id, |t| t.deprel == DepRel::Conj) {
        return Vec::new();
    }
    let f = token.features;
    let fits = match axis {
        FeatureAxis::Number => axis.value_of(f).is_some(),
        FeatureAxis::Gender => f.contains(MorphFlags::SINGULAR) && axis.value_of(f).is_some(),
        FeatureAxis::Case => axis.value_of(f).is_some(),
        _ => false,
    };
    if !fits {
        return Vec::new();
    }
    let candidate = Candidate::new(phenomenon, token.id).controlled_by(head.id);
    vec![if participle {
        candidate.subtype("participle")
    } else {
        candidate
    }]
}

/// Relative `который` → the antecedent of its relative clause.
pub fn relative_pronoun(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(axis) = phenomenon.axis() else {
        return Vec::new();
    };
    if !token.lemma_is("который") {
        return Vec::new();
    }
    let clause = sentence
        .ancestors(token.id)
        .into_iter()
        .find(|id| sentence.token(*id).is_some_and(|t| t.deprel == DepRel::AclRelcl));
    let Some(antecedent) = clause.and_then(|clause| sentence.head(clause)) else {
        return Vec::new();
    };
    let f = token.features;
    let fits = match axis {
        FeatureAxis::Number => axis.value_of(f).is_some(),
        FeatureAxis::Gender => f.contains(MorphFlags::SINGULAR) && axis.value_of(f).is_some(),
        _ => false,
    };
    if !fits || !antecedent.upos.is_nominal() {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id).controlled_by(antecedent.id)]
}

/// Re-inflects the target to every other value of the axis.
pub fn reinflect(ctx: &RuleContext<'_>, candidate: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let (Some(axis), Some(target)) = (candidate.phenomenon.axis(), resolved.target.as_ref()) else {
        return Vec::new();
    };
    let Some(source) = axis.value_of(target.features) else {
        return vec![Err(Unsynthesizable::MissingFeature(axis.name()))];
    };
    let emphatic = ctx.token(target.token).is_some_and(|t| t.lemma_is("сам"));

    axis.alternatives(source, axis.mask())
        .into_iter()
        .filter(|value| !(emphatic && *value == MorphFlags::NOMINATIVE))
        .map(|value| {
            let bundle = target_bundle(target.features, target.pos, axis, value, resolved.controller.as_ref())?;
            let form = inflect(ctx, target, &target.lemma, bundle, HomonymyGuard::SourceValue(axis))?;
            Ok(Perturbation::along(form, axis, source, value))
        })
        .collect()
}
