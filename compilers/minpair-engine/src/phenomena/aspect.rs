use minpair_morph::orthography::normalize;
use minpair_protocol::{DepRel, FeatureAxis, MorphFlags, PartOfSpeech, Phenomenon, Token};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::closed_class::{
    CONTINUATION_VERBS, DEONTIC_VERBS, DURATION_ADVERBS, REPETITION_ADVERBS, REPETITION_QUANTIFIER,
    TIME_PERIODS,
};
use crate::error::Unsynthesizable;
use crate::phenomena::is_negated;
use crate::resources::Resources;
use crate::rule::{inflect, target_bundle, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

const POSTFIXES: [&str; 2] = ["ся", "сь"];

/// An imperfective finite verb or infinitive heading its own clause, with nothing
/// around it that would license the imperfective on other grounds.
fn aspect_host(sentence: &AnnotatedSentence, token: &Token) -> bool {
    let verbal = token.upos == PartOfSpeech::Verb
        && token.features.intersects(MorphFlags::FINITE | MorphFlags::INFINITIVE)
        && token.has(MorphFlags::IMPERFECTIVE);
    if !verbal || token.lemma_in(CONTINUATION_VERBS) {
        return false;
    }
    if matches!(token.deprel, DepRel::Xcomp | DepRel::Csubj | DepRel::Conj) {
        return false;
    }
    if sentence.head(token.id).is_some_and(|head| head.upos == PartOfSpeech::Verb) {
        return false;
    }
    let blocked = sentence.dependents(token.id).any(|dep| {
        matches!(dep.deprel, DepRel::Xcomp | DepRel::Csubj | DepRel::Conj)
            || (dep.upos == PartOfSpeech::Verb && dep.has(MorphFlags::PERFECTIVE))
    });
    !blocked && !in_comparison(sentence, token)
}

/// Comparative constructions keep the imperfective grammatical.
fn in_comparison(sentence: &AnnotatedSentence, verb: &Token) -> bool {
    sentence
        .dependents(verb.id)
        .any(|dep| dep.has(MorphFlags::COMPARATIVE) || sentence.has_dependent(dep.id, |t| t.lemma_is("чем")))
}

/// Imperfective verb modified by a duration adverb.
pub fn duration(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    if !aspect_host(sentence, token) {
        return Vec::new();
    }
    sentence
        .dependents(token.id)
        .find(|dep| dep.deprel == DepRel::Advmod && dep.lemma_in(DURATION_ADVERBS))
        .map(|adverb| vec![Candidate::new(phenomenon, token.id).anchored_at(adverb.id)])
        .unwrap_or_default()
}

/// Imperfective verb with a repetition adverb or a `каждый` + time period phrase.
pub fn repetition(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    if !aspect_host(sentence, token) {
        return Vec::new();
    }
    let adverb = sentence
        .dependents(token.id)
        .find(|dep| dep.deprel == DepRel::Advmod && dep.lemma_in(REPETITION_ADVERBS));
    if let Some(adverb) = adverb {
        return vec![Candidate::new(phenomenon, token.id).anchored_at(adverb.id).subtype("adverb")];
    }
    let phrase = sentence.dependents(token.id).find(|dep| {
        dep.lemma_in(TIME_PERIODS)
            && sentence.has_dependent(dep.id, |t| {
                matches!(t.deprel, DepRel::Det | DepRel::Amod) && t.lemma_is(REPETITION_QUANTIFIER)
            })
    });
    phrase
        .map(|period| vec![Candidate::new(phenomenon, token.id).anchored_at(period.id).subtype("phrase")])
        .unwrap_or_default()
}

/// Imperfective infinitive under a negated deontic predicate.
pub fn deontic(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let infinitive = token.upos == PartOfSpeech::Verb
        && token.has(MorphFlags::INFINITIVE | MorphFlags::IMPERFECTIVE)
        && !token.lemma_in(CONTINUATION_VERBS);
    if !infinitive || in_comparison(sentence, token) {
        return Vec::new();
    }
    let Some(modal) = sentence.head(token.id) else {
        return Vec::new();
    };
    if !modal.lemma_in(DEONTIC_VERBS) || modal.has(MorphFlags::PARTICIPLE) || !is_negated(sentence, modal.id) {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id).anchored_at(modal.id)]
}

/// Most frequent perfective partner; reflexive verbs borrow the partner of their
/// base and keep the postfix.
fn perfective_partner(resources: &Resources, lemma: &str) -> Option<String> {
    let lemma = normalize(lemma);
    if let Some(partner) = resources.perfectives(&lemma).first() {
        return Some(partner.to_string());
    }
    POSTFIXES.iter().find_map(|postfix| {
        let base = lemma.strip_suffix(postfix)?;
        let partner = resources.perfectives(base).first().map(|p| format!("{p}{postfix}"));
        partner
    })
}

fn same_postfix(source: &str, target: &str) -> bool {
    let postfix = |word: &str| {
        let word = normalize(word);
        POSTFIXES.iter().position(|p| word.ends_with(p))
    };
    postfix(source).is_some() == postfix(target).is_some()
}

/// Swaps the imperfective verb for its perfective partner in the same cell.
pub fn perfectivize(ctx: &RuleContext<'_>, _: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let Some(target) = resolved.target.as_ref() else {
        return Vec::new();
    };
    let Some(partner) = perfective_partner(ctx.resources, &target.lemma) else {
        return vec![Err(Unsynthesizable::NoForm {
            lemma: target.lemma.clone(),
            features: MorphFlags::PERFECTIVE,
        })];
    };
    let outcome = target_bundle(
        target.features,
        target.pos,
        FeatureAxis::Aspect,
        MorphFlags::PERFECTIVE,
        None,
    )
    .and_then(|bundle| inflect(ctx, target, &partner, bundle, HomonymyGuard::Unguarded))
    .and_then(|form| {
        let source = ctx.token(target.token).map(|t| t.form.as_str()).unwrap_or_default();
        if !same_postfix(source, &form.form) {
            return Err(Unsynthesizable::Orthography(form.form));
        }
        Ok(Perturbation::along(form, FeatureAxis::Aspect, MorphFlags::IMPERFECTIVE, MorphFlags::PERFECTIVE))
    });
    vec![outcome]
}
