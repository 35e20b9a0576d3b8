use minpair_lexicon::LexicalClass;
use minpair_morph::orthography::normalize;
use minpair_morph::ResolvedToken;
use minpair_protocol::{
    Aspect, Case, DepRel, Feature, FeatureAxis, Gender, MorphFlags, Number, PartOfSpeech, Phenomenon, Token,
};
use minpair_syntax::{AnnotatedSentence, Edit};

use crate::candidate::Candidate;
use crate::error::Unsynthesizable;
use crate::rule::{inflect, inflectional, HomonymyGuard, Perturbation, PerturbedForm, Resolved, RuleContext, RuleOutcome};

const POSTFIXES: [&str; 2] = ["ся", "сь"];

fn argument<'s>(sentence: &'s AnnotatedSentence, verb: &Token, relation: DepRel) -> Option<&'s Token> {
    sentence.dependents(verb.id).find(|t| t.deprel == relation)
}

fn transitive_clause<'s>(sentence: &'s AnnotatedSentence, verb: &Token) -> Option<(&'s Token, &'s Token)> {
    if verb.upos != PartOfSpeech::Verb || verb.is_reflexive_form() || verb.has(MorphFlags::PARTICIPLE) {
        return None;
    }
    Some((argument(sentence, verb, DepRel::Nsubj)?, argument(sentence, verb, DepRel::Obj)?))
}

/// A bare common noun of at least two letters with a known gender.
fn plain_noun(sentence: &AnnotatedSentence, token: &Token, pos: &[PartOfSpeech]) -> bool {
    pos.contains(&token.upos)
        && token.form.chars().count() >= 2
        && token.features.intersects(Gender::MASK)
        && !sentence.has_modifier(token.id)
}

/// A verb with both a subject and a direct object.
pub fn transitive_verb(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    match transitive_clause(sentence, token) {
        Some((_, object)) if token.features.intersects(Aspect::MASK) => {
            vec![Candidate::new(phenomenon, token.id).anchored_at(object.id)]
        }
        _ => Vec::new(),
    }
}

/// Animate subject of a transitive verb; the object becomes the controller when the
/// two nouns can trade places.
pub fn animate_subject(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some((subject, object)) = transitive_clause(sentence, token) else {
        return Vec::new();
    };
    if !plain_noun(sentence, subject, &[PartOfSpeech::Noun]) || subject.has(MorphFlags::INANIMATE) {
        return Vec::new();
    }
    let candidate = Candidate::new(phenomenon, subject.id).anchored_at(token.id);
    if phenomenon != Phenomenon::TransitiveVerbSubjectPerm {
        return vec![candidate];
    }
    let permutable = plain_noun(sentence, object, &[PartOfSpeech::Noun, PartOfSpeech::ProperNoun])
        && !object.has(MorphFlags::ANIMATE)
        && subject.features & (Gender::MASK | Number::MASK) == object.features & (Gender::MASK | Number::MASK);
    if !permutable {
        return Vec::new();
    }
    vec![candidate.controlled_by(object.id)]
}

fn is_reflexive_lemma(lemma: &str) -> bool {
    POSTFIXES.iter().any(|p| lemma.ends_with(p))
}

/// First lemma in `lemmas` whose form in the target's cell exists.
fn first_synthesizable<'l>(
    ctx: &RuleContext<'_>,
    target: &ResolvedToken,
    lemmas: impl IntoIterator<Item = &'l str>,
    bundle: MorphFlags,
) -> Result<PerturbedForm, Unsynthesizable> {
    let mut last = Unsynthesizable::NoForm {
        lemma: target.lemma.clone(),
        features: bundle,
    };
    for lemma in lemmas {
        match inflect(ctx, target, lemma, bundle, HomonymyGuard::Unguarded) {
            Ok(form) => return Ok(form),
            Err(e) => last = e,
        }
    }
    Err(last)
}

/// Replaces the verb with the most frequent intransitive verb of the same aspect.
pub fn intransitivize(ctx: &RuleContext<'_>, _: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let Some(target) = resolved.target.as_ref() else {
        return Vec::new();
    };
    let Some(aspect) = FeatureAxis::Aspect.value_of(target.features) else {
        return vec![Err(Unsynthesizable::MissingFeature("aspect"))];
    };
    let source = normalize(&target.lemma);
    let mut verbs: Vec<&str> = ctx
        .resources
        .semantics
        .members(LexicalClass::Intransitive.attribute())
        .into_iter()
        .filter(|lemma| !is_reflexive_lemma(lemma) && normalize(lemma) != source)
        .filter(|lemma| {
            ctx.analyzer
                .lexical(lemma, PartOfSpeech::Verb)
                .is_some_and(|lexical| lexical.contains(aspect))
        })
        .collect();
    verbs.sort_by(|a, b| ctx.resources.ipm(b).total_cmp(&ctx.resources.ipm(a)));

    let outcome = first_synthesizable(ctx, target, verbs, inflectional(target.features)).map(|form| {
        Perturbation::replace(form, Feature::Transitivity, "Tran", "Intr")
    });
    vec![outcome]
}

fn nominal_cell(features: MorphFlags) -> MorphFlags {
    features & (Case::MASK | Number::MASK)
}

fn animacy_change(primary: PerturbedForm) -> Perturbation {
    Perturbation::along(primary, FeatureAxis::Animacy, MorphFlags::ANIMATE, MorphFlags::INANIMATE)
}

/// Swaps subject and object, each taking the other's case.
pub fn permute_arguments(ctx: &RuleContext<'_>, _: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let (Some(subject), Some(object)) = (resolved.target.as_ref(), resolved.controller.as_ref()) else {
        return Vec::new();
    };
    let outcome = (|| {
        let new_subject = inflect(
            ctx,
            subject,
            &object.lemma,
            nominal_cell(subject.features),
            HomonymyGuard::Unguarded,
        )?;
        let new_object = inflect(
            ctx,
            object,
            &subject.lemma,
            nominal_cell(object.features),
            HomonymyGuard::Unguarded,
        )?;
        let mut perturbation = animacy_change(new_subject);
        perturbation.edits.push(Edit::Replace {
            token: new_object.token,
            form: new_object.form.clone(),
        });
        perturbation.secondary = Some(new_object);
        Ok(perturbation)
    })();
    vec![outcome]
}

/// Replaces the animate subject with the most frequent inanimate noun of its gender.
pub fn inanimate_subject(ctx: &RuleContext<'_>, _: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let Some(subject) = resolved.target.as_ref() else {
        return Vec::new();
    };
    let Some(gender) = FeatureAxis::Gender.value_of(subject.features) else {
        return vec![Err(Unsynthesizable::MissingFeature("gender"))];
    };
    let taken: Vec<String> = ctx
        .sentence
        .tokens()
        .iter()
        .filter(|t| t.upos.is_nominal())
        .map(|t| normalize(&t.lemma))
        .collect();
    let nouns = ctx
        .resources
        .by_frequency()
        .into_iter()
        .map(|(lemma, _)| lemma)
        .filter(|lemma| !taken.iter().any(|t| t == lemma))
        .filter(|lemma| {
            ctx.analyzer
                .lexical(lemma, PartOfSpeech::Noun)
                .is_some_and(|lexical| lexical.contains(MorphFlags::INANIMATE | gender))
        });
    let outcome = first_synthesizable(ctx, subject, nouns, nominal_cell(subject.features)).map(animacy_change);
    vec![outcome]
}
