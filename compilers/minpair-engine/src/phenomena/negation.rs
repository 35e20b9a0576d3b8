use minpair_morph::orthography::normalize;
use minpair_morph::MorphAgreementResolver;
use minpair_protocol::{Case, DepRel, Feature, Gender, Number, PartOfSpeech, Phenomenon, Token};
use minpair_syntax::{AnnotatedSentence, Edit};

use crate::candidate::Candidate;
use crate::closed_class::{is_negative_pronoun, lookup, NEGATIVE_PRONOUNS, PRONOUNS_NEGATIVE};
use crate::error::Unsynthesizable;
use crate::phenomena::{is_irrealis, is_negated, negation_particle};
use crate::rule::{derive, inflect, HomonymyGuard, Perturbation, PerturbedForm, Resolved, RuleContext, RuleOutcome};

/// The verb whose polarity licenses the pronoun.
fn licensing_verb<'s>(sentence: &'s AnnotatedSentence, pronoun: &Token) -> Option<&'s Token> {
    let head = sentence.head(pronoun.id)?;
    let verb = match pronoun.deprel {
        DepRel::Obj | DepRel::Nsubj => head,
        DepRel::Advmod if head.upos == PartOfSpeech::Verb => head,
        DepRel::Advmod | DepRel::Nmod | DepRel::Det => {
            let grand = sentence.head(head.id)?;
            if grand.upos == PartOfSpeech::Verb {
                grand
            } else {
                sentence.head(grand.id)?
            }
        }
        _ => return None,
    };
    (verb.upos == PartOfSpeech::Verb).then_some(verb)
}

/// Clause negation of the licensing verb or of the verb it complements.
/// `None` when both are negated.
fn clause_polarity(sentence: &AnnotatedSentence, verb: &Token) -> Option<bool> {
    let own = is_negated(sentence, verb.id);
    let governing = sentence
        .head(verb.id)
        .filter(|head| head.upos == PartOfSpeech::Verb)
        .is_some_and(|head| is_negated(sentence, head.id));
    match (own, governing) {
        (true, true) => None,
        (own, governing) => Some(own || governing),
    }
}

/// Negative pronoun under a negated verb: the particle is moved away from the verb.
pub fn concord(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    if !is_negative_pronoun(&token.lemma) {
        return Vec::new();
    }
    let Some(verb) = sentence.head(token.id).filter(|h| h.upos == PartOfSpeech::Verb) else {
        return Vec::new();
    };
    let Some(particle) = negation_particle(sentence, verb.id) else {
        return Vec::new();
    };
    if sentence.previous(particle.id).is_none() {
        return Vec::new();
    }

    let mut landings = Vec::new();
    for phrase in sentence.dependents(verb.id) {
        let phrasal = matches!(
            phrase.upos,
            PartOfSpeech::Noun | PartOfSpeech::Adjective | PartOfSpeech::Adposition | PartOfSpeech::Pronoun
        );
        if !phrasal
            || phrase.id == token.id
            || phrase.id < particle.id
            || matches!(phrase.deprel, DepRel::Conj | DepRel::Csubj | DepRel::Ccomp)
            || is_negated(sentence, phrase.id)
        {
            continue;
        }
        let Some(&start) = sentence.constituent(phrase.id).first() else {
            continue;
        };
        if start <= verb.id || landings.contains(&start) {
            continue;
        }
        let Some(landing) = sentence.token(start) else {
            continue;
        };
        let blocked = landing.is_punct()
            || landing.id == token.id
            || is_negative_pronoun(&landing.lemma)
            || landing.lemma_in(&["не", "ни"]);
        if !blocked {
            landings.push(start);
        }
    }
    landings
        .into_iter()
        .map(|start| Candidate::new(phenomenon, particle.id).controlled_by(verb.id).anchored_at(start))
        .collect()
}

/// Moves `не` in front of the anchor phrase.
pub fn move_negation(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let (Some(particle), Some(before)) = (ctx.token(candidate.target), candidate.anchor) else {
        return Vec::new();
    };
    let form = PerturbedForm {
        token: particle.id,
        lemma: particle.lemma.clone(),
        pos: particle.upos,
        source_features: particle.features,
        target_features: particle.features,
        form: particle.form.clone(),
        homonymous: false,
        known: true,
    };
    let mut perturbation = Perturbation::replace(
        form,
        Feature::NegationPosition,
        &particle.id.to_string(),
        &before.to_string(),
    );
    perturbation.edits = vec![Edit::Move {
        token: particle.id,
        before,
    }];
    vec![Ok(perturbation)]
}

fn pronoun_candidate(
    sentence: &AnnotatedSentence,
    phenomenon: Phenomenon,
    token: &Token,
    negated: bool,
) -> Vec<Candidate> {
    let table = if negated { PRONOUNS_NEGATIVE } else { NEGATIVE_PRONOUNS };
    if lookup(table, &token.lemma).is_empty() {
        return Vec::new();
    }
    let lemma = normalize(&token.lemma);
    let adverbial = token.deprel == DepRel::Advmod || token.upos == PartOfSpeech::Adverb;
    if (lemma == "ничто" && token.deprel == DepRel::Advmod) || (lemma == "что-то" && adverbial) {
        return Vec::new();
    }
    let Some(verb) = licensing_verb(sentence, token) else {
        return Vec::new();
    };
    if clause_polarity(sentence, verb) != Some(negated) {
        return Vec::new();
    }
    if negated {
        // The indefinite series is licensed in questions, imperatives and conditionals.
        if is_irrealis(sentence, verb) {
            return Vec::new();
        }
        if matches!(lemma.as_str(), "никто" | "ничто") && token.deprel != DepRel::Nsubj {
            return Vec::new();
        }
    }
    vec![Candidate::new(phenomenon, token.id).anchored_at(verb.id)]
}

/// Indefinite pronoun in an affirmative clause.
pub fn indefinite(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    pronoun_candidate(sentence, phenomenon, token, false)
}

/// Negative pronoun in a negated clause.
pub fn negative(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    pronoun_candidate(sentence, phenomenon, token, true)
}

fn swap_pronoun(ctx: &RuleContext<'_>, candidate: &Candidate, to_negative: bool) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let (table, source, target) = if to_negative {
        (NEGATIVE_PRONOUNS, "indefinite", "negative")
    } else {
        (PRONOUNS_NEGATIVE, "negative", "indefinite")
    };
    let mut mask = Case::MASK | Number::MASK;
    if token.upos != PartOfSpeech::Pronoun {
        mask |= Gender::MASK;
    }
    let inflected = token.features.intersects(mask);
    let resolved = inflected
        .then(|| MorphAgreementResolver::new(ctx.analyzer).resolve(token, mask).ok())
        .flatten();

    lookup(table, &token.lemma)
        .iter()
        .map(|&replacement| {
            let form = if to_negative && normalize(&token.form).starts_with("что") {
                derive(ctx, token, replacement, "ничего", HomonymyGuard::Unguarded)?
            } else if !inflected {
                derive(ctx, token, replacement, replacement, HomonymyGuard::Unguarded)?
            } else {
                let resolved = resolved.as_ref().ok_or_else(|| Unsynthesizable::NoForm {
                    lemma: token.lemma.clone(),
                    features: token.features,
                })?;
                let bundle = resolved.features & mask;
                inflect(ctx, resolved, replacement, bundle, HomonymyGuard::Unguarded)?
            };
            Ok(Perturbation::replace(form, Feature::PronounType, source, target))
        })
        .collect()
}

pub fn to_negative(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    swap_pronoun(ctx, candidate, true)
}

pub fn from_negative(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    swap_pronoun(ctx, candidate, false)
}
