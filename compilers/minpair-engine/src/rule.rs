//! Shared machinery of perturbation rules: the rule signature, the perturbation
//! record and the inflection helper every axis-changing rule goes through.

use minpair_morph::orthography::{
    capitalize_like, differs_only_by_yo, has_forbidden_onset, has_forbidden_sequence, normalize,
};
use minpair_morph::{MorphAnalyzer, ResolvedToken};
use minpair_protocol::{
    Animacy, Aspect, Case, Feature, FeatureAxis, Gender, MorphFlags, Number, PartOfSpeech, Tense, Token,
    TokenId,
};
use minpair_syntax::{AnnotatedSentence, Edit};

use crate::candidate::Candidate;
use crate::error::Unsynthesizable;
use crate::resources::Resources;

/// Read-only world a rule sees.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub sentence: &'a AnnotatedSentence,
    pub analyzer: &'a dyn MorphAnalyzer,
    pub resources: &'a Resources,
}

impl<'a> RuleContext<'a> {
    /// Parser token behind an id the matcher produced.
    pub fn token(&self, id: TokenId) -> Option<&'a Token> {
        self.sentence.token(id)
    }
}

/// Analyzer readings pinned for the candidate's tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub target: Option<ResolvedToken>,
    pub controller: Option<ResolvedToken>,
}

/// The altered surface of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerturbedForm {
    pub token: TokenId,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub source_features: MorphFlags,
    pub target_features: MorphFlags,
    pub form: String,
    /// Collides with another paradigm cell inside the guarded scope.
    pub homonymous: bool,
    /// The analyzer knows the string as a word.
    pub known: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perturbation {
    pub edits: Vec<Edit>,
    pub primary: PerturbedForm,
    /// Second re-inflected token, for phenomena that swap arguments.
    pub secondary: Option<PerturbedForm>,
    pub feature: Feature,
    pub source_value: String,
    pub target_value: String,
    /// New value on the phenomenon's axis.
    pub new_value: Option<MorphFlags>,
    /// Overrides the candidate subtype when the rule refines it.
    pub subtype: Option<&'static str>,
}

impl Perturbation {
    /// A single replacement of `form.token` by `form.form`.
    pub fn replace(form: PerturbedForm, feature: Feature, source: &str, target: &str) -> Self {
        Self {
            edits: vec![Edit::Replace {
                token: form.token,
                form: form.form.clone(),
            }],
            primary: form,
            secondary: None,
            feature,
            source_value: source.to_string(),
            target_value: target.to_string(),
            new_value: None,
            subtype: None,
        }
    }

    /// Replacement along `axis`, labelled with the UD values.
    pub fn along(form: PerturbedForm, axis: FeatureAxis, source: MorphFlags, target: MorphFlags) -> Self {
        let mut perturbation = Self::replace(
            form,
            Feature::Axis(axis),
            source.ud_value().unwrap_or("_"),
            target.ud_value().unwrap_or("_"),
        );
        perturbation.new_value = Some(target);
        perturbation
    }

    pub fn with_subtype(mut self, subtype: &'static str) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Every re-inflected token.
    pub fn forms(&self) -> impl Iterator<Item = &PerturbedForm> {
        std::iter::once(&self.primary).chain(self.secondary.as_ref())
    }
}

pub type RuleOutcome = Result<Perturbation, Unsynthesizable>;

/// A phenomenon's transformation: one entry per licit alternative.
pub type Rule = fn(&RuleContext<'_>, &Candidate, &Resolved) -> Vec<RuleOutcome>;

/// Which other paradigm cells a synthesized form must not coincide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomonymyGuard {
    /// Agreement: cells that still carry the source value on the axis.
    SourceValue(FeatureAxis),
    /// Government: cells in a stop case or in the other number.
    StopCases(MorphFlags),
    /// Any other cell; a hit is fatal.
    AnyOtherCell,
    Unguarded,
}

/// Source bundle with the axis swapped plus the category repairs Russian needs:
/// plural forms lose gender, singular past or adjectival forms take the controller's
/// gender, adjectives mark animacy only in the accusative, and a perfective present
/// reads as future.
pub fn target_bundle(
    source: MorphFlags,
    pos: PartOfSpeech,
    axis: FeatureAxis,
    value: MorphFlags,
    controller: Option<&ResolvedToken>,
) -> Result<MorphFlags, Unsynthesizable> {
    let mut bundle = source.with_axis(axis, value);

    if bundle.contains(MorphFlags::PLURAL) && carries_gender_agreement(source, pos) {
        bundle.remove(Gender::MASK);
    }
    if axis == FeatureAxis::Number
        && value == MorphFlags::SINGULAR
        && carries_gender_agreement(source, pos)
        && !bundle.intersects(Gender::MASK)
    {
        let gender = controller
            .and_then(|c| FeatureAxis::Gender.value_of(c.features))
            .ok_or(Unsynthesizable::MissingFeature("gender"))?;
        bundle |= gender;
    }
    if axis == FeatureAxis::Case && value != MorphFlags::ACCUSATIVE && carries_gender_agreement(source, pos) {
        bundle.remove(Animacy::MASK);
    }
    if bundle.contains(MorphFlags::PERFECTIVE | MorphFlags::PRESENT) {
        bundle = bundle.with_axis(FeatureAxis::Tense, Tense::Future.flag());
    }
    Ok(bundle)
}

/// Past-tense verbs, short forms, participles and adjectives agree in gender in the singular.
fn carries_gender_agreement(features: MorphFlags, pos: PartOfSpeech) -> bool {
    matches!(pos, PartOfSpeech::Adjective | PartOfSpeech::Determiner)
        || features.intersects(MorphFlags::PAST | MorphFlags::SHORT | MorphFlags::PARTICIPLE)
}

/// Projection onto the categories paradigm cells are keyed by.
pub fn inflectional(features: MorphFlags) -> MorphFlags {
    features
        & (Case::CORE
            | Gender::MASK
            | Number::MASK
            | MorphFlags::FIRST_PERSON
            | MorphFlags::SECOND_PERSON
            | MorphFlags::THIRD_PERSON
            | Tense::MASK
            | Aspect::MASK
            | MorphFlags::INFINITIVE
            | MorphFlags::PARTICIPLE
            | MorphFlags::SHORT)
}

/// Surface checks applied to every new string: casing transfer, forbidden letters,
/// ё-only and null changes.
pub fn surface(source: &str, candidate: &str) -> Result<String, Unsynthesizable> {
    let form = capitalize_like(source, candidate);
    if has_forbidden_sequence(&form) || has_forbidden_onset(&form) {
        return Err(Unsynthesizable::Orthography(form));
    }
    if differs_only_by_yo(source, &form) {
        return Err(Unsynthesizable::OptionalDiacritic(form));
    }
    if normalize(source) == normalize(&form) {
        return Err(Unsynthesizable::Unchanged);
    }
    Ok(form)
}

/// Synthesizes `lemma` with `bundle` for the token behind `resolved`.
pub fn inflect(
    ctx: &RuleContext<'_>,
    resolved: &ResolvedToken,
    lemma: &str,
    bundle: MorphFlags,
    guard: HomonymyGuard,
) -> Result<PerturbedForm, Unsynthesizable> {
    let source = ctx
        .token(resolved.token)
        .map(|t| t.form.as_str())
        .unwrap_or_default();
    let synthesized = ctx
        .analyzer
        .synthesize(lemma, resolved.pos, bundle)
        .ok_or_else(|| Unsynthesizable::NoForm {
            lemma: lemma.to_string(),
            features: bundle,
        })?;
    let form = surface(source, &synthesized)?;
    let homonymous = collides(ctx, lemma, resolved, bundle, &form, guard);
    if homonymous && guard == HomonymyGuard::AnyOtherCell {
        return Err(Unsynthesizable::ParadigmCollision(form));
    }
    Ok(PerturbedForm {
        token: resolved.token,
        lemma: lemma.to_string(),
        pos: resolved.pos,
        source_features: resolved.features,
        target_features: bundle,
        known: ctx.analyzer.is_known(&form),
        form,
        homonymous,
    })
}

/// A derived string that is not a paradigm cell (affixation, swapped endings).
pub fn derive(
    ctx: &RuleContext<'_>,
    token: &Token,
    lemma: &str,
    candidate: &str,
    guard: HomonymyGuard,
) -> Result<PerturbedForm, Unsynthesizable> {
    let form = surface(&token.form, candidate)?;
    let key = normalize(&form);
    let homonymous = guard != HomonymyGuard::Unguarded
        && ctx
            .analyzer
            .paradigm(&token.lemma, token.upos)
            .iter()
            .any(|(_, cell)| normalize(cell) == key);
    if homonymous && guard == HomonymyGuard::AnyOtherCell {
        return Err(Unsynthesizable::ParadigmCollision(form));
    }
    Ok(PerturbedForm {
        token: token.id,
        lemma: lemma.to_string(),
        pos: token.upos,
        source_features: token.features,
        target_features: token.features,
        known: ctx.analyzer.is_known(&form),
        form,
        homonymous,
    })
}

fn collides(
    ctx: &RuleContext<'_>,
    lemma: &str,
    resolved: &ResolvedToken,
    bundle: MorphFlags,
    form: &str,
    guard: HomonymyGuard,
) -> bool {
    let key = normalize(form);
    let same_form = |cells: &[(MorphFlags, String)], scope: &dyn Fn(MorphFlags) -> bool| {
        cells
            .iter()
            .any(|(cell, surface)| normalize(surface) == key && scope(*cell))
    };
    let cells = ctx.analyzer.paradigm(lemma, resolved.pos);
    match guard {
        HomonymyGuard::SourceValue(axis) => {
            let Some(source) = axis.value_of(resolved.features) else {
                return false;
            };
            same_form(&cells, &|cell: MorphFlags| cell.contains(source))
        }
        HomonymyGuard::StopCases(stop) => {
            let number = bundle & Number::MASK;
            same_form(&cells, &|cell: MorphFlags| {
                cell.intersects(stop)
                    || (!number.is_empty() && cell.intersects(Number::MASK) && !cell.contains(number))
            })
        }
        HomonymyGuard::AnyOtherCell => same_form(&cells, &|cell: MorphFlags| cell != bundle),
        HomonymyGuard::Unguarded => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(features: MorphFlags) -> ResolvedToken {
        ResolvedToken {
            token: TokenId(1),
            lemma: "руководство".to_string(),
            pos: PartOfSpeech::Noun,
            features,
            rank: None,
        }
    }

    #[test]
    fn test_plural_drops_gender() {
        let past = MorphFlags::PAST | MorphFlags::SINGULAR | MorphFlags::NEUTER | MorphFlags::PERFECTIVE;
        let bundle = target_bundle(past, PartOfSpeech::Verb, FeatureAxis::Number, MorphFlags::PLURAL, None).unwrap();
        assert_eq!(bundle, MorphFlags::PAST | MorphFlags::PLURAL | MorphFlags::PERFECTIVE);
    }

    #[test]
    fn test_singular_borrows_controller_gender() {
        let past = MorphFlags::PAST | MorphFlags::PLURAL;
        let neuter = controller(MorphFlags::NEUTER | MorphFlags::SINGULAR);
        let bundle =
            target_bundle(past, PartOfSpeech::Verb, FeatureAxis::Number, MorphFlags::SINGULAR, Some(&neuter))
                .unwrap();
        assert!(bundle.contains(MorphFlags::NEUTER | MorphFlags::SINGULAR));

        let plural = controller(MorphFlags::PLURAL);
        assert_eq!(
            target_bundle(past, PartOfSpeech::Verb, FeatureAxis::Number, MorphFlags::SINGULAR, Some(&plural)),
            Err(Unsynthesizable::MissingFeature("gender"))
        );
    }

    #[test]
    fn test_perfective_present_becomes_future() {
        let present = MorphFlags::PRESENT | MorphFlags::IMPERFECTIVE | MorphFlags::THIRD_PERSON;
        let bundle = target_bundle(
            present,
            PartOfSpeech::Verb,
            FeatureAxis::Aspect,
            MorphFlags::PERFECTIVE,
            None,
        )
        .unwrap();
        assert!(bundle.contains(MorphFlags::FUTURE | MorphFlags::PERFECTIVE));
        assert!(!bundle.contains(MorphFlags::PRESENT));
    }

    #[test]
    fn test_surface_checks() {
        assert_eq!(surface("Плечи", "плечники").unwrap(), "Плечники");
        assert_eq!(surface("ключа", "ключа"), Err(Unsynthesizable::Unchanged));
        assert!(matches!(surface("все", "всё"), Err(Unsynthesizable::OptionalDiacritic(_))));
        assert!(matches!(surface("лица", "лици"), Err(Unsynthesizable::Orthography(_))));
    }
}
