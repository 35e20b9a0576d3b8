use minpair_lexicon::{excluded_class, LexicalClass};
use minpair_morph::orthography::normalize;
use minpair_protocol::{DepRel, FeatureAxis, MorphFlags, Token};
use tracing::debug;

use crate::candidate::Candidate;
use crate::rule::{Perturbation, RuleContext};

/// Derived lemmas at or above this frequency are real words the dictionary missed.
pub const FREQUENCY_CEILING: f64 = 0.4;

/// Independent post-conditions; a phenomenon declares which of them apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    NoHomonymy,
    NoCoordinationEscape,
    LexicalClassExclusion,
    AttractorConsistency,
    NonExistence,
}

pub struct ValidityFilter<'a> {
    ctx: RuleContext<'a>,
}

impl<'a> ValidityFilter<'a> {
    pub fn new(ctx: RuleContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn accept(&self, checks: &[Check], candidate: &Candidate, perturbation: &Perturbation) -> bool {
        self.evaluate(checks, candidate, perturbation).is_ok()
    }

    /// Runs `checks` in order and names the first that fails.
    pub fn evaluate(
        &self,
        checks: &[Check],
        candidate: &Candidate,
        perturbation: &Perturbation,
    ) -> Result<(), Check> {
        for &check in checks {
            let passed = match check {
                Check::NoHomonymy => self.no_homonymy(candidate, perturbation),
                Check::NoCoordinationEscape => self.no_coordination_escape(candidate, perturbation),
                Check::LexicalClassExclusion => self.lexical_class_allowed(candidate, perturbation),
                Check::AttractorConsistency => attractor_consistent(candidate, perturbation),
                Check::NonExistence => self.non_existent(perturbation),
            };
            if !passed {
                debug!(
                    sentence = self.ctx.sentence.id(),
                    phenomenon = %candidate.phenomenon,
                    target = %candidate.target,
                    form = %perturbation.primary.form,
                    ?check,
                    "candidate rejected"
                );
                return Err(check);
            }
        }
        Ok(())
    }

    fn no_homonymy(&self, candidate: &Candidate, perturbation: &Perturbation) -> bool {
        let changed = perturbation.forms().all(|form| {
            !form.homonymous
                && self
                    .ctx
                    .token(form.token)
                    .map_or(true, |source| normalize(&source.form) != normalize(&form.form))
        });
        if !changed {
            return false;
        }

        // The controller must not be readable as agreeing with the new value.
        let (Some(axis), Some(value), Some(controller)) = (
            candidate.phenomenon.axis(),
            perturbation.new_value,
            candidate.controller.and_then(|id| self.ctx.token(id)),
        ) else {
            return true;
        };
        if perturbation.secondary.is_some() {
            return true;
        }
        let case = match axis {
            FeatureAxis::Case => MorphFlags::empty(),
            _ => controller.features & FeatureAxis::Case.mask(),
        };
        !self.ctx.analyzer.analyze(&controller.form).iter().any(|analysis| {
            normalize(&analysis.lemma) == normalize(&controller.lemma)
                && analysis.features & axis.mask() == value
                && (case.is_empty() || analysis.features.contains(case))
        })
    }

    fn no_coordination_escape(&self, candidate: &Candidate, perturbation: &Perturbation) -> bool {
        if perturbation.new_value != Some(MorphFlags::PLURAL) {
            return true;
        }
        let Some(controller) = candidate.controller.and_then(|id| self.ctx.token(id)) else {
            return true;
        };
        controller.deprel != DepRel::Conj
            && !self
                .ctx
                .sentence
                .has_dependent(controller.id, |t| t.deprel == DepRel::Conj)
    }

    fn lexical_class_allowed(&self, candidate: &Candidate, perturbation: &Perturbation) -> bool {
        let (Some(axis), Some(controller)) = (
            candidate.phenomenon.axis(),
            candidate.controller.and_then(|id| self.ctx.token(id)),
        ) else {
            return true;
        };
        let Some(class) = excluded_class(
            &self.ctx.resources.semantics,
            &controller.lemma,
            controller.upos,
            axis,
        ) else {
            return true;
        };
        if class == LexicalClass::Collective && perturbation.new_value != Some(MorphFlags::PLURAL) {
            return true;
        }
        self.independently_shown(candidate, controller, axis)
    }

    /// Another agreement target of the controller shows the controller's value on `axis`.
    fn independently_shown(&self, candidate: &Candidate, controller: &Token, axis: FeatureAxis) -> bool {
        let Some(value) = axis.value_of(controller.features) else {
            return false;
        };
        let sentence = self.ctx.sentence;
        let modifiers = sentence
            .dependents(controller.id)
            .filter(|t| matches!(t.deprel, DepRel::Amod | DepRel::Det));
        let predicate = controller
            .deprel
            .is_subject()
            .then(|| sentence.head(controller.id))
            .flatten();
        modifiers
            .chain(predicate)
            .filter(|t| t.id != candidate.target)
            .any(|t| axis.value_of(t.features) == Some(value))
    }

    fn non_existent(&self, perturbation: &Perturbation) -> bool {
        let analyzer = self.ctx.analyzer;
        perturbation.forms().all(|form| {
            let derived = self
                .ctx
                .token(form.token)
                .map_or(true, |source| !source.lemma_is(&form.lemma));
            let attested = analyzer.is_known(&form.lemma)
                || self.ctx.resources.ipm(&form.lemma) >= FREQUENCY_CEILING;
            !form.known && !(derived && attested)
        })
    }
}

fn attractor_consistent(candidate: &Candidate, perturbation: &Perturbation) -> bool {
    match candidate.attractor {
        Some(attractor) => perturbation.new_value == Some(attractor.value),
        None => true,
    }
}
