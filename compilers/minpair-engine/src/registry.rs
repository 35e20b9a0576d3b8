//! Static table binding each phenomenon to its matcher, rule and post-conditions.

use minpair_protocol::{
    Animacy, Aspect, Case, FeatureAxis, Gender, MorphFlags, Number, Person, Phenomenon, Tense,
};

use crate::filter::Check;
use crate::matcher::Matcher;
use crate::phenomena::{
    agreement, argument_structure, aspect, government, inflection, negation, reflexives, tense, word_formation,
};
use crate::rule::Rule;

/// Which candidate tokens are pinned to an analyzer reading before the rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    TargetAndController,
    Target,
    /// Rules that work on the surface string alone.
    Nothing,
}

pub struct PhenomenonEntry {
    pub phenomenon: Phenomenon,
    pub matcher: Matcher,
    pub rule: Rule,
    pub checks: &'static [Check],
    pub resolve: Resolve,
    /// Categories the analyzer reading must share with the parser tags.
    pub required: MorphFlags,
    /// Axes on which target and controller must already agree.
    pub agreement: &'static [FeatureAxis],
}

const AGREEMENT_CHECKS: &[Check] = &[
    Check::NoHomonymy,
    Check::NoCoordinationEscape,
    Check::LexicalClassExclusion,
    Check::AttractorConsistency,
];
const HOMONYMY: &[Check] = &[Check::NoHomonymy];
const NOVEL: &[Check] = &[Check::NonExistence];

const PREDICATE: MorphFlags = Number::MASK.union(Gender::MASK).union(Person::MASK).union(Tense::MASK);
const NOMINAL: MorphFlags = Case::MASK.union(Number::MASK).union(Gender::MASK);
const VERBAL: MorphFlags = Aspect::MASK
    .union(Tense::MASK)
    .union(Number::MASK)
    .union(Gender::MASK)
    .union(Person::MASK);
const ARGUMENT: MorphFlags = Case::MASK.union(Number::MASK).union(Gender::MASK).union(Animacy::MASK);

const SUBJECT_AXES: &[FeatureAxis] = &[FeatureAxis::Number, FeatureAxis::Gender, FeatureAxis::Person];
const NP_AXES: &[FeatureAxis] = &[FeatureAxis::Number, FeatureAxis::Gender, FeatureAxis::Case];
const ANAPHOR_AXES: &[FeatureAxis] = &[FeatureAxis::Number, FeatureAxis::Gender];

macro_rules! registry {
    ($($variant:ident => $matcher:path, $rule:path, $checks:expr, $resolve:ident, $required:expr, $agreement:expr;)+) => {
        static REGISTRY: &[PhenomenonEntry] = &[
            $(PhenomenonEntry {
                phenomenon: Phenomenon::$variant,
                matcher: $matcher,
                rule: $rule,
                checks: $checks,
                resolve: Resolve::$resolve,
                required: $required,
                agreement: $agreement,
            },)+
        ];
    };
}

registry! {
    NounSubjPredicateNumber => agreement::subject_predicate, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, PREDICATE, SUBJECT_AXES;
    NounSubjPredicateGender => agreement::subject_predicate, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, PREDICATE, SUBJECT_AXES;
    NounSubjPredicatePerson => agreement::subject_predicate, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, PREDICATE, SUBJECT_AXES;
    ClauseSubjPredicateNumber => agreement::clausal_subject, agreement::reinflect, AGREEMENT_CHECKS, Target, PREDICATE, &[];
    ClauseSubjPredicateGender => agreement::clausal_subject, agreement::reinflect, AGREEMENT_CHECKS, Target, PREDICATE, &[];
    NpNumber => agreement::np_modifier, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, NOMINAL, NP_AXES;
    NpGender => agreement::np_modifier, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, NOMINAL, NP_AXES;
    NpCase => agreement::np_modifier, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, NOMINAL, NP_AXES;
    AnaphorNumber => agreement::relative_pronoun, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, NOMINAL, ANAPHOR_AXES;
    AnaphorGender => agreement::relative_pronoun, agreement::reinflect, AGREEMENT_CHECKS, TargetAndController, NOMINAL, ANAPHOR_AXES;
    VerbAccObject => government::verb_object, government::change_case, HOMONYMY, Target, Case::MASK.union(Number::MASK), &[];
    VerbGenObject => government::verb_object, government::change_case, HOMONYMY, Target, Case::MASK.union(Number::MASK), &[];
    VerbInsObject => government::verb_object, government::change_case, HOMONYMY, Target, Case::MASK.union(Number::MASK), &[];
    NominalizationCase => government::nominalization, government::change_case, HOMONYMY, Target, Case::MASK.union(Number::MASK), &[];
    AdpGovernmentCase => government::adposition, government::change_case, HOMONYMY, Target, Case::MASK.union(Number::MASK), &[];
    AddVerbPrefix => word_formation::verb, word_formation::add_prefix, NOVEL, Nothing, MorphFlags::empty(), &[];
    ChangeVerbPrefixesOrder => word_formation::verb, word_formation::swap_prefixes, NOVEL, Nothing, MorphFlags::empty(), &[];
    AddNewSuffix => word_formation::suffix_host, word_formation::add_suffix, NOVEL, Nothing, MorphFlags::empty(), &[];
    ChangeVerbConjugation => inflection::finite_nonpast, inflection::swap_conjugation, NOVEL, Nothing, MorphFlags::empty(), &[];
    ChangeDeclensionEnding => inflection::oblique_noun, inflection::swap_declension, NOVEL, Nothing, MorphFlags::empty(), &[];
    ChangeDurationAspect => aspect::duration, aspect::perfectivize, HOMONYMY, Target, VERBAL, &[];
    ChangeRepetitionAspect => aspect::repetition, aspect::perfectivize, HOMONYMY, Target, VERBAL, &[];
    DeonticImperfective => aspect::deontic, aspect::perfectivize, HOMONYMY, Target, VERBAL, &[];
    VerbTense => tense::marked_verb, tense::flip_tense, HOMONYMY, Target, VERBAL, &[];
    TenseMarker => tense::verb_marker, tense::flip_marker, &[], Nothing, MorphFlags::empty(), &[];
    NegativeConcord => negation::concord, negation::move_negation, &[], Nothing, MorphFlags::empty(), &[];
    NegativePronounsTo => negation::indefinite, negation::to_negative, &[], Nothing, MorphFlags::empty(), &[];
    NegativePronounsFrom => negation::negative, negation::from_negative, &[], Nothing, MorphFlags::empty(), &[];
    ExternalPossessor => reflexives::external_possessor, reflexives::reflexivize, &[], Nothing, MorphFlags::empty(), &[];
    TransitiveVerb => argument_structure::transitive_verb, argument_structure::intransitivize, HOMONYMY, Target, VERBAL, &[];
    TransitiveVerbSubjectPerm => argument_structure::animate_subject, argument_structure::permute_arguments, HOMONYMY, TargetAndController, ARGUMENT, &[];
    TransitiveVerbSubjectRand => argument_structure::animate_subject, argument_structure::inanimate_subject, HOMONYMY, Target, ARGUMENT, &[];
}

/// The registered entry of `phenomenon`.
pub fn entry(phenomenon: Phenomenon) -> Option<&'static PhenomenonEntry> {
    REGISTRY.iter().find(|entry| entry.phenomenon == phenomenon)
}

pub fn entries() -> &'static [PhenomenonEntry] {
    REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_phenomenon_registered_in_order() {
        let registered: Vec<Phenomenon> = entries().iter().map(|e| e.phenomenon).collect();
        assert_eq!(registered, Phenomenon::ALL);
    }

    #[test]
    fn test_controller_resolution_matches_agreement_axes() {
        for entry in entries() {
            if !entry.agreement.is_empty() {
                assert_eq!(entry.resolve, Resolve::TargetAndController, "{}", entry.phenomenon);
            }
            if entry.resolve == Resolve::Nothing {
                assert!(entry.required.is_empty(), "{}", entry.phenomenon);
            }
        }
    }
}
