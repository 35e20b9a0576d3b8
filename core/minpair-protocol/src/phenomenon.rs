use core::fmt;
use core::str::FromStr;

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::morphology::FeatureAxis;

/// Dataset family a phenomenon belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Family {
    Agreement,
    Government,
    WordFormation,
    WordInflection,
    Aspect,
    Tense,
    Negation,
    Reflexives,
    ArgumentStructure,
}

impl Family {
    pub const fn as_str(self) -> &'static str {
        match self {
            Family::Agreement => "agreement",
            Family::Government => "government",
            Family::WordFormation => "word_formation",
            Family::WordInflection => "word_inflection",
            Family::Aspect => "aspect",
            Family::Tense => "tense",
            Family::Negation => "negation",
            Family::Reflexives => "reflexives",
            Family::ArgumentStructure => "argument_structure",
        }
    }
}

macro_rules! phenomena {
    ($($variant:ident => $id:literal, $family:ident, $axis:expr;)+) => {
        /// Registry key of one perturbation phenomenon.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Phenomenon {
            $($variant,)+
        }

        impl Phenomenon {
            pub const ALL: &'static [Phenomenon] = &[$(Phenomenon::$variant,)+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Phenomenon::$variant => $id,)+
                }
            }

            pub const fn family(self) -> Family {
                match self {
                    $(Phenomenon::$variant => Family::$family,)+
                }
            }

            /// Axis the phenomenon alternates, when it alternates a grammatical category.
            pub const fn axis(self) -> Option<FeatureAxis> {
                match self {
                    $(Phenomenon::$variant => $axis,)+
                }
            }
        }

        impl FromStr for Phenomenon {
            type Err = UnknownPhenomenon;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(Phenomenon::$variant),)+
                    other => Err(UnknownPhenomenon(String::from(other))),
                }
            }
        }
    };
}

phenomena! {
    NounSubjPredicateNumber => "noun_subj_predicate_agreement_number", Agreement, Some(FeatureAxis::Number);
    NounSubjPredicateGender => "noun_subj_predicate_agreement_gender", Agreement, Some(FeatureAxis::Gender);
    NounSubjPredicatePerson => "noun_subj_predicate_agreement_person", Agreement, Some(FeatureAxis::Person);
    ClauseSubjPredicateNumber => "clause_subj_predicate_agreement_number", Agreement, Some(FeatureAxis::Number);
    ClauseSubjPredicateGender => "clause_subj_predicate_agreement_gender", Agreement, Some(FeatureAxis::Gender);
    NpNumber => "np_agreement_number", Agreement, Some(FeatureAxis::Number);
    NpGender => "np_agreement_gender", Agreement, Some(FeatureAxis::Gender);
    NpCase => "np_agreement_case", Agreement, Some(FeatureAxis::Case);
    AnaphorNumber => "anaphor_agreement_number", Agreement, Some(FeatureAxis::Number);
    AnaphorGender => "anaphor_agreement_gender", Agreement, Some(FeatureAxis::Gender);
    VerbAccObject => "verb_acc_object", Government, Some(FeatureAxis::Case);
    VerbGenObject => "verb_gen_object", Government, Some(FeatureAxis::Case);
    VerbInsObject => "verb_ins_object", Government, Some(FeatureAxis::Case);
    NominalizationCase => "nominalization_case", Government, Some(FeatureAxis::Case);
    AdpGovernmentCase => "adp_government_case", Government, Some(FeatureAxis::Case);
    AddVerbPrefix => "add_verb_prefix", WordFormation, None;
    ChangeVerbPrefixesOrder => "change_verb_prefixes_order", WordFormation, None;
    AddNewSuffix => "add_new_suffix", WordFormation, None;
    ChangeVerbConjugation => "change_verb_conjugation", WordInflection, None;
    ChangeDeclensionEnding => "change_declension_ending", WordInflection, None;
    ChangeDurationAspect => "change_duration_aspect", Aspect, Some(FeatureAxis::Aspect);
    ChangeRepetitionAspect => "change_repetition_aspect", Aspect, Some(FeatureAxis::Aspect);
    DeonticImperfective => "deontic_imp", Aspect, Some(FeatureAxis::Aspect);
    VerbTense => "verb_tense", Tense, Some(FeatureAxis::Tense);
    TenseMarker => "tense_marker", Tense, None;
    NegativeConcord => "negative_concord", Negation, None;
    NegativePronounsTo => "negative_pronouns_to", Negation, None;
    NegativePronounsFrom => "negative_pronouns_from", Negation, None;
    ExternalPossessor => "external_possessor", Reflexives, None;
    TransitiveVerb => "transitive_verb", ArgumentStructure, None;
    TransitiveVerbSubjectPerm => "transitive_verb_subject_perm", ArgumentStructure, Some(FeatureAxis::Animacy);
    TransitiveVerbSubjectRand => "transitive_verb_subject_rand", ArgumentStructure, Some(FeatureAxis::Animacy);
}

impl fmt::Display for Phenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized as its registry id.
#[cfg(feature = "serde")]
impl serde::Serialize for Phenomenon {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Phenomenon {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhenomenon(pub String);

impl fmt::Display for UnknownPhenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phenomenon: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownPhenomenon {}
