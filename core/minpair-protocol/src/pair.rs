use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::ids::TokenId;
use crate::morphology::FeatureAxis;
use crate::phenomenon::{Family, Phenomenon};

/// What a perturbation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Axis(FeatureAxis),
    Prefix,
    Suffix,
    Declension,
    Conjugation,
    NegationPosition,
    PronounType,
    ReflexivePronoun,
    Transitivity,
    TenseMarker,
}

impl Feature {
    pub const fn label(self) -> &'static str {
        match self {
            Feature::Axis(axis) => axis.name(),
            Feature::Prefix => "prefix",
            Feature::Suffix => "suffix",
            Feature::Declension => "declension",
            Feature::Conjugation => "conjugation",
            Feature::NegationPosition => "ne_position",
            Feature::PronounType => "pronoun_type",
            Feature::ReflexivePronoun => "lemma",
            Feature::Transitivity => "transitivity",
            Feature::TenseMarker => "tense_marker",
        }
    }
}

/// A maximal run of consecutive tokens whose surface differs between source and target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct AlteredSpan {
    pub start: TokenId,
    /// Inclusive.
    pub end: TokenId,
    pub source: String,
    pub target: String,
}

/// The engine's output record. Immutable once assembled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct MinimalPair {
    pub sentence_id: String,
    pub source_sentence: String,
    pub target_sentence: String,
    pub source_word: String,
    pub target_word: String,
    pub phenomenon: Phenomenon,
    pub family: Family,
    pub subtype: String,
    pub feature: String,
    pub source_value: String,
    pub target_value: String,
    pub spans: Vec<AlteredSpan>,
    pub domain: Option<String>,
    /// Dependency-path distance between target and controller.
    pub tree_length: Option<u32>,
    pub tree_depth: u32,
    pub length: u32,
    /// Share of non-punctuation lemmas with ipm above 1.
    pub ipm: f64,
}
