use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use alloc::vec::Vec;
use bitflags::bitflags;

bitflags! {
    /// One bit per grammeme. A well-formed bundle holds at most one bit per category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct MorphFlags: u64 {
        // Case (Bits 0-7)
        const NOMINATIVE = 1 << 0;
        const GENITIVE = 1 << 1;
        const DATIVE = 1 << 2;
        const ACCUSATIVE = 1 << 3;
        const INSTRUMENTAL = 1 << 4;
        const LOCATIVE = 1 << 5;
        const PARTITIVE = 1 << 6;
        const VOCATIVE = 1 << 7;

        // Gender (Bits 8-10)
        const MASCULINE = 1 << 8;
        const FEMININE = 1 << 9;
        const NEUTER = 1 << 10;

        // Number (Bits 11-12)
        const SINGULAR = 1 << 11;
        const PLURAL = 1 << 12;

        // Person (Bits 13-15)
        const FIRST_PERSON = 1 << 13;
        const SECOND_PERSON = 1 << 14;
        const THIRD_PERSON = 1 << 15;

        // Tense (Bits 16-18)
        const PAST = 1 << 16;
        const PRESENT = 1 << 17;
        const FUTURE = 1 << 18;

        // Aspect (Bits 19-20)
        const PERFECTIVE = 1 << 19;
        const IMPERFECTIVE = 1 << 20;

        // Mood (Bits 21-23)
        const INDICATIVE = 1 << 21;
        const IMPERATIVE = 1 << 22;
        const CONDITIONAL = 1 << 23;

        // VerbForm (Bits 24-27)
        const FINITE = 1 << 24;
        const INFINITIVE = 1 << 25;
        const PARTICIPLE = 1 << 26;
        const CONVERB = 1 << 27;

        // Voice (Bits 28-29)
        const ACTIVE = 1 << 28;
        const PASSIVE = 1 << 29;

        // Animacy (Bits 30-31)
        const ANIMATE = 1 << 30;
        const INANIMATE = 1 << 31;

        // Degree (Bits 32-34)
        const POSITIVE = 1 << 32;
        const COMPARATIVE = 1 << 33;
        const SUPERLATIVE = 1 << 34;

        // Single-valued marks
        const SHORT = 1 << 35;
        const REFLEXIVE = 1 << 36;
        const NEGATIVE = 1 << 37;
    }
}

macro_rules! grammeme {
    ($(#[$meta:meta])* $name:ident, $category:literal { $($variant:ident = $flag:ident, $ud:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(u8)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];
            pub const MASK: MorphFlags = MorphFlags::empty()$(.union(MorphFlags::$flag))+;
            /// UD feature name of this category.
            pub const CATEGORY: &'static str = $category;

            pub const fn flag(self) -> MorphFlags {
                match self {
                    $($name::$variant => MorphFlags::$flag,)+
                }
            }

            /// First value of this category present in `flags`.
            pub fn from_flags(flags: MorphFlags) -> Option<Self> {
                $(if flags.contains(MorphFlags::$flag) {
                    return Some($name::$variant);
                })+
                None
            }

            pub const fn ud(self) -> &'static str {
                match self {
                    $($name::$variant => $ud,)+
                }
            }

            pub fn from_ud(value: &str) -> Option<Self> {
                match value {
                    $($ud => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

grammeme!(Case, "Case" {
    Nominative = NOMINATIVE, "Nom";
    Genitive = GENITIVE, "Gen";
    Dative = DATIVE, "Dat";
    Accusative = ACCUSATIVE, "Acc";
    Instrumental = INSTRUMENTAL, "Ins";
    Locative = LOCATIVE, "Loc";
    Partitive = PARTITIVE, "Par";
    Vocative = VOCATIVE, "Voc";
});

grammeme!(Gender, "Gender" {
    Masculine = MASCULINE, "Masc";
    Feminine = FEMININE, "Fem";
    Neuter = NEUTER, "Neut";
});

grammeme!(Number, "Number" {
    Singular = SINGULAR, "Sing";
    Plural = PLURAL, "Plur";
});

grammeme!(Person, "Person" {
    First = FIRST_PERSON, "1";
    Second = SECOND_PERSON, "2";
    Third = THIRD_PERSON, "3";
});

grammeme!(Tense, "Tense" {
    Past = PAST, "Past";
    Present = PRESENT, "Pres";
    Future = FUTURE, "Fut";
});

grammeme!(Aspect, "Aspect" {
    Perfective = PERFECTIVE, "Perf";
    Imperfective = IMPERFECTIVE, "Imp";
});

grammeme!(Mood, "Mood" {
    Indicative = INDICATIVE, "Ind";
    Imperative = IMPERATIVE, "Imp";
    Conditional = CONDITIONAL, "Cnd";
});

grammeme!(VerbForm, "VerbForm" {
    Finite = FINITE, "Fin";
    Infinitive = INFINITIVE, "Inf";
    Participle = PARTICIPLE, "Part";
    Converb = CONVERB, "Conv";
});

grammeme!(Voice, "Voice" {
    Active = ACTIVE, "Act";
    Passive = PASSIVE, "Pass";
});

grammeme!(Animacy, "Animacy" {
    Animate = ANIMATE, "Anim";
    Inanimate = INANIMATE, "Inan";
});

grammeme!(Degree, "Degree" {
    Positive = POSITIVE, "Pos";
    Comparative = COMPARATIVE, "Cmp";
    Superlative = SUPERLATIVE, "Sup";
});

impl Case {
    /// The six cases every phenomenon may alternate between.
    pub const CORE: MorphFlags = MorphFlags::NOMINATIVE
        .union(MorphFlags::GENITIVE)
        .union(MorphFlags::DATIVE)
        .union(MorphFlags::ACCUSATIVE)
        .union(MorphFlags::INSTRUMENTAL)
        .union(MorphFlags::LOCATIVE);
}

/// Category masks in a fixed order; used to count per-category agreement.
pub const CATEGORY_MASKS: [MorphFlags; 11] = [
    Case::MASK,
    Gender::MASK,
    Number::MASK,
    Person::MASK,
    Tense::MASK,
    Aspect::MASK,
    Mood::MASK,
    VerbForm::MASK,
    Voice::MASK,
    Animacy::MASK,
    Degree::MASK,
];

impl MorphFlags {
    /// Maps one UD `Feature=Value` pair. Unknown pairs map to `None` and are ignored by readers.
    pub fn from_ud(feature: &str, value: &str) -> Option<MorphFlags> {
        let flag = match feature {
            "Case" => Case::from_ud(value)?.flag(),
            "Gender" => Gender::from_ud(value)?.flag(),
            "Number" => Number::from_ud(value)?.flag(),
            "Person" => Person::from_ud(value)?.flag(),
            "Tense" => Tense::from_ud(value)?.flag(),
            "Aspect" => Aspect::from_ud(value)?.flag(),
            "Mood" => Mood::from_ud(value)?.flag(),
            "VerbForm" => VerbForm::from_ud(value)?.flag(),
            "Voice" => Voice::from_ud(value)?.flag(),
            "Animacy" => Animacy::from_ud(value)?.flag(),
            "Degree" => Degree::from_ud(value)?.flag(),
            "Variant" if value == "Short" => MorphFlags::SHORT,
            "Reflex" if value == "Yes" => MorphFlags::REFLEXIVE,
            "Polarity" if value == "Neg" => MorphFlags::NEGATIVE,
            _ => return None,
        };
        Some(flag)
    }

    /// UD label of a single grammeme bit.
    pub fn ud_value(self) -> Option<&'static str> {
        Case::from_flags(self)
            .map(Case::ud)
            .or_else(|| Gender::from_flags(self).map(Gender::ud))
            .or_else(|| Number::from_flags(self).map(Number::ud))
            .or_else(|| Person::from_flags(self).map(Person::ud))
            .or_else(|| Tense::from_flags(self).map(Tense::ud))
            .or_else(|| Aspect::from_flags(self).map(Aspect::ud))
            .or_else(|| Mood::from_flags(self).map(Mood::ud))
            .or_else(|| VerbForm::from_flags(self).map(VerbForm::ud))
            .or_else(|| Voice::from_flags(self).map(Voice::ud))
            .or_else(|| Animacy::from_flags(self).map(Animacy::ud))
            .or_else(|| Degree::from_flags(self).map(Degree::ud))
    }

    /// Replaces whatever the bundle holds on `axis` with `value`.
    pub fn with_axis(self, axis: FeatureAxis, value: MorphFlags) -> MorphFlags {
        self.difference(axis.mask()).union(value & axis.mask())
    }

    /// Number of categories on which both bundles carry the same value.
    pub fn overlap(self, other: MorphFlags) -> usize {
        CATEGORY_MASKS
            .iter()
            .filter(|mask| {
                let a = self & **mask;
                !a.is_empty() && a == (other & **mask)
            })
            .count()
    }

    pub fn is_verbal(self) -> bool {
        self.intersects(VerbForm::MASK) || self.intersects(Tense::MASK)
    }
}

/// A grammatical category along which a perturbation alternates values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum FeatureAxis {
    Number,
    Gender,
    Person,
    Case,
    Tense,
    Aspect,
    Animacy,
}

impl FeatureAxis {
    pub const fn mask(self) -> MorphFlags {
        match self {
            FeatureAxis::Number => Number::MASK,
            FeatureAxis::Gender => Gender::MASK,
            FeatureAxis::Person => Person::MASK,
            FeatureAxis::Case => Case::CORE,
            FeatureAxis::Tense => Tense::MASK,
            FeatureAxis::Aspect => Aspect::MASK,
            FeatureAxis::Animacy => Animacy::MASK,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FeatureAxis::Number => "number",
            FeatureAxis::Gender => "gender",
            FeatureAxis::Person => "person",
            FeatureAxis::Case => "case",
            FeatureAxis::Tense => "tense",
            FeatureAxis::Aspect => "aspect",
            FeatureAxis::Animacy => "animacy",
        }
    }

    /// The closed value set, one flag per value, in bit order.
    pub fn values(self) -> Vec<MorphFlags> {
        self.mask().iter().collect()
    }

    /// The value `flags` holds on this axis, if exactly one.
    pub fn value_of(self, flags: MorphFlags) -> Option<MorphFlags> {
        let value = flags & self.mask();
        (value.bits().count_ones() == 1).then_some(value)
    }

    /// Every value except `source`, restricted to `licit`.
    pub fn alternatives(self, source: MorphFlags, licit: MorphFlags) -> Vec<MorphFlags> {
        self.values()
            .into_iter()
            .filter(|value| *value != source && licit.contains(*value))
            .collect()
    }
}

/// Universal POS tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum PartOfSpeech {
    Noun = 0,
    ProperNoun = 1,
    Adjective = 2,
    Verb = 3,
    Auxiliary = 4,
    Adverb = 5,
    Adposition = 6,
    Determiner = 7,
    Pronoun = 8,
    Numeral = 9,
    CoordinatingConjunction = 10,
    SubordinatingConjunction = 11,
    Particle = 12,
    Interjection = 13,
    Punctuation = 14,
    Symbol = 15,
    Other = 16,
}

impl PartOfSpeech {
    pub fn from_ud(tag: &str) -> Option<Self> {
        let pos = match tag {
            "NOUN" => PartOfSpeech::Noun,
            "PROPN" => PartOfSpeech::ProperNoun,
            "ADJ" => PartOfSpeech::Adjective,
            "VERB" => PartOfSpeech::Verb,
            "AUX" => PartOfSpeech::Auxiliary,
            "ADV" => PartOfSpeech::Adverb,
            "ADP" => PartOfSpeech::Adposition,
            "DET" => PartOfSpeech::Determiner,
            "PRON" => PartOfSpeech::Pronoun,
            "NUM" => PartOfSpeech::Numeral,
            "CCONJ" => PartOfSpeech::CoordinatingConjunction,
            "SCONJ" => PartOfSpeech::SubordinatingConjunction,
            "PART" => PartOfSpeech::Particle,
            "INTJ" => PartOfSpeech::Interjection,
            "PUNCT" => PartOfSpeech::Punctuation,
            "SYM" => PartOfSpeech::Symbol,
            "X" => PartOfSpeech::Other,
            _ => return None,
        };
        Some(pos)
    }

    pub const fn ud(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::ProperNoun => "PROPN",
            PartOfSpeech::Adjective => "ADJ",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Auxiliary => "AUX",
            PartOfSpeech::Adverb => "ADV",
            PartOfSpeech::Adposition => "ADP",
            PartOfSpeech::Determiner => "DET",
            PartOfSpeech::Pronoun => "PRON",
            PartOfSpeech::Numeral => "NUM",
            PartOfSpeech::CoordinatingConjunction => "CCONJ",
            PartOfSpeech::SubordinatingConjunction => "SCONJ",
            PartOfSpeech::Particle => "PART",
            PartOfSpeech::Interjection => "INTJ",
            PartOfSpeech::Punctuation => "PUNCT",
            PartOfSpeech::Symbol => "SYM",
            PartOfSpeech::Other => "X",
        }
    }

    pub const fn is_nominal(self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Pronoun
        )
    }

    /// Coarse class used when matching parser tags against analyzer tags.
    /// Parsers and dictionaries disagree on AUX/VERB and ADJ/DET routinely.
    pub const fn class(self) -> u8 {
        match self {
            PartOfSpeech::Noun | PartOfSpeech::ProperNoun => 0,
            PartOfSpeech::Adjective | PartOfSpeech::Determiner => 1,
            PartOfSpeech::Verb | PartOfSpeech::Auxiliary => 2,
            other => 3 + other as u8,
        }
    }

    pub const fn compatible(self, other: PartOfSpeech) -> bool {
        self.class() == other.class()
    }
}
