use minpair_lexicon::LexiconError;
use minpair_morph::{AgreementDefect, MorphError, UnresolvedReason};
use minpair_protocol::{MorphFlags, TokenId};
use thiserror::Error;

use crate::filter::Check;

/// Why a rule produced no form for one alternative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unsynthesizable {
    #[error("no form of {lemma} carrying {features:?}")]
    NoForm { lemma: String, features: MorphFlags },
    #[error("{0} contains a letter sequence impossible in Russian")]
    Orthography(String),
    #[error("{0} differs from the source only in ё")]
    OptionalDiacritic(String),
    #[error("{0} coincides with another cell of the paradigm")]
    ParadigmCollision(String),
    #[error("the altered form equals the source")]
    Unchanged,
    #[error("target bundle needs a {0} value nobody supplies")]
    MissingFeature(&'static str),
}

/// Per-candidate outcomes. Counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("token {token} could not be analyzed: {reason:?}")]
    UnresolvedMorphology {
        token: TokenId,
        reason: UnresolvedReason,
    },
    #[error(transparent)]
    AgreementDefect(#[from] AgreementDefect),
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
    #[error(transparent)]
    Unsynthesizable(#[from] Unsynthesizable),
    #[error("rejected by {0:?}")]
    ValidityRejected(Check),
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource archive failed validation: {0}")]
    Archive(String),
    #[error(transparent)]
    Morph(#[from] MorphError),
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}
