use std::cmp::Reverse;

use minpair_protocol::{FeatureAxis, MorphFlags, PartOfSpeech, Token, TokenId, CATEGORY_MASKS};
use thiserror::Error;
use tracing::debug;

use crate::analyzer::{Analysis, MorphAnalyzer};
use crate::orthography::normalize;

/// A token pinned to one analyzer reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: TokenId,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub features: MorphFlags,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The analyzer has no reading of the form at all.
    UnknownForm,
    /// Readings exist, but none for the parser's lemma and part of speech.
    LemmaMismatch,
    /// Every reading contradicts the parser on a required category.
    Disagrees,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedToken),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn ok(self) -> Option<ResolvedToken> {
        match self {
            Resolution::Resolved(resolved) => Some(resolved),
            Resolution::Unresolved(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("agreement defect on {axis:?}: target has {target:?}, controller has {controller:?}")]
pub struct AgreementDefect {
    pub axis: FeatureAxis,
    pub target: MorphFlags,
    pub controller: MorphFlags,
}

/// Reconciles parser tags with analyzer readings.
pub struct MorphAgreementResolver<'a> {
    analyzer: &'a dyn MorphAnalyzer,
}

impl<'a> MorphAgreementResolver<'a> {
    pub fn new(analyzer: &'a dyn MorphAnalyzer) -> Self {
        Self { analyzer }
    }

    /// `required` is a union of category masks the reading must agree on wherever the
    /// parser carries a value.
    pub fn resolve(&self, token: &Token, required: MorphFlags) -> Resolution {
        let analyses = self.analyzer.analyze(&token.form);
        if analyses.is_empty() {
            debug!(form = %token.form, "no analyses");
            return Resolution::Unresolved(UnresolvedReason::UnknownForm);
        }

        let lemma = normalize(&token.lemma);
        let matching: Vec<&Analysis> = analyses
            .iter()
            .filter(|a| normalize(&a.lemma) == lemma && a.pos.compatible(token.upos))
            .collect();
        if matching.is_empty() {
            debug!(form = %token.form, lemma = %token.lemma, "no analysis for parser lemma");
            return Resolution::Unresolved(UnresolvedReason::LemmaMismatch);
        }

        let best = matching
            .into_iter()
            .filter(|a| agrees_on(a.features, token.features, required))
            .enumerate()
            .min_by_key(|(index, a)| {
                (
                    Reverse(a.features.overlap(token.features)),
                    a.rank.is_none(),
                    a.rank,
                    a.features.bits(),
                    *index,
                )
            });

        match best {
            Some((_, analysis)) => Resolution::Resolved(ResolvedToken {
                token: token.id,
                lemma: analysis.lemma.clone(),
                pos: analysis.pos,
                features: analysis.features,
                rank: analysis.rank,
            }),
            None => {
                debug!(form = %token.form, "every analysis contradicts parser tags");
                Resolution::Unresolved(UnresolvedReason::Disagrees)
            }
        }
    }

    /// Compares two resolved bundles on each axis where both carry a value.
    pub fn verify_agreement(
        &self,
        target: &ResolvedToken,
        controller: &ResolvedToken,
        axes: &[FeatureAxis],
    ) -> Result<(), AgreementDefect> {
        for &axis in axes {
            let t = target.features & axis.mask();
            let c = controller.features & axis.mask();
            if !t.is_empty() && !c.is_empty() && t != c {
                return Err(AgreementDefect {
                    axis,
                    target: t,
                    controller: c,
                });
            }
        }
        Ok(())
    }
}

fn agrees_on(analysis: MorphFlags, parser: MorphFlags, required: MorphFlags) -> bool {
    CATEGORY_MASKS
        .iter()
        .filter(|mask| mask.intersects(required))
        .all(|mask| {
            let tagged = parser & *mask;
            tagged.is_empty() || tagged == analysis & *mask
        })
}
