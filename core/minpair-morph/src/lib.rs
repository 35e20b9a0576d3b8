pub mod analyzer;
pub mod lexicon;
pub mod orthography;
pub mod resolver;
pub mod segmentation;

pub use analyzer::{Analysis, MorphAnalyzer};
pub use lexicon::Lexicon;
pub use resolver::{AgreementDefect, MorphAgreementResolver, Resolution, ResolvedToken, UnresolvedReason};
pub use segmentation::{parse_segmentation, Segmentation};

use minpair_protocol::{Lemma, MorphFlags, Paradigm, ParadigmId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorphError {
    #[error("lemma {lemma} references missing paradigm {paradigm}")]
    UnknownParadigm { lemma: String, paradigm: ParadigmId },
    #[error("bad segmentation {input:?}: {reason}")]
    Segmentation { input: String, reason: String },
}

/// Every cell of a lemma: stem + paradigm ending, lexical grammemes added, and the
/// lemma's own full forms replacing or extending the generated ones.
pub fn paradigm_cells(lemma: &Lemma, paradigm: &Paradigm) -> Vec<(MorphFlags, String)> {
    let lexical = MorphFlags::from_bits_truncate(lemma.lexical);
    let mut cells: Vec<(MorphFlags, String)> = paradigm
        .endings
        .iter()
        .map(|(bits, ending)| {
            (
                MorphFlags::from_bits_truncate(*bits) | lexical,
                format!("{}{}", lemma.stem, ending),
            )
        })
        .collect();

    for (bits, form) in &lemma.forms {
        let flags = MorphFlags::from_bits_truncate(*bits) | lexical;
        match cells.iter_mut().find(|(cell, _)| *cell == flags) {
            Some(cell) => cell.1 = form.clone(),
            None => cells.push((flags, form.clone())),
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::{LemmaId, PartOfSpeech};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_safe_generation(stem in "[а-я]+", suffix in "[а-я]{0,3}") {
            let lemma = Lemma {
                id: LemmaId(1),
                text: stem.clone(),
                pos: PartOfSpeech::Noun,
                stem: stem.clone(),
                paradigm: ParadigmId(1),
                lexical: MorphFlags::NEUTER.bits(),
                rank: None,
                forms: vec![],
            };

            let flags = MorphFlags::NOMINATIVE | MorphFlags::SINGULAR;

            let paradigm = Paradigm {
                id: ParadigmId(1),
                endings: vec![(flags.bits(), suffix.clone())]
            };

            let cells = paradigm_cells(&lemma, &paradigm);
            prop_assert_eq!(cells, vec![(flags | MorphFlags::NEUTER, format!("{}{}", stem, suffix))]);
        }
    }

    #[test]
    fn test_override_replaces_generated_cell() {
        let lemma = Lemma {
            id: LemmaId(2),
            text: "человек".to_string(),
            pos: PartOfSpeech::Noun,
            stem: "человек".to_string(),
            paradigm: ParadigmId(1),
            lexical: 0,
            rank: None,
            forms: vec![(MorphFlags::PLURAL.bits(), "люди".to_string())],
        };
        let paradigm = Paradigm {
            id: ParadigmId(1),
            endings: vec![
                (MorphFlags::SINGULAR.bits(), String::new()),
                (MorphFlags::PLURAL.bits(), "и".to_string()),
            ],
        };
        let cells = paradigm_cells(&lemma, &paradigm);
        assert_eq!(
            cells,
            vec![
                (MorphFlags::SINGULAR, "человек".to_string()),
                (MorphFlags::PLURAL, "люди".to_string()),
            ]
        );
    }
}
