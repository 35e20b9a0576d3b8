use std::collections::HashMap;

use minpair_protocol::{Dictionary, MorphFlags, ParadigmId, PartOfSpeech};
use tracing::debug;

use crate::analyzer::{Analysis, MorphAnalyzer};
use crate::orthography::normalize;
use crate::{paradigm_cells, MorphError};

#[derive(Debug, Clone)]
struct Entry {
    lemma: String,
    key: String,
    pos: PartOfSpeech,
    lexical: MorphFlags,
    rank: Option<u32>,
    cells: Vec<(MorphFlags, String)>,
}

/// Dictionary-backed paradigm lexicon: stem + paradigm endings, with per-lemma overrides.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<Entry>,
    by_form: HashMap<String, Vec<(usize, usize)>>,
    by_lemma: HashMap<String, Vec<usize>>,
}

impl Lexicon {
    pub fn from_dictionary(dictionary: &Dictionary) -> Result<Self, MorphError> {
        let paradigms: HashMap<ParadigmId, _> =
            dictionary.paradigms.iter().map(|p| (p.id, p)).collect();

        let mut lexicon = Lexicon::default();
        for lemma in &dictionary.lemmas {
            let paradigm = paradigms
                .get(&lemma.paradigm)
                .ok_or_else(|| MorphError::UnknownParadigm {
                    lemma: lemma.text.clone(),
                    paradigm: lemma.paradigm,
                })?;
            let entry = Entry {
                lemma: lemma.text.clone(),
                key: normalize(&lemma.text),
                pos: lemma.pos,
                lexical: MorphFlags::from_bits_truncate(lemma.lexical),
                rank: lemma.rank,
                cells: paradigm_cells(lemma, paradigm),
            };
            lexicon.insert(entry);
        }
        debug!(
            lemmas = lexicon.entries.len(),
            forms = lexicon.by_form.len(),
            "lexicon built"
        );
        Ok(lexicon)
    }

    fn insert(&mut self, entry: Entry) {
        let index = self.entries.len();
        for (cell, (_, form)) in entry.cells.iter().enumerate() {
            self.by_form
                .entry(normalize(form))
                .or_default()
                .push((index, cell));
        }
        self.by_lemma.entry(entry.key.clone()).or_default().push(index);
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entries_for<'a>(
        &'a self,
        lemma: &str,
        pos: PartOfSpeech,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.by_lemma
            .get(&normalize(lemma))
            .into_iter()
            .flatten()
            .map(|&index| &self.entries[index])
            .filter(move |entry| entry.pos.compatible(pos))
    }
}

impl MorphAnalyzer for Lexicon {
    fn analyze(&self, form: &str) -> Vec<Analysis> {
        let mut analyses: Vec<Analysis> = Vec::new();
        for &(index, cell) in self.by_form.get(&normalize(form)).into_iter().flatten() {
            let entry = &self.entries[index];
            let analysis = Analysis {
                lemma: entry.lemma.clone(),
                pos: entry.pos,
                features: entry.cells[cell].0,
                rank: entry.rank,
            };
            if !analyses.contains(&analysis) {
                analyses.push(analysis);
            }
        }
        analyses
    }

    fn synthesize(&self, lemma: &str, pos: PartOfSpeech, features: MorphFlags) -> Option<String> {
        let mut best: Option<(u32, &str)> = None;
        for entry in self.entries_for(lemma, pos) {
            for (cell, form) in &entry.cells {
                if !cell.contains(features) {
                    continue;
                }
                let extra = cell.difference(features).bits().count_ones();
                if best.map_or(true, |(fewest, _)| extra < fewest) {
                    best = Some((extra, form.as_str()));
                }
            }
        }
        best.map(|(_, form)| form.to_string())
    }

    fn paradigm(&self, lemma: &str, pos: PartOfSpeech) -> Vec<(MorphFlags, String)> {
        self.entries_for(lemma, pos)
            .flat_map(|entry| entry.cells.iter().cloned())
            .collect()
    }

    fn is_known(&self, form: &str) -> bool {
        self.by_form.contains_key(&normalize(form))
    }

    fn lexical(&self, lemma: &str, pos: PartOfSpeech) -> Option<MorphFlags> {
        self.entries_for(lemma, pos).next().map(|entry| entry.lexical)
    }

    fn rank(&self, lemma: &str, pos: PartOfSpeech) -> Option<u32> {
        self.entries_for(lemma, pos).find_map(|entry| entry.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::{Lemma, LemmaId, Paradigm};

    fn cell(flags: MorphFlags, ending: &str) -> (u64, String) {
        (flags.bits(), ending.to_string())
    }

    fn dictionary() -> Dictionary {
        let sg = MorphFlags::SINGULAR;
        let pl = MorphFlags::PLURAL;
        Dictionary {
            version: 1,
            paradigms: vec![Paradigm {
                id: ParadigmId(1),
                endings: vec![
                    cell(MorphFlags::NOMINATIVE | sg, ""),
                    cell(MorphFlags::GENITIVE | sg, "а"),
                    cell(MorphFlags::ACCUSATIVE | sg, ""),
                    cell(MorphFlags::NOMINATIVE | pl, "ы"),
                ],
            }],
            lemmas: vec![
                Lemma {
                    id: LemmaId(1),
                    text: "стол".to_string(),
                    pos: PartOfSpeech::Noun,
                    stem: "стол".to_string(),
                    paradigm: ParadigmId(1),
                    lexical: (MorphFlags::MASCULINE | MorphFlags::INANIMATE).bits(),
                    rank: Some(10),
                    forms: vec![],
                },
                Lemma {
                    id: LemmaId(2),
                    text: "ёж".to_string(),
                    pos: PartOfSpeech::Noun,
                    stem: "ёж".to_string(),
                    paradigm: ParadigmId(1),
                    lexical: (MorphFlags::MASCULINE | MorphFlags::ANIMATE).bits(),
                    rank: None,
                    forms: vec![((MorphFlags::NOMINATIVE | pl).bits(), "ежи".to_string())],
                },
            ],
        }
    }

    #[test]
    fn test_analyze_ambiguous_form() {
        let lexicon = Lexicon::from_dictionary(&dictionary()).unwrap();
        let analyses = lexicon.analyze("Стол");
        assert_eq!(analyses.len(), 2);
        assert!(analyses.iter().all(|a| a.lemma == "стол" && a.rank == Some(10)));
        assert!(analyses[0].features.contains(MorphFlags::NOMINATIVE | MorphFlags::MASCULINE));
        assert!(analyses[1].features.contains(MorphFlags::ACCUSATIVE));
    }

    #[test]
    fn test_synthesize_prefers_tightest_cell() {
        let lexicon = Lexicon::from_dictionary(&dictionary()).unwrap();
        let form = lexicon.synthesize("стол", PartOfSpeech::Noun, MorphFlags::GENITIVE);
        assert_eq!(form.as_deref(), Some("стола"));
        assert_eq!(
            lexicon.synthesize("ёж", PartOfSpeech::Noun, MorphFlags::NOMINATIVE | MorphFlags::PLURAL),
            Some("ежи".to_string())
        );
        assert_eq!(
            lexicon.synthesize("стол", PartOfSpeech::Noun, MorphFlags::DATIVE),
            None
        );
        assert!(lexicon.is_known("ежа"));
        assert_eq!(
            lexicon.lexical("еж", PartOfSpeech::Noun),
            Some(MorphFlags::MASCULINE | MorphFlags::ANIMATE)
        );
    }

    #[test]
    fn test_unknown_paradigm_is_an_error() {
        let mut dictionary = dictionary();
        dictionary.lemmas[0].paradigm = ParadigmId(9);
        assert!(matches!(
            Lexicon::from_dictionary(&dictionary),
            Err(MorphError::UnknownParadigm { .. })
        ));
    }
}
