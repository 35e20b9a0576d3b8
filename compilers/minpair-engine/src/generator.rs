use std::collections::{BTreeMap, HashSet};

use minpair_morph::{MorphAgreementResolver, MorphAnalyzer, Resolution, ResolvedToken};
use minpair_protocol::{MinimalPair, Phenomenon, TokenId};
use minpair_syntax::{check_agreement, AnnotatedSentence};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::candidate::Candidate;
use crate::config::GeneratorConfig;
use crate::error::CandidateError;
use crate::filter::ValidityFilter;
use crate::matcher::PatternMatcher;
use crate::registry::{self, PhenomenonEntry, Resolve};
use crate::resources::Resources;
use crate::rule::{Resolved, RuleContext};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhenomenonCounts {
    pub candidates: usize,
    pub emitted: usize,
}

/// Per-run tallies of every local outcome. Nothing counted here aborts a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub sentences: usize,
    /// Sentences the reader skipped as malformed trees.
    pub malformed: usize,
    /// Parser tags that already disagree inside a sentence.
    pub tag_mismatches: usize,
    pub candidates: usize,
    pub unresolved: usize,
    pub defects: usize,
    pub structural: usize,
    pub unsynthesizable: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub emitted: usize,
    pub per_phenomenon: BTreeMap<Phenomenon, PhenomenonCounts>,
}

impl GenerationReport {
    fn record(&mut self, error: &CandidateError) {
        let counter = match error {
            CandidateError::UnresolvedMorphology { .. } => &mut self.unresolved,
            CandidateError::AgreementDefect(_) => &mut self.defects,
            CandidateError::StructuralMismatch(_) => &mut self.structural,
            CandidateError::Unsynthesizable(_) => &mut self.unsynthesizable,
            CandidateError::ValidityRejected(_) => &mut self.rejected,
        };
        *counter += 1;
    }

    pub fn merge(&mut self, other: GenerationReport) {
        self.sentences += other.sentences;
        self.malformed += other.malformed;
        self.tag_mismatches += other.tag_mismatches;
        self.candidates += other.candidates;
        self.unresolved += other.unresolved;
        self.defects += other.defects;
        self.structural += other.structural;
        self.unsynthesizable += other.unsynthesizable;
        self.rejected += other.rejected;
        self.duplicates += other.duplicates;
        self.emitted += other.emitted;
        for (phenomenon, counts) in other.per_phenomenon {
            let entry = self.per_phenomenon.entry(phenomenon).or_default();
            entry.candidates += counts.candidates;
            entry.emitted += counts.emitted;
        }
    }
}

/// Runs the registered phenomena over sentences. Holds only shared read-only state.
pub struct Generator<'a> {
    analyzer: &'a dyn MorphAnalyzer,
    resources: &'a Resources,
    phenomena: Vec<Phenomenon>,
}

impl<'a> Generator<'a> {
    pub fn new(analyzer: &'a dyn MorphAnalyzer, resources: &'a Resources) -> Self {
        Self {
            analyzer,
            resources,
            phenomena: Phenomenon::ALL.to_vec(),
        }
    }

    pub fn from_config(analyzer: &'a dyn MorphAnalyzer, resources: &'a Resources, config: &GeneratorConfig) -> Self {
        Self {
            phenomena: config.selected(),
            ..Self::new(analyzer, resources)
        }
    }

    pub fn phenomena(&self) -> &[Phenomenon] {
        &self.phenomena
    }

    /// Pairs of every sentence, in sentence order then registry order then candidate order.
    pub fn generate(&self, sentences: &[AnnotatedSentence]) -> (Vec<MinimalPair>, GenerationReport) {
        let per_sentence: Vec<(Vec<MinimalPair>, GenerationReport)> = sentences
            .par_iter()
            .map(|sentence| self.generate_sentence(sentence))
            .collect();

        let mut pairs = Vec::new();
        let mut report = GenerationReport::default();
        for (sentence_pairs, sentence_report) in per_sentence {
            pairs.extend(sentence_pairs);
            report.merge(sentence_report);
        }
        info!(
            sentences = report.sentences,
            candidates = report.candidates,
            emitted = report.emitted,
            rejected = report.rejected,
            unsynthesizable = report.unsynthesizable,
            "generation pass finished"
        );
        (pairs, report)
    }

    pub fn generate_sentence(&self, sentence: &AnnotatedSentence) -> (Vec<MinimalPair>, GenerationReport) {
        let ctx = RuleContext {
            sentence,
            analyzer: self.analyzer,
            resources: self.resources,
        };
        let mut report = GenerationReport {
            sentences: 1,
            ..Default::default()
        };
        let mismatches = check_agreement(sentence);
        if !mismatches.is_empty() {
            debug!(sentence = sentence.id(), count = mismatches.len(), "parser tags disagree");
            report.tag_mismatches = mismatches.len();
        }

        let mut pairs = Vec::new();
        for &phenomenon in &self.phenomena {
            let Some(entry) = registry::entry(phenomenon) else {
                continue;
            };
            let mut seen = HashSet::new();
            let mut counts = PhenomenonCounts::default();
            for candidate in PatternMatcher.find(sentence, phenomenon) {
                counts.candidates += 1;
                for outcome in self.outcomes(ctx, entry, &candidate) {
                    match outcome {
                        Ok(pair) if seen.insert(pair.target_sentence.clone()) => {
                            counts.emitted += 1;
                            pairs.push(pair);
                        }
                        Ok(_) => report.duplicates += 1,
                        Err(error) => report.record(&error),
                    }
                }
            }
            report.candidates += counts.candidates;
            report.emitted += counts.emitted;
            if counts.candidates > 0 {
                report.per_phenomenon.insert(phenomenon, counts);
            }
        }
        (pairs, report)
    }

    /// Resolution, rule, checks and assembly for one candidate; one entry per alternative.
    fn outcomes(
        &self,
        ctx: RuleContext<'_>,
        entry: &PhenomenonEntry,
        candidate: &Candidate,
    ) -> Vec<Result<MinimalPair, CandidateError>> {
        let resolved = match self.resolve(ctx.sentence, entry, candidate) {
            Ok(resolved) => resolved,
            Err(error) => {
                if let CandidateError::AgreementDefect(defect) = &error {
                    warn!(
                        sentence = ctx.sentence.id(),
                        phenomenon = %candidate.phenomenon,
                        target = %candidate.target,
                        %defect,
                        "source sentence has an agreement defect"
                    );
                }
                return vec![Err(error)];
            }
        };

        let filter = ValidityFilter::new(ctx);
        (entry.rule)(&ctx, candidate, &resolved)
            .into_iter()
            .map(|outcome| {
                let perturbation = outcome?;
                filter
                    .evaluate(entry.checks, candidate, &perturbation)
                    .map_err(CandidateError::ValidityRejected)?;
                assemble(ctx.sentence, self.resources, candidate, &perturbation)
            })
            .collect()
    }

    fn resolve(
        &self,
        sentence: &AnnotatedSentence,
        entry: &PhenomenonEntry,
        candidate: &Candidate,
    ) -> Result<Resolved, CandidateError> {
        let resolver = MorphAgreementResolver::new(self.analyzer);
        let pin = |id: TokenId| -> Result<ResolvedToken, CandidateError> {
            let token = sentence
                .token(id)
                .ok_or_else(|| CandidateError::StructuralMismatch(format!("no token {id}")))?;
            match resolver.resolve(token, entry.required) {
                Resolution::Resolved(resolved) => Ok(resolved),
                Resolution::Unresolved(reason) => Err(CandidateError::UnresolvedMorphology { token: id, reason }),
            }
        };

        let target = match entry.resolve {
            Resolve::Nothing => return Ok(Resolved::default()),
            Resolve::Target | Resolve::TargetAndController => pin(candidate.target)?,
        };
        let controller = match (entry.resolve, candidate.controller) {
            (Resolve::TargetAndController, Some(id)) => Some(pin(id)?),
            _ => None,
        };
        if let Some(controller) = &controller {
            resolver.verify_agreement(&target, controller, entry.agreement)?;
        }
        Ok(Resolved {
            target: Some(target),
            controller,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::{MorphFlags as F, PartOfSpeech};

    use crate::testkit::{Fixture, Word};

    const TWO: &str = "\
# sent_id = one
# text = Руководство выдало премии.
1\tРуководство\tруководство\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Neut|Number=Sing\t2\tnsubj\t_\t_
2\tвыдало\tвыдать\tVERB\t_\tAspect=Perf|Gender=Neut|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
3\tпремии\tпремия\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Fem|Number=Plur\t2\tobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_

# sent_id = two
# text = Руководство выдали премии.
1\tРуководство\tруководство\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Neut|Number=Sing\t2\tnsubj\t_\t_
2\tвыдали\tвыдать\tVERB\t_\tAspect=Perf|Mood=Ind|Number=Plur|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
3\tпремии\tпремия\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Fem|Number=Plur\t2\tobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_

# sent_id = three
# text = Руководство выдал премии.
1\tРуководство\tруководство\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Neut|Number=Sing\t2\tnsubj\t_\t_
2\tвыдал\tвыдать\tVERB\t_\tAspect=Perf|Gender=Masc|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
3\tпремии\tпремия\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Fem|Number=Plur\t2\tobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";

    fn fixture() -> Fixture {
        let past = |gender: F, number: F| F::PERFECTIVE | F::PAST | gender | number;
        Fixture::new()
            .word(
                Word::new("руководство", PartOfSpeech::Noun, F::NEUTER | F::INANIMATE)
                    .cell(F::NOMINATIVE | F::SINGULAR, "руководство"),
            )
            .word(
                Word::new("выдать", PartOfSpeech::Verb, F::empty())
                    .cell(past(F::MASCULINE, F::SINGULAR), "выдал")
                    .cell(past(F::FEMININE, F::SINGULAR), "выдала")
                    .cell(past(F::NEUTER, F::SINGULAR), "выдало")
                    .cell(past(F::empty(), F::PLURAL), "выдали"),
            )
    }

    #[test]
    fn test_generation_is_deterministic() {
        let fixture = fixture();
        let (first, first_report) = fixture.generate(TWO, &[]);
        for _ in 0..4 {
            let (again, report) = fixture.generate(TWO, &[]);
            assert_eq!(again, first);
            assert_eq!(report, first_report);
        }
        let ids: Vec<&str> = first.iter().map(|p| p.sentence_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_by_key(|id| ["one", "two", "three"].iter().position(|s| s == id));
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_defective_sources_are_counted() {
        let (pairs, report) = fixture().generate(TWO, &[Phenomenon::NounSubjPredicateGender]);
        assert_eq!(report.sentences, 3);
        // Sentence two has a plural predicate, sentence three a masculine one.
        assert_eq!(report.defects, 1);
        assert!(report.tag_mismatches >= 1);
        assert!(pairs.iter().all(|p| p.sentence_id == "one"));
        assert_eq!(report.per_phenomenon[&Phenomenon::NounSubjPredicateGender].emitted, pairs.len());
        assert_eq!(
            report.candidates,
            report.per_phenomenon.values().map(|c| c.candidates).sum::<usize>()
        );
    }

    #[test]
    fn test_merge_adds_counters() {
        let mut total = GenerationReport::default();
        let mut part = GenerationReport {
            sentences: 2,
            emitted: 3,
            ..Default::default()
        };
        part.per_phenomenon.insert(Phenomenon::VerbTense, PhenomenonCounts { candidates: 4, emitted: 3 });
        total.merge(part.clone());
        total.merge(part);
        assert_eq!(total.sentences, 4);
        assert_eq!(total.emitted, 6);
        assert_eq!(total.per_phenomenon[&Phenomenon::VerbTense].candidates, 8);
    }
}
