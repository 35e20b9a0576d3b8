use minpair_protocol::{Case, DepRel, FeatureAxis, MorphFlags, PartOfSpeech, Phenomenon, Token};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::closed_class::{adp_frame, MODAL_VERBS, WH_PRONOUNS};
use crate::error::Unsynthesizable;
use crate::rule::{inflect, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

const NOM: MorphFlags = MorphFlags::NOMINATIVE;
const GEN: MorphFlags = MorphFlags::GENITIVE;
const DAT: MorphFlags = MorphFlags::DATIVE;
const ACC: MorphFlags = MorphFlags::ACCUSATIVE;
const INS: MorphFlags = MorphFlags::INSTRUMENTAL;
const PAR: MorphFlags = MorphFlags::PARTITIVE;

fn governed_case(phenomenon: Phenomenon) -> Option<MorphFlags> {
    match phenomenon {
        Phenomenon::VerbAccObject => Some(ACC),
        Phenomenon::VerbGenObject => Some(GEN),
        Phenomenon::VerbInsObject => Some(INS),
        _ => None,
    }
}

/// Cases whose forms would still read as grammatical, or as the same word.
fn stop_cases(ctx: &RuleContext<'_>, candidate: &Candidate, source: MorphFlags) -> MorphFlags {
    match candidate.phenomenon {
        Phenomenon::VerbAccObject => ACC | NOM,
        Phenomenon::VerbGenObject => GEN | PAR | ACC | DAT | NOM,
        Phenomenon::VerbInsObject => ACC | INS | NOM | GEN | PAR,
        Phenomenon::NominalizationCase if source == INS => NOM | INS | GEN,
        Phenomenon::NominalizationCase => NOM | GEN | INS | DAT,
        Phenomenon::AdpGovernmentCase => {
            let frame = candidate
                .anchor
                .and_then(|id| ctx.token(id))
                .and_then(|adp| adp_frame(&adp.lemma))
                .unwrap_or(Case::CORE);
            frame | NOM
        }
        _ => Case::CORE,
    }
}

fn bare_nominal(sentence: &AnnotatedSentence, token: &Token) -> bool {
    token.upos.is_nominal() && !token.lemma_in(WH_PRONOUNS) && !sentence.has_modifier(token.id)
}

/// Direct object in the case the verb governs.
pub fn verb_object(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let Some(case) = governed_case(phenomenon) else {
        return Vec::new();
    };
    if token.deprel != DepRel::Obj || !token.has(case) || !bare_nominal(sentence, token) {
        return Vec::new();
    }
    let Some(verb) = sentence.head(token.id) else {
        return Vec::new();
    };
    if verb.upos != PartOfSpeech::Verb || verb.is_reflexive_form() || verb.lemma_in(MODAL_VERBS) {
        return Vec::new();
    }
    if case != INS && verb.has(MorphFlags::INFINITIVE) {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id).anchored_at(verb.id)]
}

/// Genitive or instrumental dependent of a deverbal noun in -ние.
pub fn nominalization(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    if token.deprel != DepRel::Nmod || !token.features.intersects(GEN | INS) || !bare_nominal(sentence, token) {
        return Vec::new();
    }
    if sentence.has_dependent(token.id, |t| t.deprel == DepRel::Case) {
        return Vec::new();
    }
    let Some(head) = sentence.head(token.id) else {
        return Vec::new();
    };
    let nominalized = head.upos == PartOfSpeech::Noun
        && minpair_morph::orthography::normalize(&head.lemma).ends_with("ние");
    if !nominalized {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id).anchored_at(head.id)]
}

/// Object of a preposition with a known case frame.
pub fn adposition(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    if !bare_nominal(sentence, token) {
        return Vec::new();
    }
    let Some(adp) = sentence
        .dependents(token.id)
        .find(|t| t.deprel == DepRel::Case && t.upos == PartOfSpeech::Adposition)
    else {
        return Vec::new();
    };
    let Some(frame) = adp_frame(&adp.lemma) else {
        return Vec::new();
    };
    if !token.features.intersects(frame) {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id).anchored_at(adp.id)]
}

/// Moves the dependent into each core case outside the stop set.
pub fn change_case(ctx: &RuleContext<'_>, candidate: &Candidate, resolved: &Resolved) -> Vec<RuleOutcome> {
    let Some(target) = resolved.target.as_ref() else {
        return Vec::new();
    };
    let axis = FeatureAxis::Case;
    let Some(source) = axis.value_of(target.features) else {
        return vec![Err(Unsynthesizable::MissingFeature("case"))];
    };
    let stop = stop_cases(ctx, candidate, source);

    axis.alternatives(source, Case::CORE.difference(stop))
        .into_iter()
        .map(|value| {
            let bundle = target.features.with_axis(axis, value);
            let form = inflect(ctx, target, &target.lemma, bundle, HomonymyGuard::StopCases(stop))?;
            Ok(Perturbation::along(form, axis, source, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use minpair_protocol::{MorphFlags as F, PartOfSpeech, Phenomenon};

    use crate::testkit::{Fixture, Word};

    const LETTER: &str = "\
# sent_id = gov
# text = Он написал письмо.
1\tОн\tон\tPRON\t_\tCase=Nom|Gender=Masc|Number=Sing|Person=3\t2\tnsubj\t_\t_
2\tнаписал\tнаписать\tVERB\t_\tAspect=Perf|Gender=Masc|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
3\tписьмо\tписьмо\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Neut|Number=Sing\t2\tobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";

    fn letter() -> Word {
        let sg = F::SINGULAR;
        let pl = F::PLURAL;
        Word::new("письмо", PartOfSpeech::Noun, F::NEUTER | F::INANIMATE)
            .cell(F::NOMINATIVE | sg, "письмо")
            .cell(F::GENITIVE | sg, "письма")
            .cell(F::DATIVE | sg, "письму")
            .cell(F::ACCUSATIVE | sg, "письмо")
            .cell(F::INSTRUMENTAL | sg, "письмом")
            .cell(F::LOCATIVE | sg, "письме")
            .cell(F::NOMINATIVE | pl, "письма")
            .cell(F::ACCUSATIVE | pl, "письма")
    }

    #[test]
    fn test_accusative_object_alternatives() {
        let fixture = Fixture::new().word(letter());
        let (pairs, report) = fixture.generate(LETTER, &[Phenomenon::VerbAccObject]);
        let targets: Vec<&str> = pairs.iter().map(|p| p.target_word.as_str()).collect();
        // "письма" is also the plural accusative and is filtered out.
        assert_eq!(targets, vec!["письму", "письмом", "письме"]);
        assert_eq!(report.rejected, 1);
        assert!(pairs.iter().all(|p| p.feature == "case" && p.source_value == "Acc"));
        assert_eq!(pairs[0].tree_length, Some(1));
    }

    #[test]
    fn test_modified_object_is_skipped() {
        let doc = "\
# sent_id = mod
# text = Он написал длинное письмо.
1\tОн\tон\tPRON\t_\tCase=Nom|Number=Sing|Person=3\t2\tnsubj\t_\t_
2\tнаписал\tнаписать\tVERB\t_\tAspect=Perf|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin\t0\troot\t_\t_
3\tдлинное\tдлинный\tADJ\t_\tCase=Acc|Gender=Neut|Number=Sing\t4\tamod\t_\t_
4\tписьмо\tписьмо\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Neut|Number=Sing\t2\tobj\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";
        let fixture = Fixture::new().word(letter());
        let (pairs, report) = fixture.generate(doc, &[Phenomenon::VerbAccObject]);
        assert!(pairs.is_empty());
        assert_eq!(report.candidates, 0);
    }
}
