use minpair_protocol::{Case, DepRel, Feature, PartOfSpeech, Phenomenon, Token, TokenId};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::rule::{derive, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

const REFLEXIVE: &str = "себя";
const POSSESSIVE_VERBS: &[&str] = &["быть", "есть"];
const MAX_REACH: u32 = 10;

fn reach(from: TokenId, to: TokenId) -> Option<u32> {
    to.0.checked_sub(from.0).filter(|d| (1..=MAX_REACH).contains(d))
}

/// Possessor in `у X есть Y`: a bare genitive under `у`, followed within ten tokens by
/// the possessive verb or copula, with any subject coming after `у`.
pub fn external_possessor(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let nominal = matches!(
        token.upos,
        PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Pronoun
    );
    if !nominal || token.lemma_is(REFLEXIVE) || sentence.has_modifier(token.id) {
        return Vec::new();
    }
    if Case::from_flags(token.features).is_some_and(|case| case != Case::Genitive) {
        return Vec::new();
    }
    let Some(preposition) = sentence.dependents(token.id).find(|t| t.lemma_is("у")) else {
        return Vec::new();
    };

    let (clause, verb) = match token.deprel {
        DepRel::Obl => {
            let Some(head) = sentence.head(token.id) else {
                return Vec::new();
            };
            if head.upos != PartOfSpeech::Verb {
                return Vec::new();
            }
            (head.id, head)
        }
        DepRel::Root => {
            let Some(cop) = sentence.dependents(token.id).find(|t| t.deprel == DepRel::Cop) else {
                return Vec::new();
            };
            (token.id, cop)
        }
        _ => return Vec::new(),
    };
    if !verb.lemma_in(POSSESSIVE_VERBS) || reach(preposition.id, verb.id).is_none() {
        return Vec::new();
    }
    let subject_first = sentence
        .dependents(clause)
        .any(|t| t.deprel == DepRel::Nsubj && t.id < preposition.id);
    if subject_first {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id).anchored_at(verb.id)]
}

/// Replaces the possessor with `себя`.
pub fn reflexivize(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let outcome = derive(ctx, token, REFLEXIVE, REFLEXIVE, HomonymyGuard::Unguarded)
        .map(|form| Perturbation::replace(form, Feature::ReflexivePronoun, &token.lemma, REFLEXIVE));
    vec![outcome]
}

#[cfg(test)]
mod tests {
    use minpair_protocol::{Phenomenon, TokenId};

    use crate::testkit::Fixture;

    const FRIENDS: &str = "\
# sent_id = friends
# text = У него были друзья.
1\tУ\tу\tADP\t_\t_\t2\tcase\t_\t_
2\tнего\tон\tPRON\t_\tCase=Gen|Gender=Masc|Number=Sing|Person=3\t3\tobl\t_\t_
3\tбыли\tбыть\tVERB\t_\tAspect=Imp|Mood=Ind|Number=Plur|Tense=Past|VerbForm=Fin\t0\troot\t_\t_
4\tдрузья\tдруг\tNOUN\t_\tAnimacy=Anim|Case=Nom|Gender=Masc|Number=Plur\t3\tnsubj\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_
";

    #[test]
    fn test_possessor_becomes_reflexive() {
        let (pairs, _) = Fixture::new().generate(FRIENDS, &[Phenomenon::ExternalPossessor]);
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.target_sentence, "У себя были друзья.");
        assert_eq!((pair.source_value.as_str(), pair.target_value.as_str()), ("он", "себя"));
        assert_eq!(pair.feature, "lemma");
        assert_eq!(pair.spans[0].start, TokenId(2));
    }

    #[test]
    fn test_subject_before_possessor() {
        let doc = "\
# sent_id = reversed
# text = Друзья были у него.
1\tДрузья\tдруг\tNOUN\t_\tAnimacy=Anim|Case=Nom|Gender=Masc|Number=Plur\t2\tnsubj\t_\t_
2\tбыли\tбыть\tVERB\t_\tAspect=Imp|Mood=Ind|Number=Plur|Tense=Past|VerbForm=Fin\t0\troot\t_\t_
3\tу\tу\tADP\t_\t_\t4\tcase\t_\t_
4\tнего\tон\tPRON\t_\tCase=Gen|Gender=Masc|Number=Sing|Person=3\t2\tobl\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";
        let (pairs, report) = Fixture::new().generate(doc, &[Phenomenon::ExternalPossessor]);
        assert!(pairs.is_empty());
        assert_eq!(report.candidates, 0);
    }

    #[test]
    fn test_reach() {
        assert_eq!(super::reach(TokenId(1), TokenId(3)), Some(2));
        assert_eq!(super::reach(TokenId(3), TokenId(1)), None);
        assert_eq!(super::reach(TokenId(1), TokenId(12)), None);
    }
}
