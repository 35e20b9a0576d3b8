use minpair_protocol::{Family, FeatureAxis, PartOfSpeech, Phenomenon, Token, TokenId};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::{Attractor, Candidate};
use crate::registry;

/// Structural predicate of one phenomenon, tried at every token of a sentence.
pub type Matcher = fn(&AnnotatedSentence, Phenomenon, &Token) -> Vec<Candidate>;

/// Declarative search over a sentence. Holds no state; every call restarts the scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    /// Lazily yields the candidates of `phenomenon`, in token order. An unregistered
    /// phenomenon or a sentence without the construction yields nothing.
    pub fn find<'s>(
        &self,
        sentence: &'s AnnotatedSentence,
        phenomenon: Phenomenon,
    ) -> impl Iterator<Item = Candidate> + 's {
        let matcher = registry::entry(phenomenon).map(|entry| entry.matcher);
        sentence
            .tokens()
            .iter()
            .flat_map(move |token| matcher.map(|m| m(sentence, phenomenon, token)).unwrap_or_default())
            .map(move |candidate| with_attractor(sentence, candidate))
    }
}

fn with_attractor(sentence: &AnnotatedSentence, mut candidate: Candidate) -> Candidate {
    if candidate.phenomenon.family() != Family::Agreement {
        return candidate;
    }
    let (Some(axis), Some(controller)) = (candidate.phenomenon.axis(), candidate.controller) else {
        return candidate;
    };
    if let Some(attractor) = find_attractor(sentence, axis, controller, candidate.target) {
        candidate.attractor = Some(attractor);
        candidate.subtype = "attractor";
    }
    candidate
}

/// The token of the controller's constituent, strictly between controller and target,
/// whose value on `axis` differs from the controller's. The one nearest the target wins.
pub fn find_attractor(
    sentence: &AnnotatedSentence,
    axis: FeatureAxis,
    controller: TokenId,
    target: TokenId,
) -> Option<Attractor> {
    let own = axis.value_of(sentence.token(controller)?.features)?;
    sentence
        .constituent(controller)
        .into_iter()
        .filter(|id| sentence.is_between(*id, controller, target))
        .filter_map(|id| {
            let token = sentence.token(id)?;
            if !(token.upos.is_nominal() || token.upos.compatible(PartOfSpeech::Adjective)) {
                return None;
            }
            let value = axis.value_of(token.features)?;
            (value != own).then_some(Attractor { token: id, value })
        })
        .min_by_key(|attractor| attractor.token.0.abs_diff(target.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minpair_protocol::MorphFlags;

    use crate::testkit::parse;

    const DECISION: &str = "\
# sent_id = attr
# text = Решение министров устроило всех.
1\tРешение\tрешение\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Neut|Number=Sing\t3\tnsubj\t_\t_
2\tминистров\tминистр\tNOUN\t_\tAnimacy=Anim|Case=Gen|Gender=Masc|Number=Plur\t1\tnmod\t_\t_
3\tустроило\tустроить\tVERB\t_\tAspect=Perf|Gender=Neut|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
4\tвсех\tвесь\tPRON\t_\tAnimacy=Anim|Case=Acc|Number=Plur\t3\tobj\t_\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_
";

    #[test]
    fn test_attractor_nearest_target() {
        let sentence = parse(DECISION);
        let attractor = find_attractor(&sentence, FeatureAxis::Number, TokenId(1), TokenId(3)).unwrap();
        assert_eq!(attractor, Attractor { token: TokenId(2), value: MorphFlags::PLURAL });
        assert!(find_attractor(&sentence, FeatureAxis::Person, TokenId(1), TokenId(3)).is_none());
    }

    #[test]
    fn test_find_is_restartable() {
        let sentence = parse(DECISION);
        let matcher = PatternMatcher;
        let first: Vec<Candidate> = matcher.find(&sentence, Phenomenon::NounSubjPredicateNumber).collect();
        let second: Vec<Candidate> = matcher.find(&sentence, Phenomenon::NounSubjPredicateNumber).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].subtype, "attractor");
        assert_eq!(first[0].controller, Some(TokenId(1)));

        assert_eq!(matcher.find(&sentence, Phenomenon::ExternalPossessor).count(), 0);
    }
}
