use minpair_morph::orthography::normalize;
use minpair_protocol::{Case, Feature, MorphFlags, PartOfSpeech, Phenomenon, Token};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::closed_class::{case_slot, Declension, CONJUGATION_ENDINGS, DECLENSION_ENDINGS};
use crate::rule::{derive, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

const REFLEXIVE_POSTFIXES: [&str; 2] = ["ся", "сь"];

/// Present or future finite verbs.
pub fn finite_nonpast(_: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let finite = token.upos == PartOfSpeech::Verb
        && token.has(MorphFlags::FINITE)
        && token.features.intersects(MorphFlags::PRESENT | MorphFlags::FUTURE)
        && !token.features.intersects(MorphFlags::IMPERATIVE | MorphFlags::CONDITIONAL);
    if !finite {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id)]
}

/// Splits off the reflexive postfix.
fn split_postfix(form: &str) -> (&str, &str) {
    REFLEXIVE_POSTFIXES
        .iter()
        .find_map(|postfix| form.strip_suffix(postfix).map(|stem| (stem, *postfix)))
        .unwrap_or((form, ""))
}

/// Longest personal ending of either conjugation, with its partner and the
/// conjugation labels it swaps between.
fn conjugation_swap(word: &str) -> Option<(&'static str, &'static str, &'static str, &'static str)> {
    let first = CONJUGATION_ENDINGS
        .iter()
        .filter(|(ending, _)| word.ends_with(ending))
        .map(|&(ending, partner)| (ending, partner, "I", "II"));
    let second = CONJUGATION_ENDINGS
        .iter()
        .filter(|(_, ending)| word.ends_with(ending))
        .map(|&(partner, ending)| (ending, partner, "II", "I"));
    first
        .chain(second)
        .fold(None, |best: Option<(&str, &str, &str, &str)>, swap| match best {
            Some(current) if current.0.chars().count() >= swap.0.chars().count() => Some(current),
            _ => Some(swap),
        })
}

/// Replaces a first-conjugation personal ending with the second-conjugation one, or back.
pub fn swap_conjugation(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let lowered = token.form.to_lowercase();
    let (body, postfix) = split_postfix(&lowered);
    let Some((ending, partner, source, target)) = conjugation_swap(body) else {
        return Vec::new();
    };
    let stem = &body[..body.len() - ending.len()];
    let form = format!("{stem}{partner}{postfix}");
    let outcome = derive(ctx, token, &token.lemma, &form, HomonymyGuard::AnyOtherCell)
        .map(|derived| Perturbation::replace(derived, Feature::Conjugation, source, target));
    vec![outcome]
}

/// Singular nouns in an oblique case.
pub fn oblique_noun(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let oblique = token.upos == PartOfSpeech::Noun
        && token.has(MorphFlags::SINGULAR)
        && token.features.intersects(Case::CORE.difference(MorphFlags::NOMINATIVE));
    if !oblique {
        return Vec::new();
    }
    let subtype = if sentence.dependents(token.id).next().is_some() {
        "has_dep"
    } else {
        "plain"
    };
    vec![Candidate::new(phenomenon, token.id).subtype(subtype)]
}

/// Declension class read off the dictionary form and gender.
pub fn declension_of(lemma: &str, features: MorphFlags) -> Option<Declension> {
    let lemma = normalize(lemma);
    if lemma.ends_with('а') || lemma.ends_with('я') {
        Some(Declension::First)
    } else if lemma.ends_with('ь') && features.contains(MorphFlags::FEMININE) {
        Some(Declension::Third)
    } else if features.intersects(MorphFlags::MASCULINE | MorphFlags::NEUTER) {
        Some(Declension::Second)
    } else {
        None
    }
}

fn slot_endings(declension: Declension, slot: usize) -> &'static [&'static str] {
    DECLENSION_ENDINGS
        .iter()
        .find(|(class, _)| *class == declension)
        .map(|(_, endings)| endings[slot])
        .unwrap_or(&[])
}

/// Gives the noun the ending another declension class uses for the same case.
pub fn swap_declension(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let Some(case) = Case::from_flags(token.features) else {
        return Vec::new();
    };
    let (Some(own), Some(slot)) = (declension_of(&token.lemma, token.features), case_slot(case)) else {
        return Vec::new();
    };

    let lowered = token.form.to_lowercase();
    let Some(ending) = slot_endings(own, slot)
        .iter()
        .filter(|e| **e != "=" && lowered.ends_with(*e))
        .max_by_key(|e| e.len())
    else {
        return Vec::new();
    };
    let stem = &lowered[..lowered.len() - ending.len()];

    alternative_endings(own, slot, ending)
        .into_iter()
        .map(|(other, class)| {
            let form = format!("{stem}{other}");
            derive(ctx, token, &token.lemma, &form, HomonymyGuard::AnyOtherCell)
                .map(|derived| Perturbation::replace(derived, Feature::Declension, own.label(), class.label()))
        })
        .collect()
}

/// Endings the other classes use in `slot`, each once. An ending shared by several
/// classes is labelled with the highest of them; table rows are in class order.
fn alternative_endings(own: Declension, slot: usize, ending: &str) -> Vec<(&'static str, Declension)> {
    let mut endings: Vec<(&'static str, Declension)> = Vec::new();
    for (class, _) in DECLENSION_ENDINGS.iter().filter(|(class, _)| *class != own) {
        for other in slot_endings(*class, slot).iter().filter(|e| **e != "=" && **e != ending) {
            match endings.iter_mut().find(|(seen, _)| seen == other) {
                Some(entry) => entry.1 = *class,
                None => endings.push((*other, *class)),
            }
        }
    }
    endings
}

#[cfg(test)]
mod tests {
    use minpair_protocol::{MorphFlags as F, PartOfSpeech, Phenomenon};

    use super::*;
    use crate::testkit::{Fixture, Word};

    const LID: &str = "\
# sent_id = lid
# text = Крышка стола упала.
1\tКрышка\tкрышка\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Fem|Number=Sing\t3\tnsubj\t_\t_
2\tстола\tстол\tNOUN\t_\tAnimacy=Inan|Case=Gen|Gender=Masc|Number=Sing\t1\tnmod\t_\t_
3\tупала\tупасть\tVERB\t_\tAspect=Perf|Gender=Fem|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin\t0\troot\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_
";

    #[test]
    fn test_conjugation_endings() {
        assert_eq!(conjugation_swap("пишете"), Some(("ете", "ите", "I", "II")));
        assert_eq!(conjugation_swap("строят"), Some(("ят", "ют", "II", "I")));
        assert_eq!(conjugation_swap("пишу"), None);
        assert_eq!(split_postfix("учится"), ("учит", "ся"));
    }

    #[test]
    fn test_reflexive_conjugation() {
        let doc = "\
# sent_id = conj
# text = Она учится.
1\tОна\tона\tPRON\t_\tCase=Nom|Gender=Fem|Number=Sing|Person=3\t2\tnsubj\t_\t_
2\tучится\tучиться\tVERB\t_\tAspect=Imp|Mood=Ind|Number=Sing|Person=3|Tense=Pres|VerbForm=Fin\t0\troot\t_\tSpaceAfter=No
3\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";
        let (pairs, _) = Fixture::new().generate(doc, &[Phenomenon::ChangeVerbConjugation]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].target_sentence, "Она учется.");
        assert_eq!((pairs[0].source_value.as_str(), pairs[0].target_value.as_str()), ("II", "I"));
    }

    #[test]
    fn test_declension_swap() {
        let table = Word::new("стол", PartOfSpeech::Noun, F::MASCULINE | F::INANIMATE)
            .cell(F::NOMINATIVE | F::SINGULAR, "стол")
            .cell(F::GENITIVE | F::SINGULAR, "стола")
            .cell(F::NOMINATIVE | F::PLURAL, "столы");
        let (pairs, report) = Fixture::new()
            .word(table)
            .generate(LID, &[Phenomenon::ChangeDeclensionEnding]);
        // "столы" is the nominative plural.
        assert_eq!(report.unsynthesizable, 1);
        let targets: Vec<&str> = pairs.iter().map(|p| p.target_word.as_str()).collect();
        assert_eq!(targets, vec!["столи"]);
        assert_eq!(pairs[0].subtype, "plain");
        assert_eq!((pairs[0].source_value.as_str(), pairs[0].target_value.as_str()), ("II", "III"));
        assert_eq!(pairs[0].feature, "declension");
    }

    #[test]
    fn test_shared_ending_takes_highest_class() {
        assert_eq!(
            alternative_endings(Declension::Second, 1, "а"),
            vec![("ы", Declension::First), ("и", Declension::Third)]
        );
        assert_eq!(
            alternative_endings(Declension::First, 2, "е"),
            vec![("у", Declension::Second), ("ю", Declension::Second), ("и", Declension::Third)]
        );
    }

    #[test]
    fn test_third_declension_form_colliding_with_plural() {
        let doc = "\
# sent_id = mane
# text = Грива коня развевалась.
1\tГрива\tгрива\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Fem|Number=Sing\t3\tnsubj\t_\t_
2\tконя\tконь\tNOUN\t_\tAnimacy=Anim|Case=Gen|Gender=Masc|Number=Sing\t1\tnmod\t_\t_
3\tразвевалась\tразвеваться\tVERB\t_\tAspect=Imp|Gender=Fem|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin\t0\troot\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t3\tpunct\t_\t_
";
        let horse = Word::new("конь", PartOfSpeech::Noun, F::MASCULINE | F::ANIMATE)
            .cell(F::NOMINATIVE | F::SINGULAR, "конь")
            .cell(F::GENITIVE | F::SINGULAR, "коня")
            .cell(F::NOMINATIVE | F::PLURAL, "кони");
        let (pairs, report) = Fixture::new()
            .word(horse)
            .generate(doc, &[Phenomenon::ChangeDeclensionEnding]);
        // "кони" (declension III genitive) is the nominative plural.
        assert_eq!(report.unsynthesizable, 1);
        let emitted: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.target_word.as_str(), p.target_value.as_str()))
            .collect();
        assert_eq!(emitted, vec![("коны", "I")]);
        assert_eq!(pairs[0].target_sentence, "Грива коны развевалась.");
    }

    #[test]
    fn test_declension_classes() {
        assert_eq!(declension_of("книга", F::FEMININE), Some(Declension::First));
        assert_eq!(declension_of("ночь", F::FEMININE), Some(Declension::Third));
        assert_eq!(declension_of("день", F::MASCULINE), Some(Declension::Second));
        assert_eq!(declension_of("ножницы", F::empty()), None);
    }
}
