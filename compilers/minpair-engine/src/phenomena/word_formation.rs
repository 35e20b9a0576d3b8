use minpair_morph::orthography::{is_vowel, normalize, prefix_chain_ok, prefix_junction_ok};
use minpair_morph::Segmentation;
use minpair_protocol::{DepRel, Feature, MorphFlags, PartOfSpeech, Phenomenon, Token};
use minpair_syntax::AnnotatedSentence;

use crate::candidate::Candidate;
use crate::closed_class::{prefix_overlaps, FROZEN_ROOTS, VERBAL_PREFIXES};
use crate::rule::{derive, HomonymyGuard, Perturbation, Resolved, RuleContext, RuleOutcome};

/// Finite verbs and infinitives.
pub fn verb(_: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let verbal = token.upos == PartOfSpeech::Verb
        && token.features.intersects(MorphFlags::FINITE | MorphFlags::INFINITIVE);
    if !verbal {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id)]
}

/// Adjectives, and nouns modified by one.
pub fn suffix_host(sentence: &AnnotatedSentence, phenomenon: Phenomenon, token: &Token) -> Vec<Candidate> {
    let host = match token.upos {
        PartOfSpeech::Adjective => true,
        PartOfSpeech::Noun => sentence
            .has_dependent(token.id, |t| t.deprel == DepRel::Amod && t.upos == PartOfSpeech::Adjective),
        _ => false,
    };
    if !host {
        return Vec::new();
    }
    vec![Candidate::new(phenomenon, token.id)]
}

fn segmentation<'r>(ctx: &RuleContext<'r>, token: &Token) -> Option<&'r Segmentation> {
    ctx.resources
        .segmentation(&token.lemma)
        .filter(|seg| !seg.is_compound() && seg.root().is_some())
}

/// Inserts one more verbal prefix before or after the single existing one.
pub fn add_prefix(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let Some(seg) = segmentation(ctx, token) else {
        return Vec::new();
    };
    let (Some(root), [existing]) = (seg.root(), seg.prefixes.as_slice()) else {
        return Vec::new();
    };
    if FROZEN_ROOTS.contains(&root) {
        return Vec::new();
    }
    let (form, lemma) = (normalize(&token.form), normalize(&token.lemma));
    let (Some(form_rest), Some(lemma_rest)) = (form.strip_prefix(existing.as_str()), lemma.strip_prefix(existing.as_str()))
    else {
        return Vec::new();
    };

    let attested = ctx.resources.prefixes_for(root, PartOfSpeech::Verb.ud());
    let mut chosen: Vec<&str> = Vec::new();
    for &prefix in VERBAL_PREFIXES {
        let overlapping = prefix == existing
            || prefix_overlaps(existing).contains(&prefix)
            || chosen.iter().any(|c| prefix_overlaps(c).contains(&prefix));
        if !overlapping && attested.iter().any(|a| a == prefix) {
            chosen.push(prefix);
        }
    }

    let mut outcomes = Vec::new();
    for prefix in chosen {
        if prefix_chain_ok(&[prefix, existing.as_str()]) {
            outcomes.push(prefixed(
                ctx,
                token,
                format!("{prefix}{form}"),
                format!("{prefix}{lemma}"),
                existing,
                format!("{prefix}{existing}"),
                "before",
            ));
        }
        if prefix_junction_ok(existing, prefix) && prefix_junction_ok(prefix, form_rest) {
            outcomes.push(prefixed(
                ctx,
                token,
                format!("{existing}{prefix}{form_rest}"),
                format!("{existing}{prefix}{lemma_rest}"),
                existing,
                format!("{existing}{prefix}"),
                "after",
            ));
        }
    }
    outcomes
}

fn prefixed(
    ctx: &RuleContext<'_>,
    token: &Token,
    form: String,
    lemma: String,
    source: &str,
    target: String,
    subtype: &'static str,
) -> RuleOutcome {
    let derived = derive(ctx, token, &lemma, &form, HomonymyGuard::Unguarded)?;
    Ok(Perturbation::replace(derived, Feature::Prefix, source, &target).with_subtype(subtype))
}

/// Swaps the two prefixes of a doubly prefixed verb.
pub fn swap_prefixes(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let Some(seg) = segmentation(ctx, token) else {
        return Vec::new();
    };
    let [first, second] = seg.prefixes.as_slice() else {
        return Vec::new();
    };
    let original = format!("{first}{second}");
    let swapped = format!("{second}{first}");
    let (form, lemma) = (normalize(&token.form), normalize(&token.lemma));
    let (Some(form_rest), Some(lemma_rest)) = (form.strip_prefix(original.as_str()), lemma.strip_prefix(original.as_str()))
    else {
        return Vec::new();
    };
    if !prefix_chain_ok(&[second.as_str(), first.as_str(), form_rest]) {
        return Vec::new();
    }
    let outcome = derive(
        ctx,
        token,
        &format!("{swapped}{lemma_rest}"),
        &format!("{swapped}{form_rest}"),
        HomonymyGuard::Unguarded,
    )
    .map(|derived| Perturbation::replace(derived, Feature::Prefix, &original, &swapped));
    vec![outcome]
}

/// Suffixes that may join this word: attested with the root and the part of speech,
/// derivational, not already present, compatible with the present ones and with each other.
fn suffix_candidates<'r>(ctx: &RuleContext<'r>, seg: &Segmentation, root: &str, pos: &str) -> Vec<&'r str> {
    let resources = ctx.resources;
    let by_pos = resources.suffixes_for_pos(pos);
    let mut chosen: Vec<&'r str> = Vec::new();
    for suffix in resources.suffixes_for_root(root, pos) {
        let suffix = suffix.as_str();
        if !by_pos.iter().any(|s| s == suffix)
            || resources.derivational(suffix).is_none()
            || seg.suffixes.iter().any(|s| s == suffix)
        {
            continue;
        }
        let clashes = seg.suffixes.iter().any(|present| {
            resources
                .derivational(present)
                .is_some_and(|rule| rule.incompatible.iter().chain(&rule.excludes).any(|s| s == suffix))
        });
        let overlaps = chosen.iter().any(|picked| {
            resources
                .derivational(picked)
                .is_some_and(|rule| rule.excludes.iter().any(|s| s == suffix))
        });
        if !clashes && !overlaps {
            chosen.push(suffix);
        }
    }
    chosen
}

fn last_char(s: &str) -> Option<char> {
    s.chars().last()
}

fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

/// Junction constraints around a suffix inserted at `position` of the suffix chain.
fn junction_ok(root: &str, chain: &[String], position: usize, suffix: &str, ending: &str) -> bool {
    let (Some(head), Some(tail)) = (first_char(suffix), last_char(suffix)) else {
        return false;
    };
    let previous = position.checked_sub(1).and_then(|i| chain.get(i));
    let next = chain.get(position + 1);

    match previous {
        None if last_char(root) == Some(head) => return false,
        Some(prev) if last_char(prev) == Some(head) => return false,
        Some(prev) if last_char(prev).is_some_and(is_vowel) && is_vowel(head) => return false,
        _ => {}
    }
    match next {
        Some(next) if first_char(next).is_some_and(is_vowel) && (is_vowel(tail) || tail == 'ь') => return false,
        None if first_char(ending) == Some(tail) => return false,
        None if first_char(ending).is_some_and(is_vowel) && tail == 'ь' => return false,
        _ => {}
    }
    true
}

/// Orthographic repairs at the end of a derived word.
fn respell(word: String) -> String {
    let chars: Vec<char> = word.chars().collect();
    match chars.as_slice() {
        [.., c, 'й'] if !is_vowel(*c) => format!("{}ый", &word[..word.len() - 'й'.len_utf8()]),
        [.., 'ц', 'и'] => format!("{}ы", &word[..word.len() - 'и'.len_utf8()]),
        _ => word,
    }
}

/// Inserts an attested derivational suffix at every slot of the suffix chain.
pub fn add_suffix(ctx: &RuleContext<'_>, candidate: &Candidate, _: &Resolved) -> Vec<RuleOutcome> {
    let Some(token) = ctx.token(candidate.target) else {
        return Vec::new();
    };
    let Some(seg) = segmentation(ctx, token) else {
        return Vec::new();
    };
    let Some(root) = seg.root() else {
        return Vec::new();
    };
    let known_chain = seg
        .suffixes
        .iter()
        .all(|s| ctx.resources.derivational(s).is_some() || ctx.resources.is_inflectional(s));
    if !known_chain {
        return Vec::new();
    }

    let original: String = seg.suffixes.concat();
    let stem = format!("{root}{original}");
    let (form, lemma) = (normalize(&token.form), normalize(&token.lemma));
    if !form.contains(&stem) {
        return Vec::new();
    }

    let mut outcomes = Vec::new();
    for suffix in suffix_candidates(ctx, seg, root, token.upos.ud()) {
        for position in 0..=seg.suffixes.len() {
            // A soft sign survives only word-finally.
            let word_final = position == seg.suffixes.len() && seg.ending().is_empty();
            let bare = match suffix.strip_suffix('ь') {
                Some(bare) if !word_final => bare,
                _ => suffix,
            };
            let mut chain = seg.suffixes.clone();
            chain.insert(position, bare.to_string());
            if !junction_ok(root, &chain, position, bare, seg.ending()) {
                continue;
            }
            let joined = chain.concat();
            let new_stem = format!("{root}{joined}");
            let new_form = respell(form.replacen(&stem, &new_stem, 1));
            let new_lemma = lemma.replacen(&stem, &new_stem, 1);
            outcomes.push(
                derive(ctx, token, &new_lemma, &new_form, HomonymyGuard::Unguarded)
                    .map(|derived| Perturbation::replace(derived, Feature::Suffix, &original, &joined)),
            );
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use minpair_protocol::{Phenomenon, TokenId};

    use crate::testkit::{Fixture, PLECHI};

    fn fixture() -> Fixture {
        Fixture::new()
            .segment("плечо", "плеч:ROOT/о:END")
            .suffixes_for_root("плеч_NOUN", &["ник", "ист"])
            .suffixes_for_pos("NOUN", &["ник", "ист", "ость"])
            .derivational("ник", &["ист"], &[])
            .derivational("ист", &[], &[])
            .segment("писать", "пис:ROOT/а:SUFF/ть:END")
            .segment("переписать", "пере:PREF/пис:ROOT/а:SUFF/ть:END")
            .prefixes_for_root("пис_VERB", &["вы", "пере", "до", "раз", "рас"])
    }

    #[test]
    fn test_shoulders_take_new_suffix() {
        let fixture = fixture();
        let (pairs, _) = fixture.generate(PLECHI, &[Phenomenon::AddNewSuffix]);
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.target_sentence, "Руками обхватила широкие плечники Окота.");
        assert_eq!(pair.source_word, "плечи");
        assert_eq!(pair.target_word, "плечники");
        assert_eq!(pair.spans.len(), 1);
        assert_eq!(pair.spans[0].start, TokenId(4));
        assert_eq!(pair.feature, "suffix");
    }

    #[test]
    fn test_respelling() {
        assert_eq!(super::respell("плечникй".to_string()), "плечникый");
        assert_eq!(super::respell("столици".to_string()), "столицы");
        assert_eq!(super::respell("новый".to_string()), "новый");
    }

    #[test]
    fn test_prefix_positions() {
        let doc = "\
# sent_id = pref
# text = Он переписал текст.
1\tОн\tон\tPRON\t_\tCase=Nom|Number=Sing|Person=3\t2\tnsubj\t_\t_
2\tпереписал\tпереписать\tVERB\t_\tAspect=Perf|Gender=Masc|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin\t0\troot\t_\t_
3\tтекст\tтекст\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Masc|Number=Sing\t2\tobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";
        let fixture = fixture();
        let (pairs, _) = fixture.generate(doc, &[Phenomenon::AddVerbPrefix]);
        let targets: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.target_word.as_str(), p.subtype.as_str()))
            .collect();
        assert!(targets.contains(&("выпереписал", "before")));
        assert!(targets.contains(&("перевыписал", "after")));
        assert!(targets.contains(&("передописал", "after")));
        // раз fails both junctions and its allomorph рас is never tried.
        assert!(!targets.iter().any(|(w, _)| w.starts_with("ра")));
    }

    #[test]
    fn test_prefixes_swap() {
        let doc = "\
# sent_id = swap
# text = Он выпереписал текст.
1\tОн\tон\tPRON\t_\tCase=Nom|Number=Sing|Person=3\t2\tnsubj\t_\t_
2\tвыпереписал\tвыпереписать\tVERB\t_\tAspect=Perf|Gender=Masc|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin\t0\troot\t_\t_
3\tтекст\tтекст\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Masc|Number=Sing\t2\tobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_
";
        let fixture = Fixture::new().segment("выпереписать", "вы:PREF/пере:PREF/пис:ROOT/а:SUFF/ть:END");
        let (pairs, _) = fixture.generate(doc, &[Phenomenon::ChangeVerbPrefixesOrder]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].target_sentence, "Он перевыписал текст.");
        assert_eq!((pairs[0].source_value.as_str(), pairs[0].target_value.as_str()), ("выпере", "перевы"));
    }
}
