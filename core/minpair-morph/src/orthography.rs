//! Spelling-level helpers: alphabet unification, casing transfer and the
//! letter sequences that never occur inside a Russian word.

pub const VOWELS: &[char] = &['а', 'о', 'и', 'ы', 'у', 'э', 'ё', 'е', 'я', 'ю'];
pub const VOICELESS: &[char] = &['к', 'п', 'с', 'т', 'ф', 'х', 'ц', 'ч', 'ш', 'щ'];
pub const VOICED: &[char] = &['б', 'в', 'г', 'д', 'ж', 'з', 'й', 'л', 'м', 'н', 'р'];

/// Sequences that never occur inside a Russian word.
pub const FORBIDDEN_SEQUENCES: &[&str] = &[
    "ьь", "стьо", "стьа", "скств", "нькь", "ць", "кь", "ця", "сщ", "цщ", "ци", "щы", "жы",
    "шы", "чы", "чя", "щя", "шя", "чю", "щю", "шю", "щч", "йек",
];

/// Word onsets that never occur in Russian.
pub const FORBIDDEN_ONSETS: &[&str] = &["уот", "уо", "сис", "вв", "ви", "всс"];

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

/// Replaces ё with е, keeping case. Output text is always unified.
pub fn unify_alphabet(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ё' => 'е',
            'Ё' => 'Е',
            other => other,
        })
        .collect()
}

/// Lookup key: lowercase and ё-unified.
pub fn normalize(text: &str) -> String {
    unify_alphabet(&text.to_lowercase())
}

/// True when the two strings differ, but only in ё/е spelling.
pub fn differs_only_by_yo(left: &str, right: &str) -> bool {
    left != right && normalize(left) == normalize(right)
}

/// Transfers the casing pattern of `old` onto `new`: all-caps, all-lower,
/// or capitals at the same character positions.
pub fn capitalize_like(old: &str, new: &str) -> String {
    let letters = || old.chars().filter(|c| c.is_alphabetic());
    if letters().next().is_some() && letters().all(char::is_uppercase) {
        return new.to_uppercase();
    }
    if letters().all(char::is_lowercase) {
        return new.to_lowercase();
    }
    let capitals: Vec<usize> = old
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .collect();
    new.chars()
        .enumerate()
        .flat_map(|(i, c)| {
            let upper = capitals.contains(&i);
            let mapped: Vec<char> = if upper {
                c.to_uppercase().collect()
            } else {
                vec![c]
            };
            mapped
        })
        .collect()
}

pub fn has_forbidden_sequence(word: &str) -> bool {
    let word = word.to_lowercase();
    FORBIDDEN_SEQUENCES.iter().any(|seq| word.contains(seq))
}

pub fn has_forbidden_onset(word: &str) -> bool {
    let word = word.to_lowercase();
    FORBIDDEN_ONSETS.iter().any(|onset| word.starts_with(onset))
}

/// Junction rules between a prefix and whatever follows it: ъ needs an iotated vowel,
/// з/с-final prefixes assimilate in voicing, and a prefix never ends in the letter
/// the next morpheme starts with.
pub fn prefix_junction_ok(prefix: &str, next: &str) -> bool {
    let (Some(last), Some(first)) = (prefix.chars().last(), next.chars().next()) else {
        return false;
    };
    if last == 'ъ' && !matches!(first, 'е' | 'ё' | 'ю' | 'я') {
        return false;
    }
    if last == 'з'
        && !VOICED.contains(&first)
        && !is_vowel(first)
        && matches!(prefix, "рас" | "раз" | "из" | "ис")
    {
        return false;
    }
    if last == 'с' && (!VOICELESS.contains(&first) || is_vowel(first)) {
        return false;
    }
    last != first
}

/// Applies [`prefix_junction_ok`] to each adjacent pair of a prefix chain.
pub fn prefix_chain_ok<S: AsRef<str>>(prefixes: &[S]) -> bool {
    prefixes
        .windows(2)
        .all(|pair| prefix_junction_ok(pair[0].as_ref(), pair[1].as_ref()))
}
