//! Closed-class word lists compiled into the engine.

use minpair_protocol::{Case, MorphFlags, Tense};

/// Verbal prefixes the prefixation rules may add, in lookup order.
pub const VERBAL_PREFIXES: &[&str] = &[
    "в", "вз", "вы", "до", "за", "из", "ис", "на", "над", "о", "об", "от", "пере", "по", "под",
    "пред", "при", "про", "раз", "рас", "с", "у",
];

/// Prefixes that are allomorphs of one another; only one may appear among candidates.
pub const PREFIX_OVERLAPS: &[(&str, &[&str])] = &[
    ("раз", &["рас"]),
    ("рас", &["раз"]),
    ("из", &["ис"]),
    ("ис", &["из"]),
    ("в", &["вз"]),
    ("вз", &["в"]),
];

pub fn prefix_overlaps(prefix: &str) -> &'static [&'static str] {
    PREFIX_OVERLAPS
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, overlaps)| *overlaps)
        .unwrap_or(&[])
}

/// Roots whose prefixed verbs are too lexicalized to perturb.
pub const FROZEN_ROOTS: &[&str] = &["пол", "лож", "ня", "ним"];

/// Singular endings of the three declension classes:
/// nominative, genitive, dative, accusative, instrumental, locative.
/// `=` in the accusative means "same as nominative or genitive, by animacy".
pub const DECLENSION_ENDINGS: [(Declension, [&[&str]; 6]); 3] = [
    (
        Declension::First,
        [&["а", "я"], &["ы", "и"], &["е"], &["у", "ю"], &["ой", "ей"], &["е"]],
    ),
    (
        Declension::Second,
        [&["", "ь", "о", "е"], &["а", "я"], &["у", "ю"], &["="], &["ом", "ем"], &["е"]],
    ),
    (
        Declension::Third,
        [&["ь"], &["и"], &["и"], &["ь"], &["ью"], &["и"]],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Declension {
    First,
    Second,
    Third,
}

impl Declension {
    pub const fn label(self) -> &'static str {
        match self {
            Declension::First => "I",
            Declension::Second => "II",
            Declension::Third => "III",
        }
    }
}

/// Row of [`DECLENSION_ENDINGS`] for a core case.
pub fn case_slot(case: Case) -> Option<usize> {
    match case {
        Case::Nominative => Some(0),
        Case::Genitive => Some(1),
        Case::Dative => Some(2),
        Case::Accusative => Some(3),
        Case::Instrumental => Some(4),
        Case::Locative => Some(5),
        _ => None,
    }
}

/// First- and second-conjugation personal endings, paired by person and number.
pub const CONJUGATION_ENDINGS: &[(&str, &str)] = &[
    ("ешь", "ишь"),
    ("ёшь", "ишь"),
    ("ет", "ит"),
    ("ёт", "ит"),
    ("ем", "им"),
    ("ём", "им"),
    ("ете", "ите"),
    ("ёте", "ите"),
    ("ут", "ат"),
    ("ют", "ят"),
];

pub const FUTURE_MARKERS: &[&str] = &["завтра", "послезавтра"];
pub const PAST_MARKERS: &[&str] = &["вчера", "позавчера"];
pub const FUTURE_ADJECTIVES: &[&str] = &["будущий", "наступающий", "грядущий", "завтрашний"];
pub const PAST_ADJECTIVES: &[&str] = &["прошлый", "прошедший", "минувший", "вчерашний"];

/// Adverbial tense markers and their opposite-tense partner.
pub const MARKER_PARTNERS: &[(&str, &str)] = &[
    ("вчера", "завтра"),
    ("завтра", "вчера"),
    ("позавчера", "послезавтра"),
    ("послезавтра", "позавчера"),
];

/// Tense expressed by an adverbial or adjectival marker lemma.
pub fn marker_tense(lemma: &str) -> Option<Tense> {
    let lemma = minpair_morph::orthography::normalize(lemma);
    if FUTURE_MARKERS.contains(&lemma.as_str()) || FUTURE_ADJECTIVES.contains(&lemma.as_str()) {
        Some(Tense::Future)
    } else if PAST_MARKERS.contains(&lemma.as_str()) || PAST_ADJECTIVES.contains(&lemma.as_str()) {
        Some(Tense::Past)
    } else {
        None
    }
}

pub const DURATION_ADVERBS: &[&str] = &[
    "долго", "подолгу", "часами", "днями", "годами", "неделями", "месяцами", "веками", "вечно",
    "бесконечно", "постоянно", "всегда", "непрерывно",
];

pub const REPETITION_ADVERBS: &[&str] = &["часто", "редко", "ежедневно", "иногда", "регулярно", "обычно"];
pub const REPETITION_QUANTIFIER: &str = "каждый";
pub const TIME_PERIODS: &[&str] = &["день", "неделя", "год", "месяц", "утро", "вечер", "раз"];

pub const DEONTIC_VERBS: &[&str] = &["стоить", "надо", "следовать", "нужно"];

pub const CONTINUATION_VERBS: &[&str] = &[
    "продолжать", "продолжаться", "продолжить", "продолжиться", "начинать", "начать", "переставать",
    "перестать", "прекращать", "прекратить", "стать", "кончать", "закончить",
];

pub const MODAL_VERBS: &[&str] = &[
    "мочь", "смочь", "хотеть", "захотеть", "уметь", "суметь", "желать", "пожелать", "собираться",
    "намереваться", "пытаться", "попытаться", "стараться", "постараться",
];

/// Interrogative and relative pronouns excluded from government changes.
pub const WH_PRONOUNS: &[&str] = &["кто", "что", "какой", "который", "чей", "сколько"];

/// Indefinite pronoun → negative pronoun.
pub const NEGATIVE_PRONOUNS: &[(&str, &[&str])] = &[
    ("какой-то", &["никакой"]),
    ("какой-либо", &["никакой"]),
    ("какой-нибудь", &["никакой"]),
    ("кто-то", &["никто"]),
    ("кто-либо", &["никто"]),
    ("кто-нибудь", &["никто"]),
    ("что-то", &["ничто"]),
    ("что-либо", &["ничто"]),
    ("что-нибудь", &["ничто"]),
    ("где-то", &["нигде"]),
    ("где-либо", &["нигде"]),
    ("где-нибудь", &["нигде"]),
    ("чей-то", &["ничей"]),
    ("чей-либо", &["ничей"]),
    ("чей-нибудь", &["ничей"]),
    ("когда-то", &["никогда"]),
    ("когда-либо", &["никогда"]),
    ("когда-нибудь", &["никогда"]),
];

/// Negative pronoun → indefinite pronouns licensed only outside negation.
pub const PRONOUNS_NEGATIVE: &[(&str, &[&str])] = &[
    ("никакой", &["какой-нибудь"]),
    ("никто", &["кто-нибудь"]),
    ("ничто", &["что-то", "что-нибудь"]),
    ("никогда", &["когда-нибудь", "когда-либо"]),
];

pub fn lookup<'a>(table: &'a [(&str, &'a [&'a str])], lemma: &str) -> &'a [&'a str] {
    let lemma = minpair_morph::orthography::normalize(lemma);
    table
        .iter()
        .find(|(key, _)| minpair_morph::orthography::normalize(key) == lemma)
        .map(|(_, values)| *values)
        .unwrap_or(&[])
}

pub fn is_negative_pronoun(lemma: &str) -> bool {
    !lookup(PRONOUNS_NEGATIVE, lemma).is_empty()
}

/// Cases each preposition governs.
pub const ADP_CASE_FRAMES: &[(&str, MorphFlags)] = &[
    ("в", MorphFlags::ACCUSATIVE.union(MorphFlags::LOCATIVE)),
    ("на", MorphFlags::ACCUSATIVE.union(MorphFlags::LOCATIVE)),
    ("о", MorphFlags::ACCUSATIVE.union(MorphFlags::LOCATIVE)),
    ("об", MorphFlags::ACCUSATIVE.union(MorphFlags::LOCATIVE)),
    ("с", MorphFlags::GENITIVE.union(MorphFlags::INSTRUMENTAL).union(MorphFlags::ACCUSATIVE)),
    ("из", MorphFlags::GENITIVE),
    ("от", MorphFlags::GENITIVE),
    ("до", MorphFlags::GENITIVE),
    ("у", MorphFlags::GENITIVE),
    ("для", MorphFlags::GENITIVE),
    ("без", MorphFlags::GENITIVE),
    ("около", MorphFlags::GENITIVE),
    ("после", MorphFlags::GENITIVE),
    ("к", MorphFlags::DATIVE),
    ("по", MorphFlags::DATIVE.union(MorphFlags::ACCUSATIVE).union(MorphFlags::LOCATIVE)),
    ("за", MorphFlags::ACCUSATIVE.union(MorphFlags::INSTRUMENTAL)),
    ("под", MorphFlags::ACCUSATIVE.union(MorphFlags::INSTRUMENTAL)),
    ("над", MorphFlags::INSTRUMENTAL),
    ("перед", MorphFlags::INSTRUMENTAL),
    ("при", MorphFlags::LOCATIVE),
    ("через", MorphFlags::ACCUSATIVE),
    ("про", MorphFlags::ACCUSATIVE),
    ("между", MorphFlags::INSTRUMENTAL.union(MorphFlags::GENITIVE)),
];

pub fn adp_frame(lemma: &str) -> Option<MorphFlags> {
    let lemma = minpair_morph::orthography::normalize(lemma);
    ADP_CASE_FRAMES
        .iter()
        .find(|(adp, _)| *adp == lemma)
        .map(|(_, frame)| *frame)
}
