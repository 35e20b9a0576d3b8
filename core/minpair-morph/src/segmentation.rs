use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::all_consuming,
    multi::separated_list1,
    sequence::separated_pair,
    IResult,
};

use crate::MorphError;

/// Morphemes of a dictionary word, in surface order within each slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub prefixes: Vec<String>,
    pub roots: Vec<String>,
    pub links: Vec<String>,
    pub hyphens: Vec<String>,
    pub suffixes: Vec<String>,
    pub postfixes: Vec<String>,
    pub endings: Vec<String>,
}

impl Segmentation {
    /// Last root; derivational rules attach next to it.
    pub fn root(&self) -> Option<&str> {
        self.roots.last().map(String::as_str)
    }

    pub fn ending(&self) -> &str {
        self.endings.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_compound(&self) -> bool {
        !self.hyphens.is_empty()
    }
}

fn is_morph_char(c: char) -> bool {
    c.is_alphabetic() || c == '-'
}

fn segment(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(is_morph_char),
        char(':'),
        take_while1(|c: char| c.is_ascii_uppercase()),
    )(input)
}

/// Parses `"пере:PREF/пис:ROOT/а:SUFF/ть:END"`.
pub fn parse_segmentation(input: &str) -> Result<Segmentation, MorphError> {
    let trimmed = input.trim();
    let (_, segments) = all_consuming(separated_list1(char('/'), segment))(trimmed).map_err(|e| {
        MorphError::Segmentation {
            input: input.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut result = Segmentation::default();
    for (morph, label) in segments {
        let slot = match label {
            "PREF" => &mut result.prefixes,
            "ROOT" => &mut result.roots,
            "LINK" => &mut result.links,
            "HYPH" => &mut result.hyphens,
            "SUFF" => &mut result.suffixes,
            "POSTFIX" => &mut result.postfixes,
            "END" => &mut result.endings,
            other => {
                return Err(MorphError::Segmentation {
                    input: input.to_string(),
                    reason: format!("unknown morpheme label {other}"),
                })
            }
        };
        slot.push(morph.to_lowercase());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_segmentation() {
        let seg = parse_segmentation("за:PREF/пис:ROOT/а:SUFF/ть:SUFF").unwrap();
        assert_eq!(seg.prefixes, vec!["за"]);
        assert_eq!(seg.root(), Some("пис"));
        assert_eq!(seg.suffixes, vec!["а", "ть"]);
        assert_eq!(seg.ending(), "");
    }

    #[test]
    fn test_noun_segmentation() {
        let seg = parse_segmentation("плеч:ROOT/о:END").unwrap();
        assert!(seg.prefixes.is_empty());
        assert_eq!(seg.root(), Some("плеч"));
        assert_eq!(seg.ending(), "о");
        assert!(!seg.is_compound());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_segmentation("плеч:ROOT/").is_err());
        assert!(parse_segmentation("плеч:STEM").is_err());
        assert!(parse_segmentation("").is_err());
    }
}
