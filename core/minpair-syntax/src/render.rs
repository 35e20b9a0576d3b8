use std::ops::Range;

use minpair_protocol::{AlteredSpan, TokenId};

use crate::{AnnotatedSentence, SentenceError};

/// A surface change applied when rendering the target sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Replace { token: TokenId, form: String },
    /// Moves `token` so that it immediately precedes `before`.
    Move { token: TokenId, before: TokenId },
}

impl Edit {
    pub fn token(&self) -> TokenId {
        match self {
            Edit::Replace { token, .. } | Edit::Move { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub spans: Vec<AlteredSpan>,
}

struct Piece {
    form: String,
    trailing: String,
}

impl AnnotatedSentence {
    /// Renders the sentence with `edits` applied, keeping the original whitespace
    /// around every token, and reports the maximal runs of positions whose surface differs.
    pub fn render(&self, edits: &[Edit]) -> Result<Rendered, SentenceError> {
        let text = self.text();
        let tokens = self.tokens();
        let spans: Vec<Range<usize>> = tokens
            .iter()
            .filter_map(|t| self.span(t.id))
            .collect();

        let leading = &text[..spans[0].start];
        let mut pieces: Vec<Piece> = spans
            .iter()
            .enumerate()
            .map(|(index, span)| {
                let next = spans.get(index + 1).map_or(text.len(), |s| s.start);
                Piece {
                    form: text[span.clone()].to_string(),
                    trailing: text[span.end..next].to_string(),
                }
            })
            .collect();
        let mut order: Vec<TokenId> = tokens.iter().map(|t| t.id).collect();

        for edit in edits {
            if self.token(edit.token()).is_none() {
                return Err(SentenceError::UnknownToken(edit.token()));
            }
            match edit {
                Edit::Replace { token, form } => pieces[token.index()].form = form.clone(),
                Edit::Move { token, before } => {
                    if self.token(*before).is_none() {
                        return Err(SentenceError::UnknownToken(*before));
                    }
                    let was_first = order.first() == Some(token);
                    order.retain(|id| id != token);
                    let at = order.iter().position(|id| id == before).unwrap_or(order.len());
                    order.insert(at, *token);
                    if was_first {
                        shift_capital(&mut pieces, *token, order[0]);
                    }
                }
            }
        }

        let mut rendered = String::from(leading);
        let mut target_spans = Vec::with_capacity(order.len());
        for id in &order {
            let piece = &pieces[id.index()];
            let start = rendered.len();
            rendered.push_str(&piece.form);
            target_spans.push(start..rendered.len());
            rendered.push_str(&piece.trailing);
        }

        let differs: Vec<bool> = order
            .iter()
            .enumerate()
            .map(|(position, id)| pieces[id.index()].form != text[spans[position].clone()])
            .collect();

        let mut altered = Vec::new();
        let mut position = 0;
        while position < differs.len() {
            if !differs[position] {
                position += 1;
                continue;
            }
            let start = position;
            while position + 1 < differs.len() && differs[position + 1] {
                position += 1;
            }
            altered.push(AlteredSpan {
                start: TokenId::from_index(start),
                end: TokenId::from_index(position),
                source: text[spans[start].start..spans[position].end].to_string(),
                target: rendered[target_spans[start].start..target_spans[position].end].to_string(),
            });
            position += 1;
        }

        Ok(Rendered {
            text: rendered,
            spans: altered,
        })
    }
}

/// A sentence-initial token moved elsewhere hands its capital to the new first token.
fn shift_capital(pieces: &mut [Piece], moved: TokenId, first: TokenId) {
    let moved_piece = &pieces[moved.index()].form;
    if !moved_piece.chars().next().is_some_and(char::is_uppercase) {
        return;
    }
    pieces[moved.index()].form = lower_first(&pieces[moved.index()].form);
    pieces[first.index()].form = upper_first(&pieces[first.index()].form);
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sentence;

    #[test]
    fn test_replace_yields_single_span() {
        let s = sentence(
            "Руками обхватила широкие плечи Окота.",
            &[
                ("Руками", "NOUN", 2, "obl"),
                ("обхватила", "VERB", 0, "root"),
                ("широкие", "ADJ", 4, "amod"),
                ("плечи", "NOUN", 2, "obj"),
                ("Окота", "PROPN", 4, "nmod"),
                (".", "PUNCT", 2, "punct"),
            ],
        );
        let rendered = s
            .render(&[Edit::Replace {
                token: TokenId(4),
                form: "плечники".to_string(),
            }])
            .unwrap();
        assert_eq!(rendered.text, "Руками обхватила широкие плечники Окота.");
        assert_eq!(rendered.spans.len(), 1);
        assert_eq!(rendered.spans[0].start, TokenId(4));
        assert_eq!(rendered.spans[0].source, "плечи");
        assert_eq!(rendered.spans[0].target, "плечники");
    }

    #[test]
    fn test_move_is_one_contiguous_span() {
        let s = sentence(
            "Не видел он никого там.",
            &[
                ("Не", "PART", 2, "advmod"),
                ("видел", "VERB", 0, "root"),
                ("он", "PRON", 2, "nsubj"),
                ("никого", "PRON", 2, "obj"),
                ("там", "ADV", 2, "advmod"),
                (".", "PUNCT", 2, "punct"),
            ],
        );
        let rendered = s
            .render(&[Edit::Move {
                token: TokenId(1),
                before: TokenId(5),
            }])
            .unwrap();
        assert_eq!(rendered.text, "Видел он никого не там.");
        assert_eq!(rendered.spans.len(), 1);
        assert_eq!(rendered.spans[0].start, TokenId(1));
        assert_eq!(rendered.spans[0].end, TokenId(4));
    }

    #[test]
    fn test_two_replacements_two_spans() {
        let s = sentence(
            "Кошка ловит мышь",
            &[
                ("Кошка", "NOUN", 2, "nsubj"),
                ("ловит", "VERB", 0, "root"),
                ("мышь", "NOUN", 2, "obj"),
            ],
        );
        let rendered = s
            .render(&[
                Edit::Replace { token: TokenId(1), form: "Мышь".to_string() },
                Edit::Replace { token: TokenId(3), form: "кошку".to_string() },
            ])
            .unwrap();
        assert_eq!(rendered.text, "Мышь ловит кошку");
        assert_eq!(rendered.spans.len(), 2);
        assert!(s
            .render(&[Edit::Replace { token: TokenId(9), form: String::new() }])
            .is_err());
    }
}
