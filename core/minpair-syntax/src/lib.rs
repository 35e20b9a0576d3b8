pub mod render;
pub mod systems;

use std::ops::Range;

use minpair_protocol::{DepRel, Token, TokenId};
use thiserror::Error;
use tracing::debug;

pub use render::{Edit, Rendered};
pub use systems::agreement::{check_agreement, AgreementMismatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentenceError {
    #[error("malformed sentence {sentence_id}: {reason}")]
    Malformed { sentence_id: String, reason: String },
    #[error("edit references token {0} outside the sentence")]
    UnknownToken(TokenId),
}

/// Immutable dependency-annotated sentence. Tokens live in an arena indexed by
/// `TokenId::index()`; the children index is built once.
#[derive(Debug, Clone)]
pub struct AnnotatedSentence {
    id: String,
    text: String,
    domain: Option<String>,
    tokens: Vec<Token>,
    spans: Vec<Range<usize>>,
    children: Vec<Vec<TokenId>>,
    root: TokenId,
}

impl AnnotatedSentence {
    /// Validates the tree (sequential ids, heads in range, single root, no cycles)
    /// and aligns every token to a byte span of `text`. When the forms cannot be
    /// found in `text` in order, the text is rebuilt from the tokens.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        domain: Option<String>,
        tokens: Vec<Token>,
    ) -> Result<Self, SentenceError> {
        let id = id.into();
        let malformed = |reason: String| SentenceError::Malformed {
            sentence_id: id.clone(),
            reason,
        };

        if tokens.is_empty() {
            return Err(malformed("no tokens".to_string()));
        }

        let mut root = None;
        let mut children = vec![Vec::new(); tokens.len()];
        for (index, token) in tokens.iter().enumerate() {
            if token.id != TokenId::from_index(index) {
                return Err(malformed(format!(
                    "token {} found at position {}",
                    token.id,
                    index + 1
                )));
            }
            match token.head {
                None => {
                    if let Some(existing) = root {
                        return Err(malformed(format!(
                            "two roots: {existing} and {}",
                            token.id
                        )));
                    }
                    root = Some(token.id);
                }
                Some(head) => {
                    if head.0 == 0 || head.index() >= tokens.len() {
                        return Err(malformed(format!(
                            "head {head} of token {} out of range",
                            token.id
                        )));
                    }
                    if head == token.id {
                        return Err(malformed(format!("token {} heads itself", token.id)));
                    }
                    children[head.index()].push(token.id);
                }
            }
        }
        let root = root.ok_or_else(|| malformed("no root".to_string()))?;

        // Every chain of heads must reach the root within n steps.
        for token in &tokens {
            let mut current = token.head;
            let mut steps = 0;
            while let Some(head) = current {
                steps += 1;
                if steps > tokens.len() {
                    return Err(malformed(format!("cycle through token {}", token.id)));
                }
                current = tokens[head.index()].head;
            }
        }

        let mut text = text.into();
        let spans = match align(&text, &tokens) {
            Some(spans) => spans,
            None => {
                debug!(sentence = %id, "forms do not align with text, rebuilding");
                text = plain_text(&tokens);
                align(&text, &tokens).ok_or_else(|| malformed("unalignable tokens".to_string()))?
            }
        };

        Ok(Self {
            id,
            text,
            domain,
            tokens,
            spans,
            children,
            root,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn root(&self) -> &Token {
        &self.tokens[self.root.index()]
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        if id.0 == 0 {
            return None;
        }
        self.tokens.get(id.index())
    }

    /// Byte range of the token in [`text`](Self::text).
    pub fn span(&self, id: TokenId) -> Option<Range<usize>> {
        if id.0 == 0 {
            return None;
        }
        self.spans.get(id.index()).cloned()
    }

    pub fn head(&self, id: TokenId) -> Option<&Token> {
        self.token(id)?.head.and_then(|head| self.token(head))
    }

    pub fn dependents(&self, id: TokenId) -> impl Iterator<Item = &Token> + '_ {
        self.children_of(id)
            .iter()
            .map(move |child| &self.tokens[child.index()])
    }

    pub fn dependents_by<'a>(
        &'a self,
        id: TokenId,
        rel: &'a DepRel,
    ) -> impl Iterator<Item = &'a Token> + 'a {
        self.dependents(id).filter(move |t| &t.deprel == rel)
    }

    pub fn has_dependent(&self, id: TokenId, predicate: impl Fn(&Token) -> bool) -> bool {
        self.dependents(id).any(predicate)
    }

    /// Nominal modifiers that would have to be re-inflected along with the token.
    pub fn has_modifier(&self, id: TokenId) -> bool {
        self.has_dependent(id, |t| t.deprel.is_modifier())
    }

    /// Other dependents of the same head.
    pub fn siblings(&self, id: TokenId) -> impl Iterator<Item = &Token> + '_ {
        let head = self.token(id).and_then(|t| t.head);
        head.into_iter()
            .flat_map(move |head| self.dependents(head))
            .filter(move |t| t.id != id)
    }

    /// Heads from the token's parent up to the root.
    pub fn ancestors(&self, id: TokenId) -> Vec<TokenId> {
        let mut chain = Vec::new();
        let mut current = self.token(id).and_then(|t| t.head);
        while let Some(head) = current {
            chain.push(head);
            current = self.tokens[head.index()].head;
        }
        chain
    }

    pub fn dominates(&self, ancestor: TokenId, id: TokenId) -> bool {
        ancestor == id || self.ancestors(id).contains(&ancestor)
    }

    /// Tokens on the dependency path from `from` to `to`, both ends included.
    pub fn path(&self, from: TokenId, to: TokenId) -> Vec<TokenId> {
        let mut up: Vec<TokenId> = std::iter::once(from).chain(self.ancestors(from)).collect();
        let down: Vec<TokenId> = std::iter::once(to).chain(self.ancestors(to)).collect();
        let Some(meet) = up.iter().position(|id| down.contains(id)) else {
            return Vec::new();
        };
        let common = up[meet];
        up.truncate(meet + 1);
        let descent = down.iter().position(|id| *id == common).unwrap_or(0);
        up.extend(down[..descent].iter().rev());
        up
    }

    /// Number of arcs between two tokens.
    pub fn tree_distance(&self, from: TokenId, to: TokenId) -> Option<u32> {
        let path = self.path(from, to);
        (!path.is_empty()).then(|| path.len() as u32 - 1)
    }

    /// Count of tokens that have at least one dependent.
    pub fn tree_depth(&self) -> u32 {
        self.children.iter().filter(|c| !c.is_empty()).count() as u32
    }

    /// The token and everything it dominates, in sentence order.
    pub fn constituent(&self, id: TokenId) -> Vec<TokenId> {
        let mut stack = vec![id];
        let mut members = Vec::new();
        while let Some(current) = stack.pop() {
            members.push(current);
            stack.extend(self.children_of(current).iter().copied());
        }
        members.sort();
        members
    }

    /// Strictly between `a` and `b` in linear order, whichever comes first.
    pub fn is_between(&self, id: TokenId, a: TokenId, b: TokenId) -> bool {
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        low < id && id < high
    }

    /// The next token in linear order.
    pub fn next(&self, id: TokenId) -> Option<&Token> {
        self.token(TokenId(id.0 + 1))
    }

    pub fn previous(&self, id: TokenId) -> Option<&Token> {
        self.token(TokenId(id.0.checked_sub(1)?))
    }

    fn children_of(&self, id: TokenId) -> &[TokenId] {
        if id.0 == 0 {
            return &[];
        }
        self.children
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn align(text: &str, tokens: &[Token]) -> Option<Vec<Range<usize>>> {
    let mut cursor = 0;
    let mut spans = Vec::with_capacity(tokens.len());
    for token in tokens {
        let rest = &text[cursor..];
        let skipped = rest.len() - rest.trim_start().len();
        let start = cursor + skipped;
        if !text[start..].starts_with(token.form.as_str()) {
            return None;
        }
        let end = start + token.form.len();
        spans.push(start..end);
        cursor = end;
    }
    Some(spans)
}

fn plain_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for (index, token) in tokens.iter().enumerate() {
        text.push_str(&token.form);
        if token.space_after && index + 1 < tokens.len() {
            text.push(' ');
        }
    }
    text
}

#[cfg(test)]
pub(crate) mod testing {
    use minpair_protocol::{MorphFlags, PartOfSpeech};

    use super::*;

    /// `(form, upos, head, deprel)`; head 0 is the root.
    pub fn sentence(text: &str, rows: &[(&str, &str, u32, &str)]) -> AnnotatedSentence {
        let tokens = rows
            .iter()
            .enumerate()
            .map(|(index, (form, upos, head, deprel))| Token {
                id: TokenId::from_index(index),
                form: form.to_string(),
                lemma: form.to_lowercase(),
                upos: PartOfSpeech::from_ud(upos).unwrap_or(PartOfSpeech::Other),
                features: MorphFlags::empty(),
                head: (*head != 0).then_some(TokenId(*head)),
                deprel: DepRel::from_label(deprel),
                space_after: true,
            })
            .collect();
        AnnotatedSentence::new("s1", text, None, tokens).expect("valid tree")
    }
}
