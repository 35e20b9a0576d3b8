pub mod parser;

use minpair_protocol::{DepRel, MorphFlags, PartOfSpeech, Token, TokenId};
use minpair_syntax::{AnnotatedSentence, SentenceError};
use thiserror::Error;
use tracing::debug;

use crate::parser::{parse_line, Line, Row, RowId};

#[derive(Debug, Error)]
pub enum ConlluError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: unknown UPOS tag {tag:?}")]
    UnknownUpos { line: usize, tag: String },
    #[error(transparent)]
    Malformed(#[from] SentenceError),
}

impl ConlluError {
    /// Tree-level problems concern one sentence; the reader can still move past it.
    pub fn is_sentence_local(&self) -> bool {
        matches!(self, ConlluError::Malformed(_))
    }
}

/// Streams sentences out of a CoNLL-U document.
pub struct Reader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    domain: Option<String>,
    count: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str, domain: Option<String>) -> Self {
        Self {
            lines: input.lines().enumerate(),
            domain,
            count: 0,
        }
    }
}

#[derive(Default)]
struct Block {
    id: Option<String>,
    text: Option<String>,
    domain: Option<String>,
    tokens: Vec<Token>,
}

impl<'a> Iterator for Reader<'a> {
    type Item = Result<AnnotatedSentence, ConlluError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = Block::default();
        let mut started = false;

        for (index, raw) in self.lines.by_ref() {
            let line = index + 1;
            let parsed = match parse_line(raw) {
                Ok((_, parsed)) => parsed,
                Err(e) => {
                    return Some(Err(ConlluError::Syntax {
                        line,
                        message: e.to_string(),
                    }))
                }
            };
            match parsed {
                Line::Blank if started => break,
                Line::Blank => {}
                Line::Comment { key, value } => {
                    started = true;
                    match key {
                        Some("sent_id") => block.id = Some(value.to_string()),
                        Some("text") => block.text = Some(value.to_string()),
                        Some("domain") | Some("genre") => block.domain = Some(value.to_string()),
                        _ => {}
                    }
                }
                Line::Row(row) => {
                    started = true;
                    match token_from_row(&row, line) {
                        Ok(Some(token)) => block.tokens.push(token),
                        Ok(None) => {}
                        Err(e) => return Some(Err(e)),
                    }
                }
            }
        }

        if !started {
            return None;
        }
        self.count += 1;
        let id = block.id.unwrap_or_else(|| self.count.to_string());
        debug!(sentence = %id, tokens = block.tokens.len(), "read sentence");
        Some(
            AnnotatedSentence::new(
                id,
                block.text.unwrap_or_default(),
                block.domain.or_else(|| self.domain.clone()),
                block.tokens,
            )
            .map_err(ConlluError::from),
        )
    }
}

fn token_from_row(row: &Row<'_>, line: usize) -> Result<Option<Token>, ConlluError> {
    let RowId::Word(id) = row.id else {
        return Ok(None);
    };
    let upos = PartOfSpeech::from_ud(row.upos).ok_or_else(|| ConlluError::UnknownUpos {
        line,
        tag: row.upos.to_string(),
    })?;
    let features = row
        .feats
        .iter()
        .filter_map(|(feature, value)| MorphFlags::from_ud(feature, value))
        .fold(MorphFlags::empty(), |acc, flag| acc | flag);
    let head = match row.head {
        Some(0) | None => None,
        Some(head) => Some(TokenId(head)),
    };
    let lemma = if row.lemma == "_" { row.form } else { row.lemma };

    Ok(Some(Token {
        id: TokenId(id),
        form: row.form.to_string(),
        lemma: lemma.to_string(),
        upos,
        features,
        head,
        deprel: DepRel::from_label(row.deprel),
        space_after: row.space_after(),
    }))
}

/// Reads a whole document; the first error aborts.
pub fn read_document(input: &str, domain: Option<String>) -> Result<Vec<AnnotatedSentence>, ConlluError> {
    Reader::new(input, domain).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# sent_id = 1
# text = Руками обхватила широкие плечи Окота.
1\tРуками\tрука\tNOUN\t_\tAnimacy=Inan|Case=Ins|Gender=Fem|Number=Plur\t2\tobl\t_\t_
2\tобхватила\tобхватить\tVERB\t_\tAspect=Perf|Gender=Fem|Mood=Ind|Number=Sing|Tense=Past|VerbForm=Fin|Voice=Act\t0\troot\t_\t_
3\tширокие\tширокий\tADJ\t_\tAnimacy=Inan|Case=Acc|Degree=Pos|Number=Plur\t4\tamod\t_\t_
4\tплечи\tплечо\tNOUN\t_\tAnimacy=Inan|Case=Acc|Gender=Neut|Number=Plur\t2\tobj\t_\t_
5\tОкота\tОкот\tPROPN\t_\tAnimacy=Anim|Case=Gen|Gender=Masc|Number=Sing\t4\tnmod\t_\tSpaceAfter=No
6\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_

# sent_id = 2
1\tДа\tда\tINTJ\t_\t_\t0\troot\t_\tSpaceAfter=No
2\t!\t!\tPUNCT\t_\t_\t1\tpunct\t_\t_
";

    #[test]
    fn test_reads_sentences() {
        let sentences = read_document(DOC, Some("fiction".to_string())).unwrap();
        assert_eq!(sentences.len(), 2);

        let first = &sentences[0];
        assert_eq!(first.id(), "1");
        assert_eq!(first.domain(), Some("fiction"));
        assert_eq!(first.root().lemma, "обхватить");
        let plechi = first.token(TokenId(4)).unwrap();
        assert!(plechi.has(MorphFlags::ACCUSATIVE | MorphFlags::PLURAL | MorphFlags::NEUTER));
        assert!(!first.token(TokenId(5)).unwrap().space_after);

        assert_eq!(sentences[1].text(), "Да!");
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let broken = "# sent_id = 1\n1\tслово\n";
        let err = read_document(broken, None).unwrap_err();
        assert!(matches!(err, ConlluError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_malformed_tree_names_sentence() {
        let doc = "\
# sent_id = bad
1\tа\tа\tCCONJ\t_\t_\t0\troot\t_\t_
2\tб\tб\tCCONJ\t_\t_\t0\troot\t_\t_

# sent_id = good
1\tДа\tда\tINTJ\t_\t_\t0\troot\t_\t_
";
        let results: Vec<_> = Reader::new(doc, None).collect();
        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().unwrap_err();
        assert!(err.is_sentence_local());
        assert!(matches!(err, ConlluError::Malformed(_)));
        assert!(err.to_string().contains("bad"));
        assert!(results[1].is_ok());
    }
}
