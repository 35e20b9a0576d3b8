use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_while1},
    character::complete::{char, space0, u32 as decimal},
    combinator::{all_consuming, map, rest, value},
    multi::separated_list1,
    sequence::{preceded, separated_pair, tuple},
    IResult,
};

/// Column 1 of a CoNLL-U row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowId {
    Word(u32),
    /// Multiword token range such as `3-4`; its words follow as separate rows.
    Range(u32, u32),
    /// Enhanced-dependency empty node such as `5.1`.
    Empty(u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub id: RowId,
    pub form: &'a str,
    pub lemma: &'a str,
    pub upos: &'a str,
    pub feats: Vec<(&'a str, &'a str)>,
    pub head: Option<u32>,
    pub deprel: &'a str,
    pub misc: Vec<&'a str>,
}

impl Row<'_> {
    pub fn space_after(&self) -> bool {
        !self.misc.iter().any(|item| *item == "SpaceAfter=No")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    /// `# key = value`; free comments have no key.
    Comment { key: Option<&'a str>, value: &'a str },
    Row(Row<'a>),
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == '\t')(input)
}

fn tab(input: &str) -> IResult<&str, char> {
    char('\t')(input)
}

fn row_id(input: &str) -> IResult<&str, RowId> {
    alt((
        map(separated_pair(decimal, char('-'), decimal), |(a, b)| RowId::Range(a, b)),
        map(separated_pair(decimal, char('.'), decimal), |(a, b)| RowId::Empty(a, b)),
        map(decimal, RowId::Word),
    ))(input)
}

fn features(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    alt((
        value(Vec::new(), char('_')),
        separated_list1(
            char('|'),
            separated_pair(
                take_while1(|c| c != '=' && c != '|' && c != '\t'),
                char('='),
                take_while1(|c| c != '|' && c != '\t'),
            ),
        ),
    ))(input)
}

fn head(input: &str) -> IResult<&str, Option<u32>> {
    alt((value(None, char('_')), map(decimal, Some)))(input)
}

fn misc(input: &str) -> IResult<&str, Vec<&str>> {
    alt((
        value(Vec::new(), tag("_")),
        separated_list1(char('|'), take_till1(|c| c == '|')),
    ))(input)
}

fn row(input: &str) -> IResult<&str, Row<'_>> {
    let (input, (id, _, form, _, lemma, _, upos, _, _xpos, _, feats, _, head, _, deprel, _, _deps, _)) =
        tuple((
            row_id, tab, field, tab, field, tab, field, tab, field, tab, features, tab, head, tab,
            field, tab, field, tab,
        ))(input)?;
    let (input, misc) = all_consuming(misc)(input)?;
    Ok((
        input,
        Row {
            id,
            form,
            lemma,
            upos,
            feats,
            head,
            deprel,
            misc,
        },
    ))
}

fn comment(input: &str) -> IResult<&str, Line<'_>> {
    let (input, body) = preceded(char('#'), rest)(input)?;
    let keyed: IResult<&str, (&str, &str)> = separated_pair(
        preceded(space0, take_till(|c: char| c == '=' || c.is_whitespace())),
        tuple((space0, char('='), space0)),
        rest,
    )(body);
    let line = match keyed {
        Ok((_, (key, value))) if !key.is_empty() => Line::Comment {
            key: Some(key),
            value: value.trim_end(),
        },
        _ => Line::Comment {
            key: None,
            value: body.trim(),
        },
    };
    Ok((input, line))
}

/// Parses one line without its terminator.
pub fn parse_line(line: &str) -> IResult<&str, Line<'_>> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return Ok(("", Line::Blank));
    }
    alt((comment, map(row, Line::Row)))(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_row() {
        let (_, line) =
            parse_line("2\tплечи\tплечо\tNOUN\t_\tAnimacy=Inan|Case=Acc|Number=Plur\t4\tobj\t_\tSpaceAfter=No")
                .unwrap();
        let Line::Row(row) = line else {
            panic!("expected a row");
        };
        assert_eq!(row.id, RowId::Word(2));
        assert_eq!(row.lemma, "плечо");
        assert_eq!(row.feats.len(), 3);
        assert_eq!(row.feats[1], ("Case", "Acc"));
        assert_eq!(row.head, Some(4));
        assert!(!row.space_after());
    }

    #[test]
    fn test_special_rows() {
        let (_, line) = parse_line("3-4\tсо\t_\t_\t_\t_\t_\t_\t_\t_").unwrap();
        assert!(matches!(line, Line::Row(Row { id: RowId::Range(3, 4), .. })));
        let (_, line) = parse_line("5.1\tбыл\tбыть\tAUX\t_\t_\t_\t_\t4:cop\t_").unwrap();
        assert!(matches!(line, Line::Row(Row { id: RowId::Empty(5, 1), head: None, .. })));
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            parse_line("# sent_id = 42").unwrap().1,
            Line::Comment { key: Some("sent_id"), value: "42" }
        );
        assert_eq!(
            parse_line("# text = Он не пришёл.").unwrap().1,
            Line::Comment { key: Some("text"), value: "Он не пришёл." }
        );
        assert_eq!(
            parse_line("# newdoc").unwrap().1,
            Line::Comment { key: None, value: "newdoc" }
        );
        assert_eq!(parse_line("   ").unwrap().1, Line::Blank);
    }

    #[test]
    fn test_bad_rows() {
        assert!(parse_line("x\tслово").is_err());
        assert!(parse_line("1\tслово\tслово\tNOUN\t_\tCase\t0\troot\t_\t_").is_err());
    }
}
