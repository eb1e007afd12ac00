//! Field Extraction for DICT Response Lines
//!
//! DICT replies put human-readable values in double quotes and short
//! identifiers (database and strategy names) as bare tokens:
//!
//! ```text
//! 151 "cat" wn "WordNet (r) 3.0 (2006)"
//! wn "WordNet (r) 3.0 (2006)"
//! exact "Match headwords exactly"
//! ```
//!
//! Inside quotes a backslash escapes the next character, so `"say \"hi\""`
//! reads as `say "hi"`. Fields without escapes are borrowed from the line.
//!
//! Everything here is stateless. None of it fails on odd input: a line
//! without fields yields nothing, and an unclosed quote simply ends the scan.

use std::borrow::Cow;

/// A single token of a response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<'a> {
    /// Text that was enclosed in double quotes, without the quotes.
    Quoted(Cow<'a, str>),
    /// A run of non-space characters outside quotes.
    Bare(&'a str),
}

impl<'a> Field<'a> {
    pub fn as_str(&self) -> &str {
        match self {
            Field::Quoted(s) => s.as_ref(),
            Field::Bare(s) => *s,
        }
    }

    pub fn into_text(self) -> Cow<'a, str> {
        match self {
            Field::Quoted(s) => s,
            Field::Bare(s) => Cow::Borrowed(s),
        }
    }
}

/// Reads a quoted string whose opening quote is already consumed.
///
/// Returns the unescaped text and what follows the closing quote, or `None`
/// for the remainder when the quote is never closed.
fn read_quoted(after_open: &str) -> (Cow<'_, str>, Option<&str>) {
    let mut unescaped: Option<String> = None;
    let mut chars = after_open.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                let text = match unescaped {
                    Some(text) => Cow::Owned(text),
                    None => Cow::Borrowed(&after_open[..i]),
                };
                return (text, Some(&after_open[i + 1..]));
            }
            '\\' => {
                let text = unescaped.get_or_insert_with(|| after_open[..i].to_string());
                if let Some((_, escaped)) = chars.next() {
                    text.push(escaped);
                }
            }
            _ => {
                if let Some(text) = unescaped.as_mut() {
                    text.push(c);
                }
            }
        }
    }

    let text = match unescaped {
        Some(text) => Cow::Owned(text),
        None => Cow::Borrowed(after_open),
    };
    (text, None)
}

/// Returns every double-quoted substring of `line`, left to right.
///
/// Text outside quotes is ignored. An opening quote with no closing partner
/// is dropped.
///
/// # Example
///
/// ```
/// use dictwire::protocol::fields::quoted_fields;
///
/// let fields = quoted_fields(r#"151 "cat" wn "WordNet""#);
/// assert_eq!(fields, vec!["cat", "WordNet"]);
/// assert!(quoted_fields("250 ok").is_empty());
/// ```
pub fn quoted_fields(line: &str) -> Vec<Cow<'_, str>> {
    let mut fields = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find('"') {
        match read_quoted(&rest[open + 1..]) {
            (text, Some(after_close)) => {
                fields.push(text);
                rest = after_close;
            }
            (_, None) => break,
        }
    }

    fields
}

/// Returns the text from the start of `line` up to its first space.
///
/// Listing lines name a database or strategy this way before its quoted
/// description. A line without a space is returned whole; an empty line
/// yields `None`.
pub fn leading_token(line: &str) -> Option<&str> {
    let token = match line.find(' ') {
        Some(end) => &line[..end],
        None => line,
    };
    (!token.is_empty()).then_some(token)
}

/// Splits `line` into bare and quoted tokens, in order.
///
/// Whitespace outside quotes separates tokens. An unclosed quote turns the
/// remainder of the line into one quoted token.
pub fn tokens(line: &str) -> Vec<Field<'_>> {
    let mut fields = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if let Some(after_open) = rest.strip_prefix('"') {
            let (text, after_close) = read_quoted(after_open);
            fields.push(Field::Quoted(text));
            rest = after_close.unwrap_or_default();
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '"')
                .unwrap_or(rest.len());
            fields.push(Field::Bare(&rest[..end]));
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }

    fields
}

/// The parsed form of a `151` line that opens a definition block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionHeader<'a> {
    pub word: Cow<'a, str>,
    pub database: Cow<'a, str>,
    pub description: Option<Cow<'a, str>>,
}

/// Parses the text of a definition header after its status code:
/// `"<word>" <database> "<description>"`.
///
/// Returns `None` when the headword or the database is missing. Servers
/// that quote the database name are accepted too.
pub fn definition_header(text: &str) -> Option<DefinitionHeader<'_>> {
    let mut iter = tokens(text).into_iter();

    let word = match iter.next()? {
        Field::Quoted(word) => word,
        Field::Bare(_) => return None,
    };
    let database = iter.next()?.into_text();
    if database.is_empty() {
        return None;
    }
    let description = iter.next().map(Field::into_text);

    Some(DefinitionHeader {
        word,
        database,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_fields_in_order() {
        let line = r#"wn "cat" wn "cats" gcide "catapult""#;
        assert_eq!(quoted_fields(line), vec!["cat", "cats", "catapult"]);
    }

    #[test]
    fn test_quoted_fields_empty_line() {
        assert!(quoted_fields("").is_empty());
        assert!(quoted_fields(".").is_empty());
        assert!(quoted_fields("250 ok [d/m/c = 1/0/20; 0.000r 0.000u 0.000s]").is_empty());
    }

    #[test]
    fn test_quoted_fields_empty_quotes() {
        assert_eq!(quoted_fields(r#"x "" "y""#), vec!["", "y"]);
    }

    #[test]
    fn test_quoted_fields_unbalanced() {
        assert_eq!(quoted_fields(r#"wn "cat" "dangling"#), vec!["cat"]);
        assert!(quoted_fields(r#"""#).is_empty());
    }

    #[test]
    fn test_quoted_fields_non_ascii() {
        assert_eq!(quoted_fields(r#"fd-fra-eng "café""#), vec!["café"]);
    }

    #[test]
    fn test_quoted_fields_escapes() {
        assert_eq!(quoted_fields(r#"wn "say \"hi\"""#), vec![r#"say "hi""#]);
        assert_eq!(quoted_fields(r#"wn "back\\slash" "x""#), vec![r"back\slash", "x"]);
        assert!(matches!(quoted_fields(r#"wn "cat""#)[0], Cow::Borrowed("cat")));
    }

    #[test]
    fn test_escaped_quote_does_not_close() {
        assert!(quoted_fields(r#"wn "open \""#).is_empty());
        assert_eq!(
            tokens(r#"wn "a \" b" gcide"#),
            vec![
                Field::Bare("wn"),
                Field::Quoted(r#"a " b"#.into()),
                Field::Bare("gcide"),
            ]
        );
    }

    #[test]
    fn test_leading_token() {
        assert_eq!(leading_token(r#"wn "WordNet (r) 3.0""#), Some("wn"));
        assert_eq!(leading_token("prefix"), Some("prefix"));
        assert_eq!(leading_token(""), None);
        assert_eq!(leading_token(r#" "no name""#), None);
    }

    #[test]
    fn test_tokens_mixed() {
        let fields = tokens(r#"  "cat" wn  "WordNet (r) 3.0" "#);
        assert_eq!(
            fields,
            vec![
                Field::Quoted("cat".into()),
                Field::Bare("wn"),
                Field::Quoted("WordNet (r) 3.0".into()),
            ]
        );
        assert_eq!(fields[2].as_str(), "WordNet (r) 3.0");
    }

    #[test]
    fn test_tokens_unclosed_quote() {
        assert_eq!(
            tokens(r#"wn "open ended"#),
            vec![Field::Bare("wn"), Field::Quoted("open ended".into())]
        );
    }

    #[test]
    fn test_definition_header() {
        let header = definition_header(r#""cat" wn "WordNet""#).unwrap();
        assert_eq!(header.word, "cat");
        assert_eq!(header.database, "wn");
        assert_eq!(header.description.as_deref(), Some("WordNet"));
    }

    #[test]
    fn test_definition_header_multiword() {
        let header =
            definition_header(r#""New York" gcide "The Collaborative International Dictionary""#)
                .unwrap();
        assert_eq!(header.word, "New York");
        assert_eq!(header.database, "gcide");
    }

    #[test]
    fn test_definition_header_without_description() {
        let header = definition_header(r#""Cat" wn"#).unwrap();
        assert_eq!(header.word, "Cat");
        assert_eq!(header.database, "wn");
        assert_eq!(header.description, None);
    }

    #[test]
    fn test_definition_header_escaped_word() {
        let header = definition_header(r#""say \"hi\"" wn "WordNet""#).unwrap();
        assert_eq!(header.word, r#"say "hi""#);
        assert_eq!(header.database, "wn");
    }

    #[test]
    fn test_definition_header_malformed() {
        assert!(definition_header("").is_none());
        assert!(definition_header(r#""cat""#).is_none());
        assert!(definition_header(r#"cat wn "WordNet""#).is_none());
    }
}
