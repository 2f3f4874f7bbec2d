//! Tune body lexing.
//!
//! [`Lexer`] splits one body line into lexemes. Every byte of the line ends
//! up in exactly one lexeme, so concatenating their text gives the line back.
//! The note extractor ignores most lexemes; the transposer rewrites a few
//! and copies the rest.

use super::note::{parse_note_token, starts_note, NoteToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Space,
    /// `|`, `||`, `:|`, `|:`, `::`, `|]`, `[|` ...
    Barline,
    /// Text between double quotes
    ChordSymbol(&'a str),
    /// `!trill!` or `+fermata+`
    Decoration,
    /// A quote or decoration with no closing delimiter; runs to end of line
    Unterminated(char),
    GraceOpen,
    GraceClose,
    /// `[1`, `[2`, `[1,3`, `[1-2`
    Volta,
    /// `[K:G]`, `[M:3/4]`
    InlineField { name: char, value: &'a str },
    ChordOpen,
    ChordClose,
    /// `(3` or `(3:2:3`
    Tuplet,
    Note(NoteToken<'a>),
    /// `%` to end of line
    Comment,
    /// Slurs, ties, and anything else not listed above
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub text: &'a str,
    /// 1-based column of the first character
    pub column: usize,
}

/// Lexer over a single body line.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    line: &'a str,
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(line: &'a str) -> Self {
        Lexer { line, rest: line }
    }

    fn lex(&self) -> Option<(Token<'a>, usize)> {
        let rest = self.rest;
        let mut chars = rest.chars();
        let c = chars.next()?;
        let next = chars.next();

        let lexed = match c {
            c if c.is_whitespace() => (Token::Space, run_len(rest, char::is_whitespace)),
            '%' => (Token::Comment, rest.len()),
            '|' | ':' => (Token::Barline, barline_len(rest, 1)),
            '[' if next == Some('|') => (Token::Barline, barline_len(rest, 2)),
            '[' if next.is_some_and(|n| n.is_ascii_digit()) => (
                Token::Volta,
                1 + run_len(&rest[1..], |c| c.is_ascii_digit() || matches!(c, ',' | '-')),
            ),
            '[' => match inline_field(rest) {
                Some((name, value, len)) => (Token::InlineField { name, value }, len),
                None => (Token::ChordOpen, 1),
            },
            ']' => (Token::ChordClose, 1),
            '"' => match rest[1..].find('"') {
                Some(end) => (Token::ChordSymbol(&rest[1..1 + end]), end + 2),
                None => (Token::Unterminated('"'), rest.len()),
            },
            '!' | '+' => match rest[1..].find(c) {
                Some(end) => (Token::Decoration, end + 2),
                None => (Token::Unterminated(c), rest.len()),
            },
            '{' => (Token::GraceOpen, 1),
            '}' => (Token::GraceClose, 1),
            '(' if next.is_some_and(|n| n.is_ascii_digit()) => (Token::Tuplet, tuplet_len(rest)),
            c if starts_note(c) => {
                let mut probe = rest;
                match parse_note_token(&mut probe) {
                    Ok(note) => (Token::Note(note), rest.len() - probe.len()),
                    // A stray accidental run with no letter after it
                    Err(_) => (Token::Other, run_len(rest, |c| matches!(c, '^' | '_' | '='))),
                }
            }
            c => (Token::Other, c.len_utf8()),
        };
        Some(lexed)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (token, len) = self.lex()?;
        let column = self.line.len() - self.rest.len() + 1;
        let (text, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(Lexeme {
            token,
            text,
            column,
        })
    }
}

/// Byte length of the leading run of characters matching `pred`
fn run_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.find(|c: char| !pred(c)).unwrap_or(s.len())
}

/// A barline starts with `start` bytes already claimed and absorbs any
/// following `|`, `:` and `]`.
fn barline_len(s: &str, start: usize) -> usize {
    start + run_len(&s[start..], |c| matches!(c, '|' | ':' | ']'))
}

/// `(3`, `(3:2`, `(3:2:3`
fn tuplet_len(s: &str) -> usize {
    1 + run_len(&s[1..], |c| c.is_ascii_digit() || c == ':')
}

/// `[X:value]` where X is a letter. Returns name, value and total length.
fn inline_field(s: &str) -> Option<(char, &str, usize)> {
    let mut chars = s[1..].chars();
    let name = chars.next().filter(char::is_ascii_alphabetic)?;
    if chars.next() != Some(':') {
        return None;
    }
    let end = s.find(']')?;
    Some((name, &s[3..end], end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<(Token<'_>, &str)> {
        Lexer::new(line).map(|l| (l.token, l.text)).collect()
    }

    fn texts(line: &str) -> Vec<&str> {
        Lexer::new(line).map(|l| l.text).collect()
    }

    #[test]
    fn test_lexemes_cover_line() {
        let line = "|:\"Am\"A2B c/d/e {g}f!trill!g | [CEG]2 (3abc [1 z4 :|2 ^^F,3/ %end";
        assert_eq!(texts(line).concat(), line);
    }

    #[test]
    fn test_barlines() {
        let tokens: Vec<_> = Lexer::new("|: A :|: B || c |] [| d")
            .filter(|l| l.token == Token::Barline)
            .map(|l| l.text)
            .collect();

        assert_eq!(tokens, vec!["|:", ":|:", "||", "|]", "[|"]);
    }

    #[test]
    fn test_chord_symbol_and_decoration() {
        assert_eq!(
            kinds("\"G/B\"!roll!"),
            vec![(Token::ChordSymbol("G/B"), "\"G/B\""), (Token::Decoration, "!roll!")]
        );
    }

    #[test]
    fn test_unterminated_runs_to_end() {
        assert_eq!(kinds("\"Am A B"), vec![(Token::Unterminated('"'), "\"Am A B")]);
    }

    #[test]
    fn test_volta_and_inline_field() {
        assert_eq!(
            kinds("[1,3[K:G]"),
            vec![
                (Token::Volta, "[1,3"),
                (Token::InlineField { name: 'K', value: "G" }, "[K:G]"),
            ]
        );
    }

    #[test]
    fn test_chord_brackets() {
        let tokens: Vec<_> = Lexer::new("[CEG]").map(|l| l.token).collect();

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0], Token::ChordOpen);
        assert!(matches!(tokens[1], Token::Note(n) if n.letter == 'C'));
        assert_eq!(tokens[4], Token::ChordClose);
    }

    #[test]
    fn test_tuplet_colons_are_not_barlines() {
        assert_eq!(texts("(3:2:3abc"), vec!["(3:2:3", "a", "b", "c"]);
    }

    #[test]
    fn test_stray_accidental() {
        let lexemes: Vec<_> = Lexer::new("^ A").collect();

        assert_eq!(lexemes[0].token, Token::Other);
        assert_eq!(lexemes[0].text, "^");
        assert_eq!(lexemes[1].token, Token::Space);
        assert!(matches!(lexemes[2].token, Token::Note(n) if n.letter == 'A'));
    }

    #[test]
    fn test_columns() {
        let columns: Vec<_> = Lexer::new("A B").map(|l| l.column).collect();
        assert_eq!(columns, vec![1, 2, 3]);
    }
}
