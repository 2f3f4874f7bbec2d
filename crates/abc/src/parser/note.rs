//! Note token lexing using winnow combinators.
//!
//! A note token is an accidental run, a letter, octave marks and a duration
//! suffix. Both the note extractor and the transposer read notes through
//! [`parse_note_token`], so they always agree on where a note starts and
//! ends.

use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::ast::{Accidental, NoteName, Pitch};

type PResult<T> = winnow::ModalResult<T>;

/// A note or rest as written, borrowed from the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteToken<'a> {
    /// Zero or more of `^`, `_`, `=`
    pub accidentals: &'a str,
    /// `A-G`, `a-g`, or a rest letter (`z`, `Z`, `x`)
    pub letter: char,
    /// Zero or more of `,` and `'`
    pub octave_marks: &'a str,
    /// Length digits, `/`, and broken-rhythm `>` `<`
    pub duration: &'a str,
}

impl NoteToken<'_> {
    pub fn is_rest(&self) -> bool {
        is_rest_letter(self.letter)
    }

    pub fn note_name(&self) -> Option<NoteName> {
        if self.is_rest() {
            return None;
        }
        NoteName::from_char(self.letter)
    }

    /// The accidental spelled out on this note, if any.
    ///
    /// Repeated marks stack (`^^` is a double sharp); a `=` anywhere resets
    /// to natural and later marks apply on top of it.
    pub fn explicit_accidental(&self) -> Option<Accidental> {
        self.accidentals.chars().fold(None, |current, c| match (c, current) {
            ('^', Some(Accidental::Sharp | Accidental::DoubleSharp)) => {
                Some(Accidental::DoubleSharp)
            }
            ('^', _) => Some(Accidental::Sharp),
            ('_', Some(Accidental::Flat | Accidental::DoubleFlat)) => Some(Accidental::DoubleFlat),
            ('_', _) => Some(Accidental::Flat),
            _ => Some(Accidental::Natural),
        })
    }

    /// Written octave: uppercase is 4, lowercase 5, each `'` up and `,` down.
    /// Saturates at the ends of `i8` for absurd runs of marks.
    pub fn octave(&self) -> i8 {
        let base: i8 = if self.letter.is_ascii_lowercase() { 5 } else { 4 };
        self.octave_marks.chars().fold(base, |octave, c| match c {
            '\'' => octave.saturating_add(1),
            _ => octave.saturating_sub(1),
        })
    }

    /// The pitch this token sounds with the given effective accidental.
    pub fn pitch(&self, accidental: Option<Accidental>) -> Option<Pitch> {
        let letter = self.note_name()?;
        Some(Pitch::new(letter, accidental, self.octave()))
    }
}

pub fn is_note_letter(c: char) -> bool {
    matches!(c, 'A'..='G' | 'a'..='g')
}

pub fn is_rest_letter(c: char) -> bool {
    matches!(c, 'z' | 'Z' | 'x')
}

/// Characters that can open a note token
pub fn starts_note(c: char) -> bool {
    matches!(c, '^' | '_' | '=') || is_note_letter(c) || is_rest_letter(c)
}

pub fn parse_accidentals<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(0.., ['^', '_', '=']).parse_next(input)
}

pub fn parse_letter(input: &mut &str) -> PResult<char> {
    one_of(|c: char| is_note_letter(c) || is_rest_letter(c)).parse_next(input)
}

pub fn parse_octave_marks<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(0.., [',', '\'']).parse_next(input)
}

pub fn parse_duration<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(0.., |c: char| c.is_ascii_digit() || matches!(c, '/' | '>' | '<'))
        .parse_next(input)
}

/// Parse one complete note or rest token
pub fn parse_note_token<'a>(input: &mut &'a str) -> PResult<NoteToken<'a>> {
    let accidentals = parse_accidentals(input)?;
    let letter = parse_letter(input)?;
    let octave_marks = parse_octave_marks(input)?;
    let duration = parse_duration(input)?;

    Ok(NoteToken {
        accidentals,
        letter,
        octave_marks,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_note() {
        let mut input = "A2 B";
        let token = parse_note_token(&mut input).unwrap();

        assert_eq!(token.letter, 'A');
        assert_eq!(token.accidentals, "");
        assert_eq!(token.duration, "2");
        assert_eq!(input, " B");
    }

    #[test]
    fn test_parse_full_token() {
        let mut input = "^^c',3/2>d";
        let token = parse_note_token(&mut input).unwrap();

        assert_eq!(token.accidentals, "^^");
        assert_eq!(token.letter, 'c');
        assert_eq!(token.octave_marks, "',");
        assert_eq!(token.duration, "3/2>");
        assert_eq!(input, "d");
    }

    #[test]
    fn test_explicit_accidentals() {
        let read = |s: &str| {
            let mut input = s;
            parse_note_token(&mut input).unwrap().explicit_accidental()
        };

        assert_eq!(read("F"), None);
        assert_eq!(read("^F"), Some(Accidental::Sharp));
        assert_eq!(read("^^F"), Some(Accidental::DoubleSharp));
        assert_eq!(read("_B"), Some(Accidental::Flat));
        assert_eq!(read("__B"), Some(Accidental::DoubleFlat));
        assert_eq!(read("=F"), Some(Accidental::Natural));
        assert_eq!(read("=^F"), Some(Accidental::Sharp));
    }

    #[test]
    fn test_octave() {
        let octave = |s: &str| {
            let mut input = s;
            parse_note_token(&mut input).unwrap().octave()
        };

        assert_eq!(octave("C"), 4);
        assert_eq!(octave("c"), 5);
        assert_eq!(octave("C,,"), 2);
        assert_eq!(octave("c''"), 7);
    }

    #[test]
    fn test_octave_saturates_on_long_mark_runs() {
        let octave = |s: &str| {
            let mut input = s;
            parse_note_token(&mut input).unwrap().octave()
        };

        let high = format!("c{}", "'".repeat(300));
        let low = format!("C{}", ",".repeat(300));
        assert_eq!(octave(&high), i8::MAX);
        assert_eq!(octave(&low), i8::MIN);
    }

    #[test]
    fn test_rest_token() {
        let mut input = "z4";
        let token = parse_note_token(&mut input).unwrap();

        assert!(token.is_rest());
        assert_eq!(token.note_name(), None);
        assert_eq!(token.pitch(None), None);
    }

    #[test]
    fn test_accidental_without_letter_fails() {
        let mut input = "^ |";
        assert!(parse_note_token(&mut input).is_err());
    }
}
