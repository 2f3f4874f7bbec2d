//! `K:` field parsing.
//!
//! Besides the [`Key`] itself this keeps the exact slices the value was
//! made of, so the transposer can swap the tonic and leave everything else
//! as the author wrote it.

use winnow::prelude::*;
use winnow::combinator::opt;
use winnow::token::{any, one_of, take_while};

use crate::ast::{Accidental, Key, Mode, NoteName};

type PResult<T> = winnow::ModalResult<T>;

/// A `K:` value split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyField<'a> {
    /// Whitespace before the tonic
    pub leading: &'a str,
    /// Tonic as written (`D`, `F#`, `bb`), empty if there was none
    pub tonic: &'a str,
    /// Mode text and anything after it, untouched
    pub rest: &'a str,
    pub key: Option<Key>,
}

impl KeyField<'_> {
    /// `K:` with nothing in it, or `K:none`
    pub fn is_blank(&self) -> bool {
        let rest = self.rest.trim();
        self.key.is_none() && (rest.is_empty() || rest.eq_ignore_ascii_case("none"))
    }
}

fn parse_tonic(input: &mut &str) -> PResult<(NoteName, Option<Accidental>)> {
    let root = any.verify_map(NoteName::from_char).parse_next(input)?;
    let accidental = opt(one_of(['#', 'b'])).parse_next(input)?;

    let accidental = accidental.map(|c| match c {
        '#' => Accidental::Sharp,
        _ => Accidental::Flat,
    });
    Ok((root, accidental))
}

fn parse_mode_word<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(0.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

/// Parse a K: field value (e.g. "G", "Am", "D dorian", "F#m", "Bbmix")
pub fn parse_key_field(value: &str) -> KeyField<'_> {
    let leading_len = value.len() - value.trim_start().len();
    let (leading, body) = value.split_at(leading_len);

    let mut input = body;
    let Ok((root, accidental)) = parse_tonic(&mut input) else {
        return KeyField {
            leading,
            tonic: "",
            rest: body,
            key: None,
        };
    };
    let tonic = &body[..body.len() - input.len()];
    let rest = input;

    // A tonic glued to more letters that are not a mode ("none", "HP") is
    // not a key at all.
    let mut word_input = rest.trim_start();
    let word = parse_mode_word(&mut word_input).unwrap_or("");
    let glued = !word.is_empty() && rest.len() == rest.trim_start().len();
    let is_setting = word_input.starts_with('=');

    let mode = if word.is_empty() || is_setting {
        Some(Mode::Major)
    } else {
        Mode::parse(word)
    };

    if mode.is_none() && glued {
        return KeyField {
            leading,
            tonic: "",
            rest: body,
            key: None,
        };
    }

    KeyField {
        leading,
        tonic,
        rest,
        key: Some(Key {
            root,
            accidental,
            mode,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> Key {
        parse_key_field(value).key.unwrap()
    }

    #[test]
    fn test_parse_simple_key() {
        let key = key("G");

        assert_eq!(key.root, NoteName::G);
        assert_eq!(key.accidental, None);
        assert_eq!(key.mode, Some(Mode::Major));
    }

    #[test]
    fn test_parse_minor_key() {
        let key = key("Am");

        assert_eq!(key.root, NoteName::A);
        assert_eq!(key.mode, Some(Mode::Minor));
    }

    #[test]
    fn test_parse_sharp_minor_key() {
        let key = key("F#m");

        assert_eq!(key.root, NoteName::F);
        assert_eq!(key.accidental, Some(Accidental::Sharp));
        assert_eq!(key.mode, Some(Mode::Minor));
    }

    #[test]
    fn test_parse_flat_keys() {
        assert_eq!(key("Bb").accidental, Some(Accidental::Flat));

        let bbmix = key("Bbmix");
        assert_eq!(bbmix.accidental, Some(Accidental::Flat));
        assert_eq!(bbmix.mode, Some(Mode::Mixolydian));

        let bm = key("Bm");
        assert_eq!(bm.accidental, None);
        assert_eq!(bm.mode, Some(Mode::Minor));
    }

    #[test]
    fn test_parse_modal_spellings() {
        assert_eq!(key("D dorian").mode, Some(Mode::Dorian));
        assert_eq!(key("EDor").mode, Some(Mode::Dorian));
        assert_eq!(key("A Mix").mode, Some(Mode::Mixolydian));
        assert_eq!(key("Dmaj").mode, Some(Mode::Major));
        assert_eq!(key(" Gmin").mode, Some(Mode::Minor));
    }

    #[test]
    fn test_key_slices_round_trip() {
        let field = parse_key_field(" F#m clef=treble");

        assert_eq!(field.leading, " ");
        assert_eq!(field.tonic, "F#");
        assert_eq!(field.rest, "m clef=treble");
    }

    #[test]
    fn test_clef_setting_is_not_a_mode() {
        let key = key("G clef=bass");
        assert_eq!(key.mode, Some(Mode::Major));
    }

    #[test]
    fn test_unknown_mode_keeps_tonic() {
        let field = parse_key_field("D xyz");
        let key = field.key.unwrap();

        assert_eq!(key.root, NoteName::D);
        assert_eq!(key.mode, None);
    }

    #[test]
    fn test_none_and_empty() {
        assert!(parse_key_field("").is_blank());
        assert!(parse_key_field("none").is_blank());
        assert!(parse_key_field(" None ").is_blank());
    }

    #[test]
    fn test_not_a_key() {
        let field = parse_key_field("HP");
        assert_eq!(field.key, None);
        assert!(!field.is_blank());
    }

    #[test]
    fn test_lowercase_key() {
        let key = key("g");

        assert_eq!(key.root, NoteName::G);
        assert_eq!(key.mode, Some(Mode::Major));
    }
}
