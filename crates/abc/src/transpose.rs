//! Transposition of whole ABC texts.
//!
//! Lines are rewritten one at a time with the same lexer the note extractor
//! uses. `K:` fields get a new tonic, quoted chord symbols get a new root,
//! and melody notes are moved and re-spelled against the new key. All other
//! text is copied byte for byte.

use serde::{Deserialize, Serialize};

use crate::ast::{Accidental, NoteName, Pitch};
use crate::parser::body::{Lexer, Token};
use crate::parser::header::field_line;
use crate::parser::key::parse_key_field;
use crate::parser::note::NoteToken;
use crate::parser::scope::BarAccidentals;
use crate::signature::KeySignature;

/// Shifts (mod 12) that move a key toward the flat side of the circle of
/// fifths. These are spelled with flats; everything else with sharps.
const FLAT_SHIFTS: [i32; 5] = [1, 3, 5, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransposeOptions {
    /// Follow accidentals through the bar in both the source and the output.
    /// When false only the old key signature is consulted for unmarked
    /// notes, so an accidental earlier in the bar is not carried.
    pub bar_accidentals: bool,
}

impl Default for TransposeOptions {
    fn default() -> Self {
        TransposeOptions {
            bar_accidentals: true,
        }
    }
}

impl TransposeOptions {
    /// Unmarked notes read from the key signature alone.
    pub fn key_signature_only() -> Self {
        TransposeOptions {
            bar_accidentals: false,
        }
    }
}

/// Whether a shift of `semitones` is spelled with flats
pub fn prefers_flats(semitones: i32) -> bool {
    FLAT_SHIFTS.contains(&semitones.rem_euclid(12))
}

/// Transpose with default options.
pub fn transpose(input: &str, semitones: i32) -> String {
    transpose_with(input, semitones, &TransposeOptions::default())
}

/// Transpose every key, chord symbol and note in `input` by `semitones`.
#[tracing::instrument(level = "debug", skip(input), fields(bytes = input.len()))]
pub fn transpose_with(input: &str, semitones: i32, options: &TransposeOptions) -> String {
    if semitones == 0 {
        return input.to_string();
    }

    let mut transposer = Transposer::new(semitones, *options);
    input
        .split('\n')
        .map(|line| transposer.line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

struct Transposer {
    semitones: i32,
    prefer_flats: bool,
    options: TransposeOptions,
    in_body: bool,
    old_key: KeySignature,
    new_key: KeySignature,
    source_bar: BarAccidentals,
    target_bar: BarAccidentals,
}

impl Transposer {
    fn new(semitones: i32, options: TransposeOptions) -> Self {
        let prefer_flats = prefers_flats(semitones);
        tracing::debug!(semitones, prefer_flats, "transposing");
        Transposer {
            semitones,
            prefer_flats,
            options,
            in_body: false,
            old_key: KeySignature::empty(),
            new_key: KeySignature::empty(),
            source_bar: BarAccidentals::new(),
            target_bar: BarAccidentals::new(),
        }
    }

    fn line(&mut self, line: &str) -> String {
        if line.trim_start().starts_with('%') {
            return line.to_string();
        }

        if let Some((name, value)) = field_line(line) {
            if name != 'K' {
                return line.to_string();
            }
            self.in_body = true;
            let prefix = &line[..line.len() - value.len()];
            return format!("{}{}", prefix, self.key_change(value));
        }

        if !self.in_body {
            return line.to_string();
        }
        self.body_line(line)
    }

    /// Rewrite a `K:` value and switch to the old and new signatures.
    fn key_change(&mut self, value: &str) -> String {
        let (field_text, comment) = value.split_at(value.find('%').unwrap_or(value.len()));
        let field = parse_key_field(field_text);

        self.source_bar.reset();
        self.target_bar.reset();

        let Some(key) = field.key else {
            self.old_key = KeySignature::empty();
            self.new_key = KeySignature::empty();
            return value.to_string();
        };

        let new_key = key.transposed(self.semitones, self.prefer_flats);
        self.old_key = KeySignature::for_key(&key);
        self.new_key = KeySignature::for_key(&new_key);
        tracing::debug!(from = %key, to = %new_key, "key transposed");

        let mut tonic = new_key.tonic_name();
        if field.tonic.starts_with(|c: char| c.is_ascii_lowercase()) {
            tonic = tonic.to_lowercase();
        }
        format!("{}{}{}{}", field.leading, tonic, field.rest, comment)
    }

    fn body_line(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len() + 8);
        let mut in_grace = false;

        for lexeme in Lexer::new(line) {
            match lexeme.token {
                Token::Note(note) if !note.is_rest() => out.push_str(&self.note(&note, !in_grace)),
                Token::ChordSymbol(symbol) => {
                    out.push('"');
                    out.push_str(&self.chord_symbol(symbol));
                    out.push('"');
                }
                Token::Barline => {
                    self.source_bar.reset();
                    self.target_bar.reset();
                    out.push_str(lexeme.text);
                }
                Token::InlineField { name: 'K', value } => {
                    let value = self.key_change(value);
                    out.push_str(&format!("[K:{}]", value));
                }
                Token::GraceOpen => {
                    in_grace = true;
                    out.push_str(lexeme.text);
                }
                Token::GraceClose => {
                    in_grace = false;
                    out.push_str(lexeme.text);
                }
                _ => out.push_str(lexeme.text),
            }
        }

        out
    }

    /// Move one note. Grace notes are moved but do not touch bar state.
    fn note(&mut self, note: &NoteToken<'_>, track_bar: bool) -> String {
        let Some(letter) = note.note_name() else {
            return format!("{}{}{}{}", note.accidentals, note.letter, note.octave_marks, note.duration);
        };
        let bar = self.options.bar_accidentals;

        let source = match note.explicit_accidental() {
            Some(accidental) => {
                if bar && track_bar {
                    self.source_bar.record(letter, accidental);
                }
                Some(accidental)
            }
            None if bar => self.source_bar.implied(letter, &self.old_key),
            None => self.old_key.get(letter),
        };

        // Read through Pitch so double accidentals sound the same as in the parser
        let old_octave = i32::from(note.octave());
        let old_pitch = i32::from(Pitch::new(letter, source, note.octave()).midi()) - 12;
        let new_pitch = old_pitch + self.semitones;

        let (new_letter, new_accidental) = spell_in_key(new_pitch, &self.new_key, self.prefer_flats);
        let new_offset = new_accidental.map_or(0, |a| a.to_semitone_offset());
        let new_octave =
            (new_pitch - i32::from(new_letter.to_semitone()) - i32::from(new_offset)).div_euclid(12);

        let implied = if bar {
            self.target_bar.implied(new_letter, &self.new_key)
        } else {
            self.new_key.get(new_letter)
        };
        let implied_offset = implied.map_or(0, |a| a.to_semitone_offset());

        let mut out = String::new();
        if new_offset != implied_offset {
            let written = Accidental::from_semitone_offset(new_offset).unwrap_or(Accidental::Natural);
            out.push_str(written.abc_prefix());
            if bar && track_bar {
                self.target_bar.record(new_letter, written);
            }
        }
        out.push_str(&shift_octave(
            new_letter,
            note.letter.is_ascii_lowercase(),
            note.octave_marks,
            new_octave - old_octave,
        ));
        out.push_str(note.duration);
        out
    }

    /// New root (and slash bass) for a chord symbol; annotations and
    /// unreadable symbols pass through.
    fn chord_symbol(&self, symbol: &str) -> String {
        if symbol.starts_with(['^', '_', '<', '>', '@']) {
            return symbol.to_string();
        }
        let Some((root_len, root)) = chord_root(symbol) else {
            return symbol.to_string();
        };

        let mut out = self.chord_name(root);
        let rest = &symbol[root_len..];
        if let Some(slash) = rest.find('/') {
            let bass_text = &rest[slash + 1..];
            if let Some((bass_len, bass)) = chord_root(bass_text) {
                out.push_str(&rest[..=slash]);
                out.push_str(&self.chord_name(bass));
                out.push_str(&bass_text[bass_len..]);
                return out;
            }
        }
        out.push_str(rest);
        out
    }

    fn chord_name(&self, semitone: i32) -> String {
        let (letter, accidental) =
            spell_in_key(semitone + self.semitones, &self.new_key, self.prefer_flats);
        let mut name = letter.as_char().to_string();
        name.push_str(accidental.map_or("", |a| a.name_suffix()));
        name
    }
}

/// Spell a pitch: with the key's own letter when it is diatonic, otherwise
/// by the sharp or flat preference.
fn spell_in_key(
    semitone: i32,
    key: &KeySignature,
    prefer_flats: bool,
) -> (NoteName, Option<Accidental>) {
    let target = semitone.rem_euclid(12);
    NoteName::all()
        .into_iter()
        .find(|letter| {
            (i32::from(letter.to_semitone()) + i32::from(key.offset(*letter))).rem_euclid(12)
                == target
        })
        .map(|letter| (letter, key.get(letter)))
        .unwrap_or_else(|| NoteName::spell(target, prefer_flats))
}

/// Chord root at the start of a symbol: an uppercase letter and an optional
/// `#` or `b`. Returns the byte length and chromatic index.
fn chord_root(s: &str) -> Option<(usize, i32)> {
    let mut chars = s.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase)?;
    let letter = NoteName::from_char(letter)?;
    let semitone = i32::from(letter.to_semitone());
    match chars.next() {
        Some('#') => Some((2, semitone + 1)),
        Some('b') => Some((2, semitone - 1)),
        _ => Some((1, semitone)),
    }
}

/// Render a letter moved `delta` octaves from where its case and marks put
/// it, changing as little of the original spelling as possible.
fn shift_octave(letter: NoteName, lowercase: bool, marks: &str, delta: i32) -> String {
    let mut lowercase = lowercase;
    let mut marks = marks.to_string();

    for _ in 0..delta.unsigned_abs() {
        if delta > 0 {
            if let Some(pos) = marks.find(',') {
                marks.remove(pos);
            } else if !lowercase {
                lowercase = true;
            } else {
                marks.push('\'');
            }
        } else if let Some(pos) = marks.find('\'') {
            marks.remove(pos);
        } else if lowercase {
            lowercase = false;
        } else {
            marks.push(',');
        }
    }

    let c = letter.as_char();
    let c = if lowercase { c.to_ascii_lowercase() } else { c };
    format!("{}{}", c, marks)
}
