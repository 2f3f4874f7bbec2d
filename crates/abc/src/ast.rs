//! Core value types: note letters, accidentals, modes, keys, pitches and the
//! note events produced by the parser.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AbcError;
use crate::parser::note::parse_note_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// Convert to semitone offset from C (0-11)
    pub fn to_semitone(&self) -> i8 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    /// Position of the natural major key on the circle of fifths (C = 0)
    pub fn fifths(&self) -> i8 {
        match self {
            NoteName::F => -1,
            NoteName::C => 0,
            NoteName::G => 1,
            NoteName::D => 2,
            NoteName::A => 3,
            NoteName::E => 4,
            NoteName::B => 5,
        }
    }

    /// All note names in order
    pub fn all() -> [NoteName; 7] {
        [
            NoteName::C,
            NoteName::D,
            NoteName::E,
            NoteName::F,
            NoteName::G,
            NoteName::A,
            NoteName::B,
        ]
    }

    /// Index into a seven-slot table, C = 0
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Spell a chromatic index (taken mod 12) as a letter plus optional
    /// sharp or flat.
    pub fn spell(semitone: i32, prefer_flats: bool) -> (NoteName, Option<Accidental>) {
        use Accidental::{Flat, Sharp};
        match (semitone.rem_euclid(12), prefer_flats) {
            (0, _) => (NoteName::C, None),
            (1, false) => (NoteName::C, Some(Sharp)),
            (1, true) => (NoteName::D, Some(Flat)),
            (2, _) => (NoteName::D, None),
            (3, false) => (NoteName::D, Some(Sharp)),
            (3, true) => (NoteName::E, Some(Flat)),
            (4, _) => (NoteName::E, None),
            (5, _) => (NoteName::F, None),
            (6, false) => (NoteName::F, Some(Sharp)),
            (6, true) => (NoteName::G, Some(Flat)),
            (7, _) => (NoteName::G, None),
            (8, false) => (NoteName::G, Some(Sharp)),
            (8, true) => (NoteName::A, Some(Flat)),
            (9, _) => (NoteName::A, None),
            (10, false) => (NoteName::A, Some(Sharp)),
            (10, true) => (NoteName::B, Some(Flat)),
            _ => (NoteName::B, None),
        }
    }

    /// The next letter up, and whether that step wrapped into the next octave
    pub fn step_up(&self) -> (NoteName, bool) {
        let next = (self.index() + 1) % 7;
        (NoteName::all()[next], next == 0)
    }

    /// The next letter down, and whether that step wrapped into the octave below
    pub fn step_down(&self) -> (NoteName, bool) {
        let prev = (self.index() + 6) % 7;
        (NoteName::all()[prev], prev == 6)
    }

    /// Case-insensitive letter lookup
    pub fn from_char(c: char) -> Option<NoteName> {
        match c.to_ascii_uppercase() {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    DoubleSharp,
    Sharp,
    Natural,
    Flat,
    DoubleFlat,
}

impl Accidental {
    /// Convert to semitone offset
    pub fn to_semitone_offset(&self) -> i8 {
        match self {
            Accidental::DoubleSharp => 2,
            Accidental::Sharp => 1,
            Accidental::Natural => 0,
            Accidental::Flat => -1,
            Accidental::DoubleFlat => -2,
        }
    }

    /// The accidental that moves a natural letter by `offset` semitones.
    pub fn from_semitone_offset(offset: i8) -> Option<Accidental> {
        match offset {
            2 => Some(Accidental::DoubleSharp),
            1 => Some(Accidental::Sharp),
            0 => Some(Accidental::Natural),
            -1 => Some(Accidental::Flat),
            -2 => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }

    /// ABC prefix form (`^`, `_`, `=` ...)
    pub fn abc_prefix(&self) -> &'static str {
        match self {
            Accidental::DoubleSharp => "^^",
            Accidental::Sharp => "^",
            Accidental::Natural => "=",
            Accidental::Flat => "_",
            Accidental::DoubleFlat => "__",
        }
    }

    /// Letter-name suffix used in note and chord names. Naturals print nothing.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            Accidental::DoubleSharp => "##",
            Accidental::Sharp => "#",
            Accidental::Natural => "",
            Accidental::Flat => "b",
            Accidental::DoubleFlat => "bb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl Mode {
    /// Parse a mode word. Case-insensitive; only the first three letters are
    /// significant, so `Dor`, `dorian` and `DORIAN` all agree. A lone `m` is
    /// minor and an empty word is major.
    pub fn parse(s: &str) -> Option<Mode> {
        let s = s.to_lowercase();
        if s.is_empty() {
            return Some(Mode::Major);
        }
        if s == "m" {
            return Some(Mode::Minor);
        }
        match s.get(..3)? {
            "maj" => Some(Mode::Major),
            "min" => Some(Mode::Minor),
            "ion" => Some(Mode::Ionian),
            "dor" => Some(Mode::Dorian),
            "phr" => Some(Mode::Phrygian),
            "lyd" => Some(Mode::Lydian),
            "mix" => Some(Mode::Mixolydian),
            "aeo" => Some(Mode::Aeolian),
            "loc" => Some(Mode::Locrian),
            _ => None,
        }
    }

    /// How far above the tonic of its relative major this mode starts.
    /// Dorian sits two semitones above, Mixolydian seven.
    pub fn semitones_above_relative_major(&self) -> i8 {
        match self {
            Mode::Major | Mode::Ionian => 0,
            Mode::Dorian => 2,
            Mode::Phrygian => 4,
            Mode::Lydian => 5,
            Mode::Mixolydian => 7,
            Mode::Minor | Mode::Aeolian => 9,
            Mode::Locrian => 11,
        }
    }

    /// Circle-of-fifths shift from a major key on the same tonic
    pub fn fifths_offset(&self) -> i8 {
        match self {
            Mode::Lydian => 1,
            Mode::Major | Mode::Ionian => 0,
            Mode::Mixolydian => -1,
            Mode::Dorian => -2,
            Mode::Minor | Mode::Aeolian => -3,
            Mode::Phrygian => -4,
            Mode::Locrian => -5,
        }
    }

    /// Suffix used in canonical key names (`Am`, `EDor`, `DMix`)
    pub fn suffix(&self) -> &'static str {
        match self {
            Mode::Major | Mode::Ionian => "",
            Mode::Minor | Mode::Aeolian => "m",
            Mode::Dorian => "Dor",
            Mode::Phrygian => "Phr",
            Mode::Lydian => "Lyd",
            Mode::Mixolydian => "Mix",
            Mode::Locrian => "Loc",
        }
    }
}

/// A parsed `K:` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub root: NoteName,
    pub accidental: Option<Accidental>,
    /// `None` when the text after the tonic was not a mode we know. Such keys
    /// imply no accidentals but can still be transposed.
    pub mode: Option<Mode>,
}

impl Key {
    pub fn new(root: NoteName, accidental: Option<Accidental>, mode: Mode) -> Self {
        Key {
            root,
            accidental,
            mode: Some(mode),
        }
    }

    /// Parse a key name such as `D`, `Bb`, `F#m`, `EDor` or `A mixolydian`.
    pub fn parse(s: &str) -> Option<Key> {
        crate::parser::key::parse_key_field(s).key
    }

    /// Chromatic index of the tonic (may fall outside 0..12 for `Cb`, `B#`)
    pub fn tonic_semitone(&self) -> i8 {
        self.root.to_semitone() + self.accidental.map_or(0, |a| a.to_semitone_offset())
    }

    /// Tonic as written in a key name: letter plus `#` or `b`
    pub fn tonic_name(&self) -> String {
        let mut name = self.root.as_char().to_string();
        name.push_str(self.accidental.map_or("", |a| a.name_suffix()));
        name
    }

    /// Canonical key name, e.g. `D`, `Bb`, `Am`, `EDor`, `DMix`
    pub fn canonical_name(&self) -> String {
        let mut name = self.tonic_name();
        if let Some(mode) = self.mode {
            name.push_str(mode.suffix());
        }
        name
    }

    /// Same mode, tonic moved by `semitones` and respelled.
    pub fn transposed(&self, semitones: i32, prefer_flats: bool) -> Key {
        let (root, accidental) =
            NoteName::spell(i32::from(self.tonic_semitone()) + semitones, prefer_flats);
        Key {
            root,
            accidental,
            mode: self.mode,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// An absolute pitch as the fingering charts see it.
///
/// Double sharps are carried as the next letter plus a sharp (`^^B` is
/// `C#` an octave up). Double flats sound two semitones below the letter and
/// are spelled on the previous letter (`__E` is `D`, `__C` is `Bb` an octave
/// down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub letter: NoteName,
    /// `Sharp`, `Flat` or `Natural` after normalization, or `None` when
    /// nothing was written or implied.
    pub accidental: Option<Accidental>,
    /// Uppercase letters are octave 4, lowercase octave 5
    pub octave: i8,
}

impl Pitch {
    pub fn new(letter: NoteName, accidental: Option<Accidental>, octave: i8) -> Self {
        match accidental {
            Some(Accidental::DoubleSharp) => {
                let (letter, wrapped) = letter.step_up();
                Pitch {
                    letter,
                    accidental: Some(Accidental::Sharp),
                    octave: octave.saturating_add(i8::from(wrapped)),
                }
            }
            Some(Accidental::DoubleFlat) => {
                let (previous, wrapped) = letter.step_down();
                let below = if wrapped { 12 } else { 0 };
                // 0 for E-D style whole steps, -1 for F-E and C-B half steps
                let offset = letter.to_semitone() - 2 - (previous.to_semitone() - below);
                Pitch {
                    letter: previous,
                    accidental: Accidental::from_semitone_offset(offset)
                        .filter(|a| *a != Accidental::Natural),
                    octave: octave.saturating_sub(i8::from(wrapped)),
                }
            }
            accidental => Pitch {
                letter,
                accidental,
                octave,
            },
        }
    }

    /// Note name without octave: `C`, `F#`, `Bb`
    pub fn name(&self) -> String {
        let mut name = self.letter.as_char().to_string();
        name.push_str(self.accidental.map_or("", |a| a.name_suffix()));
        name
    }

    /// Note name with octave: `D4`, `C#5`
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name(), self.octave)
    }

    /// MIDI note number, C4 = 60
    pub fn midi(&self) -> i16 {
        (i16::from(self.octave) + 1) * 12
            + i16::from(self.letter.to_semitone())
            + i16::from(self.accidental.map_or(0, |a| a.to_semitone_offset()))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl FromStr for Pitch {
    type Err = AbcError;

    /// Read a resolved ABC note token such as `^c`, `_B,` or `=f'`.
    /// A trailing duration is allowed and ignored; rests are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let token = parse_note_token(&mut rest).map_err(|_| AbcError::InvalidPitch(s.to_string()))?;
        if !rest.is_empty() {
            return Err(AbcError::InvalidPitch(s.to_string()));
        }
        token
            .pitch(token.explicit_accidental())
            .ok_or_else(|| AbcError::InvalidPitch(s.to_string()))
    }
}

/// One item of the parser's output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteEvent {
    /// A note token with its effective accidental attached (`^F`, `=c`,
    /// `B,`), or a rest glyph (`z`, `Z`, `x`).
    Note { token: String },
    Barline { glyph: String },
}

impl NoteEvent {
    pub fn note(token: impl Into<String>) -> Self {
        NoteEvent::Note {
            token: token.into(),
        }
    }

    pub fn barline(glyph: impl Into<String>) -> Self {
        NoteEvent::Barline {
            glyph: glyph.into(),
        }
    }

    pub fn is_barline(&self) -> bool {
        matches!(self, NoteEvent::Barline { .. })
    }

    /// Note token or barline glyph
    pub fn token(&self) -> &str {
        match self {
            NoteEvent::Note { token } => token,
            NoteEvent::Barline { glyph } => glyph,
        }
    }

    pub fn is_rest(&self) -> bool {
        match self {
            NoteEvent::Note { token } => token.starts_with(['z', 'Z', 'x']),
            NoteEvent::Barline { .. } => false,
        }
    }

    /// The sounding pitch, if this is a pitched note
    pub fn pitch(&self) -> Option<Pitch> {
        match self {
            NoteEvent::Note { token } if !self.is_rest() => token.parse().ok(),
            _ => None,
        }
    }
}
