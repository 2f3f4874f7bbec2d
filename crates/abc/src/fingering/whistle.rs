//! Tin whistle fingering charts.
//!
//! Holes are numbered from the mouthpiece down: left index, middle, ring,
//! then right index, middle, ring. Each whistle key has its own chart, keyed
//! by note name with octave (`F#4`, `Bb5`).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ast::{Accidental, NoteName, Pitch};
use crate::error::AbcError;
use crate::parser::header::scan_header;
use crate::parser::key::parse_key_field;

/// State of one tone hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hole {
    Closed,
    Open,
    Half,
    /// Shown for notes the whistle cannot play
    Unknown,
}

impl Hole {
    pub fn symbol(&self) -> char {
        match self {
            Hole::Closed => '●',
            Hole::Open => '○',
            Hole::Half => '◐',
            Hole::Unknown => '?',
        }
    }
}

/// The keys whistles are commonly made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WhistleKey {
    #[default]
    D,
    C,
    G,
    A,
    Bb,
    F,
    Eb,
}

impl WhistleKey {
    pub fn all() -> [WhistleKey; 7] {
        [
            WhistleKey::D,
            WhistleKey::C,
            WhistleKey::G,
            WhistleKey::A,
            WhistleKey::Bb,
            WhistleKey::F,
            WhistleKey::Eb,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            WhistleKey::D => "D",
            WhistleKey::C => "C",
            WhistleKey::G => "G",
            WhistleKey::A => "A",
            WhistleKey::Bb => "Bb",
            WhistleKey::F => "F",
            WhistleKey::Eb => "Eb",
        }
    }

    /// Look up by name; unknown names give `None`.
    pub fn from_name(name: &str) -> Option<WhistleKey> {
        WhistleKey::all()
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Fingering for a pitch on this whistle.
    pub fn fingering(&self, pitch: &Pitch) -> WhistleFingering {
        let entry = CHARTS.get(self).and_then(|chart| {
            chart
                .get(pitch.full_name().as_str())
                .or_else(|| enharmonic(pitch).and_then(|name| chart.get(name.as_str())))
        });

        match entry {
            Some(entry) => WhistleFingering {
                holes: entry.holes,
                octave: entry.octave,
                note_name: pitch.name(),
                out_of_range: false,
            },
            None => WhistleFingering {
                holes: [Hole::Unknown; 6],
                octave: if pitch.octave >= 5 { 2 } else { 1 },
                note_name: pitch.name(),
                out_of_range: true,
            },
        }
    }
}

impl fmt::Display for WhistleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WhistleKey {
    type Err = AbcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WhistleKey::from_name(s).ok_or_else(|| AbcError::UnknownWhistleKey(s.to_string()))
    }
}

/// A hole pattern plus the register it is blown in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhistleFingering {
    pub holes: [Hole; 6],
    /// 1 for the bottom register, 2 for the overblown one
    pub octave: u8,
    /// Note name without octave, as shown above the tab
    pub note_name: String,
    pub out_of_range: bool,
}

/// Resolve a fingering by whistle key name. Unknown keys use the D whistle.
pub fn resolve_whistle_fingering(pitch: &Pitch, whistle_key: &str) -> WhistleFingering {
    let key = WhistleKey::from_name(whistle_key).unwrap_or_else(|| {
        tracing::debug!(whistle_key, "unknown whistle key, using D");
        WhistleKey::D
    });
    key.fingering(pitch)
}

/// Pick a whistle for a tune from the tonic of its first `K:` line.
///
/// The mode is ignored. Keys with no whistle of their own map to the
/// nearest common one, and anything else gets a D whistle. Returns `None`
/// when the tune has no `K:` line.
pub fn recommend_whistle_key(input: &str) -> Option<WhistleKey> {
    let value = scan_header(input).key?;
    let tonic = parse_key_field(&value).key.map(|key| key.tonic_name());

    let recommended = match tonic.as_deref() {
        Some(name) => WhistleKey::from_name(name).unwrap_or(match name {
            "E" | "F#" | "C#" => WhistleKey::D,
            "B" => WhistleKey::A,
            "Ab" => WhistleKey::Eb,
            "Db" => WhistleKey::C,
            "Gb" => WhistleKey::F,
            _ => WhistleKey::D,
        }),
        None => WhistleKey::D,
    };
    tracing::debug!(tonic = ?tonic, whistle = %recommended, "recommended whistle");
    Some(recommended)
}

/// Same pitch under its other common spelling. `B#` and `Cb` move octave
/// number along with the letter.
fn enharmonic(pitch: &Pitch) -> Option<String> {
    use Accidental::{Flat, Sharp};
    use NoteName::*;

    let (letter, accidental, octave) = match (pitch.letter, pitch.accidental?) {
        (C, Sharp) => (D, Some(Flat), pitch.octave),
        (D, Flat) => (C, Some(Sharp), pitch.octave),
        (D, Sharp) => (E, Some(Flat), pitch.octave),
        (E, Flat) => (D, Some(Sharp), pitch.octave),
        (F, Sharp) => (G, Some(Flat), pitch.octave),
        (G, Flat) => (F, Some(Sharp), pitch.octave),
        (G, Sharp) => (A, Some(Flat), pitch.octave),
        (A, Flat) => (G, Some(Sharp), pitch.octave),
        (A, Sharp) => (B, Some(Flat), pitch.octave),
        (B, Flat) => (A, Some(Sharp), pitch.octave),
        (E, Sharp) => (F, None, pitch.octave),
        (F, Flat) => (E, None, pitch.octave),
        (B, Sharp) => (C, None, pitch.octave.saturating_add(1)),
        (C, Flat) => (B, None, pitch.octave.saturating_sub(1)),
        _ => return None,
    };
    Some(Pitch::new(letter, accidental, octave).full_name())
}

#[derive(Debug, Clone, Copy)]
struct ChartEntry {
    holes: [Hole; 6],
    octave: u8,
}

type Chart = HashMap<&'static str, ChartEntry>;

static CHARTS: Lazy<HashMap<WhistleKey, Chart>> = Lazy::new(|| {
    [
        (WhistleKey::D, D_CHART),
        (WhistleKey::C, C_CHART),
        (WhistleKey::G, G_CHART),
        (WhistleKey::A, A_CHART),
        (WhistleKey::Bb, BB_CHART),
        (WhistleKey::F, F_CHART),
        (WhistleKey::Eb, EB_CHART),
    ]
    .into_iter()
    .map(|(key, rows)| (key, build_chart(rows)))
    .collect()
});

fn build_chart(rows: &[(&'static str, &str, u8)]) -> Chart {
    rows.iter()
        .map(|(name, pattern, octave)| {
            let mut holes = [Hole::Unknown; 6];
            for (hole, c) in holes.iter_mut().zip(pattern.chars()) {
                *hole = match c {
                    'X' => Hole::Closed,
                    'O' => Hole::Open,
                    'H' => Hole::Half,
                    _ => Hole::Unknown,
                };
            }
            (
                *name,
                ChartEntry {
                    holes,
                    octave: *octave,
                },
            )
        })
        .collect()
}

// X closed, O open, H half-covered; holes top to bottom.

const D_CHART: &[(&str, &str, u8)] = &[
    ("D4", "XXXXXX", 1),
    ("E4", "XXXXXO", 1),
    ("F#4", "XXXXOO", 1),
    ("G4", "XXXOOO", 1),
    ("A4", "XXOOOO", 1),
    ("B4", "XOOOOO", 1),
    ("C#5", "OOOOOO", 1),
    ("C5", "OXXOOO", 1),
    ("D5", "OXXXXX", 2),
    ("E5", "XXXXXO", 2),
    ("F#5", "XXXXOO", 2),
    ("G5", "XXXOOO", 2),
    ("A5", "XXOOOO", 2),
    ("B5", "XOOOOO", 2),
    ("C#6", "OOOOOO", 2),
    ("C6", "OXXOOO", 2),
    ("D6", "OXXXXX", 2),
    ("Eb4", "XXXXXH", 1),
    ("Eb5", "XXXXXH", 2),
    ("F4", "XXXXHO", 1),
    ("F5", "XXXXHO", 2),
    ("G#4", "XXHOOO", 1),
    ("Ab4", "XXHOOO", 1),
    ("G#5", "XXHOOO", 2),
    ("Ab5", "XXHOOO", 2),
    ("Bb4", "XHOOOO", 1),
    ("Bb5", "XHOOOO", 2),
];

const C_CHART: &[(&str, &str, u8)] = &[
    ("C4", "XXXXXX", 1),
    ("D4", "XXXXXO", 1),
    ("E4", "XXXXOO", 1),
    ("F4", "XXXOOO", 1),
    ("G4", "XXOOOO", 1),
    ("A4", "XOOOOO", 1),
    ("B4", "OXXOOO", 1),
    ("Bb4", "OXXXOO", 1),
    ("C5", "XXXXXX", 2),
    ("D5", "XXXXXO", 2),
    ("E5", "XXXXOO", 2),
    ("F5", "XXXOOO", 2),
    ("G5", "XXOOOO", 2),
    ("A5", "XOOOOO", 2),
    ("B5", "OXXOOO", 2),
    ("C6", "OXXXXX", 2),
];

const G_CHART: &[(&str, &str, u8)] = &[
    ("G4", "XXXXXX", 1),
    ("A4", "XXXXXO", 1),
    ("B4", "XXXXOO", 1),
    ("C5", "XXXOOO", 1),
    ("D5", "XXOOOO", 1),
    ("E5", "XOOOOO", 1),
    ("F#5", "OXXOOO", 1),
    ("G5", "XXXXXX", 2),
    ("A5", "XXXXXO", 2),
    ("B5", "XXXXOO", 2),
    ("C6", "XXXOOO", 2),
    ("D6", "XXOOOO", 2),
    ("E6", "XOOOOO", 2),
    ("F#6", "OXXOOO", 2),
    ("G6", "OXXXXX", 2),
];

const A_CHART: &[(&str, &str, u8)] = &[
    ("A4", "XXXXXX", 1),
    ("B4", "XXXXXO", 1),
    ("C#5", "XXXXOO", 1),
    ("D5", "XXXOOO", 1),
    ("E5", "XXOOOO", 1),
    ("F#5", "XOOOOO", 1),
    ("G#5", "OOOOOO", 1),
    ("G5", "OXXOOO", 1),
    ("C5", "XXXXHO", 1),
    ("A5", "OXXXXX", 2),
    ("B5", "XXXXXO", 2),
    ("C#6", "XXXXOO", 2),
    ("D6", "XXXOOO", 2),
    ("E6", "XXOOOO", 2),
    ("F#6", "XOOOOO", 2),
    ("G#6", "OOOOOO", 2),
    ("A6", "OXXXXX", 2),
];

const BB_CHART: &[(&str, &str, u8)] = &[
    ("Bb4", "XXXXXX", 1),
    ("C5", "XXXXXO", 1),
    ("D5", "XXXXOO", 1),
    ("Eb5", "XXXOOO", 1),
    ("F5", "XXOOOO", 1),
    ("G5", "XOOOOO", 1),
    ("A5", "OOOOOO", 1),
    ("Bb5", "OXXXXX", 2),
    ("C6", "XXXXXO", 2),
    ("D6", "XXXXOO", 2),
    ("Eb6", "XXXOOO", 2),
    ("F6", "XXOOOO", 2),
    ("G6", "XOOOOO", 2),
    ("A6", "OOOOOO", 2),
    ("Bb6", "OXXXXX", 2),
];

const F_CHART: &[(&str, &str, u8)] = &[
    ("F4", "XXXXXX", 1),
    ("G4", "XXXXXO", 1),
    ("A4", "XXXXOO", 1),
    ("Bb4", "XXXOOO", 1),
    ("C5", "XXOOOO", 1),
    ("D5", "XOOOOO", 1),
    ("E5", "OOOOOO", 1),
    ("F5", "OXXXXX", 2),
    ("G5", "XXXXXO", 2),
    ("A5", "XXXXOO", 2),
    ("Bb5", "XXXOOO", 2),
    ("C6", "XXOOOO", 2),
    ("D6", "XOOOOO", 2),
    ("E6", "OOOOOO", 2),
    ("F6", "OXXXXX", 2),
];

const EB_CHART: &[(&str, &str, u8)] = &[
    ("Eb4", "XXXXXX", 1),
    ("F4", "XXXXXO", 1),
    ("G4", "XXXXOO", 1),
    ("Ab4", "XXXOOO", 1),
    ("Bb4", "XXOOOO", 1),
    ("C5", "XOOOOO", 1),
    ("D5", "OOOOOO", 1),
    ("Eb5", "OXXXXX", 2),
    ("F5", "XXXXXO", 2),
    ("G5", "XXXXOO", 2),
    ("Ab5", "XXXOOO", 2),
    ("Bb5", "XXOOOO", 2),
    ("C6", "XOOOOO", 2),
    ("D6", "OOOOOO", 2),
    ("Eb6", "OXXXXX", 2),
];
