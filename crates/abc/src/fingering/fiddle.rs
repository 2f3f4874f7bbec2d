//! Fiddle positions in first position, standard GDAE tuning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Pitch;

/// Lowest and highest MIDI notes we give a position for (G3 to C6).
const LOWEST: i16 = 55;
const HIGHEST: i16 = 84;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiddleString {
    G,
    D,
    A,
    E,
}

impl FiddleString {
    /// Checked from the top string down so higher notes prefer higher strings
    const SCAN_ORDER: [FiddleString; 4] = [
        FiddleString::E,
        FiddleString::A,
        FiddleString::D,
        FiddleString::G,
    ];

    /// MIDI note of the open string
    pub fn open_midi(&self) -> i16 {
        match self {
            FiddleString::G => 55,
            FiddleString::D => 62,
            FiddleString::A => 69,
            FiddleString::E => 76,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            FiddleString::G => 'G',
            FiddleString::D => 'D',
            FiddleString::A => 'A',
            FiddleString::E => 'E',
        }
    }
}

/// Finger placement on a string. `Low` fingers sit a semitone below the
/// normal spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Open,
    Low1,
    First,
    Low2,
    Second,
    Third,
    Low4,
    Fourth,
}

impl Finger {
    /// Finger for a distance in semitones above the open string
    pub fn from_offset(offset: i16) -> Option<Finger> {
        let finger = match offset {
            0 => Finger::Open,
            1 => Finger::Low1,
            2 => Finger::First,
            3 => Finger::Low2,
            4 => Finger::Second,
            5 => Finger::Third,
            6 => Finger::Low4,
            7 => Finger::Fourth,
            _ => return None,
        };
        Some(finger)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Finger::Open => "0",
            Finger::Low1 => "L1",
            Finger::First => "1",
            Finger::Low2 => "L2",
            Finger::Second => "2",
            Finger::Third => "3",
            Finger::Low4 => "L4",
            Finger::Fourth => "4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FiddleFingering {
    Fingered { string: FiddleString, finger: Finger },
    OutOfRange,
}

impl FiddleFingering {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, FiddleFingering::OutOfRange)
    }

    /// Compact tab form: `D0`, `AL2`, or `?`
    pub fn display(&self) -> String {
        match self {
            FiddleFingering::Fingered { string, finger } => {
                format!("{}{}", string.as_char(), finger.code())
            }
            FiddleFingering::OutOfRange => "?".to_string(),
        }
    }
}

impl fmt::Display for FiddleFingering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

pub fn resolve_fiddle_fingering(pitch: &Pitch) -> FiddleFingering {
    let midi = pitch.midi();
    if !(LOWEST..=HIGHEST).contains(&midi) {
        return FiddleFingering::OutOfRange;
    }

    FiddleString::SCAN_ORDER
        .iter()
        .find_map(|string| {
            let finger = Finger::from_offset(midi - string.open_midi())?;
            Some(FiddleFingering::Fingered {
                string: *string,
                finger,
            })
        })
        .unwrap_or(FiddleFingering::OutOfRange)
}
