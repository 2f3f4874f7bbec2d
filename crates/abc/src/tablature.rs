//! Tablature for a parsed note stream.
//!
//! [`tablature`] pairs each event with a fingering for the chosen
//! instrument, and [`render_text`] lays the result out as a plain-text
//! grid: one column per event, one row per hole (or string).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ast::{NoteEvent, Pitch};
use crate::error::AbcError;
use crate::fingering::{resolve_fiddle_fingering, FiddleFingering, WhistleFingering, WhistleKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Whistle(WhistleKey),
    Fiddle,
}

impl Default for Instrument {
    fn default() -> Self {
        Instrument::Whistle(WhistleKey::default())
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::Whistle(key) => write!(f, "whistle:{}", key),
            Instrument::Fiddle => f.write_str("fiddle"),
        }
    }
}

impl FromStr for Instrument {
    type Err = AbcError;

    /// `whistle`, `whistle:<key>`, `fiddle` or `violin`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, key) = match s.split_once(':') {
            Some((name, key)) => (name, Some(key)),
            None => (s, None),
        };

        match (name.to_ascii_lowercase().as_str(), key) {
            ("whistle", None) => Ok(Instrument::Whistle(WhistleKey::default())),
            ("whistle", Some(key)) => Ok(Instrument::Whistle(key.parse()?)),
            ("fiddle" | "violin", None) => Ok(Instrument::Fiddle),
            _ => Err(AbcError::UnknownInstrument(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabSymbol {
    Whistle(WhistleFingering),
    Fiddle(FiddleFingering),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabEntry {
    Barline {
        glyph: String,
    },
    Rest {
        token: String,
    },
    Note {
        token: String,
        pitch: Pitch,
        symbol: TabSymbol,
    },
    /// A note token we could not read as a pitch
    Unreadable {
        token: String,
    },
}

/// One entry per event, in order.
pub fn tablature(events: &[NoteEvent], instrument: Instrument) -> Vec<TabEntry> {
    events
        .iter()
        .map(|event| match event {
            NoteEvent::Barline { glyph } => TabEntry::Barline {
                glyph: glyph.clone(),
            },
            NoteEvent::Note { token } if event.is_rest() => TabEntry::Rest {
                token: token.clone(),
            },
            NoteEvent::Note { token } => match token.parse::<Pitch>() {
                Ok(pitch) => TabEntry::Note {
                    token: token.clone(),
                    pitch,
                    symbol: fingering(&pitch, instrument),
                },
                Err(err) => {
                    tracing::debug!(%err, "no tablature for token");
                    TabEntry::Unreadable {
                        token: token.clone(),
                    }
                }
            },
        })
        .collect()
}

fn fingering(pitch: &Pitch, instrument: Instrument) -> TabSymbol {
    match instrument {
        Instrument::Whistle(key) => TabSymbol::Whistle(key.fingering(pitch)),
        Instrument::Fiddle => TabSymbol::Fiddle(resolve_fiddle_fingering(pitch)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Leave a note's fingering blank when it matches the last one shown
    pub skip_repeated: bool,
}

/// Render entries as a text grid.
///
/// Whistle tab has a name row, six hole rows and an octave row (`+` for the
/// second register). Fiddle tab has a name row and a string/finger row.
/// The row count is taken from the first note; entries with no notes render
/// as a single name row.
pub fn render_text(entries: &[TabEntry], options: &RenderOptions) -> String {
    let rows = entries
        .iter()
        .find_map(|entry| match entry {
            TabEntry::Note { symbol, .. } => Some(symbol_cells(symbol).len() + 1),
            _ => None,
        })
        .unwrap_or(1);

    let mut last: Option<&TabSymbol> = None;
    let columns: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            let mut column = vec![String::new(); rows];
            match entry {
                TabEntry::Barline { .. } => column.fill("|".to_string()),
                TabEntry::Rest { .. } => column[0] = "z".to_string(),
                TabEntry::Unreadable { token } => column[0] = token.clone(),
                TabEntry::Note { pitch, symbol, .. } => {
                    column[0] = pitch.name();
                    let repeated = options.skip_repeated && last == Some(symbol);
                    if !repeated {
                        for (cell, text) in column[1..].iter_mut().zip(symbol_cells(symbol)) {
                            *cell = text;
                        }
                    }
                    last = Some(symbol);
                }
            }
            column
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .map(|column| column.iter().map(|cell| cell.chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    if columns.is_empty() {
        return out;
    }
    for row in 0..rows {
        let line = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| format!("{:<width$}", column[row], width = *width))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Cells below the name row for one fingering
fn symbol_cells(symbol: &TabSymbol) -> Vec<String> {
    match symbol {
        TabSymbol::Whistle(fingering) => {
            let mut cells: Vec<String> = fingering
                .holes
                .iter()
                .map(|hole| hole.symbol().to_string())
                .collect();
            cells.push(if fingering.octave >= 2 { "+" } else { "" }.to_string());
            cells
        }
        TabSymbol::Fiddle(fingering) => vec![fingering.display()],
    }
}
