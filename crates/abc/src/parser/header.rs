//! Information field lines and the tune header.

use serde::{Deserialize, Serialize};

/// Tune metadata read from the lines up to and including the first `K:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneHeader {
    pub reference: Option<u32>,
    pub title: Option<String>,
    pub rhythm: Option<String>,
    pub meter: Option<String>,
    /// Raw `K:` value with comments stripped
    pub key: Option<String>,
}

/// Split a field line into its name and value.
///
/// `T:The Kesh` gives `('T', "The Kesh")`. A letter followed by a repeat
/// sign (`A:|`) is music, not a field.
pub fn field_line(line: &str) -> Option<(char, &str)> {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    let name = chars.next().filter(char::is_ascii_alphabetic)?;
    if chars.next() != Some(':') {
        return None;
    }

    let value = &trimmed[2..];
    if value.starts_with(['|', ':']) {
        return None;
    }
    Some((name, value))
}

/// Drop a trailing `%` comment
pub fn strip_comment(value: &str) -> &str {
    match value.find('%') {
        Some(pos) => &value[..pos],
        None => value,
    }
}

/// Read the header of the first tune in `input`.
pub fn scan_header(input: &str) -> TuneHeader {
    let mut header = TuneHeader::default();

    for line in input.lines() {
        let Some((name, value)) = field_line(line) else {
            continue;
        };
        let value = strip_comment(value).trim();

        match name {
            'X' => header.reference = value.parse().ok(),
            'T' if header.title.is_none() => header.title = Some(value.to_string()),
            'R' => header.rhythm = Some(value.to_string()),
            'M' => header.meter = Some(value.to_string()),
            'K' => {
                header.key = Some(value.to_string());
                break;
            }
            _ => {}
        }
    }

    header
}
