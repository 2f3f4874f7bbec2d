//! ABC note extraction.
//!
//! The parser is generous: it never fails. Header lines before the first
//! `K:` are skipped, anything in the body it does not understand is dropped,
//! and the feedback collector records what was guessed at along the way.

pub mod body;
pub mod header;
pub mod key;
pub mod note;
pub mod scope;

use crate::ast::{Accidental, NoteEvent};
use crate::feedback::{FeedbackCollector, ParseResult};
use crate::signature::KeySignature;

use body::{Lexer, Token};
use header::{field_line, strip_comment};
use key::parse_key_field;
use note::NoteToken;
use scope::BarAccidentals;

/// Extract note and barline events from ABC text.
pub fn parse_notes(input: &str) -> ParseResult<Vec<NoteEvent>> {
    let mut collector = FeedbackCollector::new();
    let mut events = Vec::new();
    let mut body: Option<BodyState> = None;

    for (index, line) in input.lines().enumerate() {
        let line_num = index + 1;
        collector.set_position(line_num, 1);

        if line.trim_start().starts_with('%') {
            continue;
        }

        if let Some((name, value)) = field_line(line) {
            if name == 'K' {
                let signature = resolve_key(value, &mut collector);
                match body.as_mut() {
                    Some(state) => state.change_key(signature),
                    None => body = Some(BodyState::new(signature)),
                }
            }
            continue;
        }

        if let Some(state) = body.as_mut() {
            state.scan_line(line, line_num, &mut events, &mut collector);
        }
    }

    if body.is_none() && !input.trim().is_empty() {
        collector.set_position(1, 1);
        collector.warning("No K: field found; nothing after the header was read");
    }

    ParseResult::new(events, collector.into_feedback())
}

/// Key signature for a `K:` value, warning when it cannot be resolved.
pub(crate) fn resolve_key(value: &str, collector: &mut FeedbackCollector) -> KeySignature {
    let value = strip_comment(value);
    let field = parse_key_field(value);

    match field.key {
        Some(key) if key.mode.is_some() => {
            let signature = KeySignature::for_key(&key);
            tracing::debug!(key = %key, fifths = signature.fifths(), "key change");
            signature
        }
        Some(key) => {
            collector.warning(format!(
                "Unrecognized mode '{}' for {}, no accidentals applied",
                field.rest.trim(),
                key.tonic_name()
            ));
            KeySignature::empty()
        }
        None if field.is_blank() => KeySignature::empty(),
        None => {
            collector.warning(format!(
                "Unrecognized key '{}', no accidentals applied",
                value.trim()
            ));
            KeySignature::empty()
        }
    }
}

/// Key and bar state once the body has started.
struct BodyState {
    signature: KeySignature,
    bar: BarAccidentals,
}

impl BodyState {
    fn new(signature: KeySignature) -> Self {
        BodyState {
            signature,
            bar: BarAccidentals::new(),
        }
    }

    fn change_key(&mut self, signature: KeySignature) {
        self.signature = signature;
        self.bar.reset();
    }

    fn scan_line(
        &mut self,
        line: &str,
        line_num: usize,
        events: &mut Vec<NoteEvent>,
        collector: &mut FeedbackCollector,
    ) {
        // Some(emitted) while inside [...]
        let mut chord: Option<bool> = None;
        let mut in_grace = false;

        for lexeme in Lexer::new(line) {
            collector.set_position(line_num, lexeme.column);

            match lexeme.token {
                Token::Barline => {
                    self.bar.reset();
                    chord = None;
                    events.push(NoteEvent::barline(lexeme.text));
                }
                Token::InlineField { name: 'K', value } => {
                    let signature = resolve_key(value, collector);
                    self.change_key(signature);
                }
                Token::GraceOpen => in_grace = true,
                Token::GraceClose => in_grace = false,
                Token::ChordOpen => chord = Some(false),
                Token::ChordClose => chord = None,
                Token::Note(_) if in_grace => {}
                Token::Note(note) => match chord {
                    None => events.push(self.resolve(&note)),
                    Some(false) if !note.is_rest() => {
                        events.push(self.resolve(&note));
                        chord = Some(true);
                    }
                    // Later chord members still set accidentals for the bar
                    Some(_) => {
                        self.resolve(&note);
                    }
                },
                Token::Unterminated(c) => {
                    collector.info(format!("Unterminated '{}' skipped to end of line", c));
                }
                Token::Comment => break,
                _ => tracing::trace!(text = lexeme.text, "skipped"),
            }
        }
    }

    /// Attach the effective accidental to a note token.
    fn resolve(&mut self, note: &NoteToken<'_>) -> NoteEvent {
        let Some(letter) = note.note_name() else {
            return NoteEvent::note(note.letter.to_string());
        };

        let accidental = self
            .bar
            .resolve(letter, note.explicit_accidental(), &self.signature);
        let prefix = accidental.map_or("", |a: Accidental| a.abc_prefix());
        NoteEvent::note(format!("{}{}{}", prefix, note.letter, note.octave_marks))
    }
}
