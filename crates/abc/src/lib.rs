//! ABC notation for tin whistle and fiddle players.
//!
//! This crate reads the melody out of ABC tunes with key signatures and bar
//! accidentals applied, transposes ABC text, and looks up fingerings.
//!
//! # Example
//!
//! ```
//! use abc::{parse_notes, resolve_whistle_fingering, Hole, Pitch};
//!
//! let abc = r#"
//! X:1
//! T:Test Tune
//! M:4/4
//! L:1/8
//! K:D
//! DEFG ABcd|
//! "#;
//!
//! let events = parse_notes(abc);
//! assert_eq!(events[2].token(), "^F");
//!
//! let pitch: Pitch = events[0].token().parse().unwrap();
//! let fingering = resolve_whistle_fingering(&pitch, "D");
//! assert_eq!(fingering.holes, [Hole::Closed; 6]);
//! ```

pub mod ast;
pub mod error;
pub mod feedback;
pub mod fingering;
pub mod parser;
pub mod signature;
pub mod tablature;
pub mod transpose;

pub use ast::*;
pub use error::AbcError;
pub use feedback::{Feedback, FeedbackLevel, ParseResult};
pub use fingering::{
    recommend_whistle_key, resolve_fiddle_fingering, resolve_whistle_fingering, FiddleFingering,
    FiddleString, Finger, Hole, WhistleFingering, WhistleKey,
};
pub use parser::header::{scan_header, TuneHeader};
pub use signature::KeySignature;
pub use tablature::{render_text, tablature, Instrument, RenderOptions, TabEntry, TabSymbol};
pub use transpose::{transpose, transpose_with, TransposeOptions};

/// Extract the note and barline events of a tune.
///
/// Never fails; constructs that cannot be read are skipped. Use
/// [`parse_notes_with_feedback`] to find out what was skipped.
pub fn parse_notes(input: &str) -> Vec<NoteEvent> {
    parser::parse_notes(input).into_value()
}

/// Like [`parse_notes`], with warnings about unknown keys and notes on
/// anything that was skipped.
pub fn parse_notes_with_feedback(input: &str) -> ParseResult<Vec<NoteEvent>> {
    parser::parse_notes(input)
}
