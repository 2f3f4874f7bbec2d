//! Fingering lookup for tin whistle and fiddle.

pub mod fiddle;
pub mod whistle;

pub use fiddle::{resolve_fiddle_fingering, FiddleFingering, FiddleString, Finger};
pub use whistle::{
    recommend_whistle_key, resolve_whistle_fingering, Hole, WhistleFingering, WhistleKey,
};
