//! Accidentals carried through a bar.

use crate::ast::{Accidental, NoteName};
use crate::signature::KeySignature;

/// Accidentals written earlier in the current bar, by letter.
///
/// Cleared at every barline and key change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarAccidentals {
    entries: [Option<Accidental>; 7],
}

impl BarAccidentals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries = [None; 7];
    }

    pub fn record(&mut self, letter: NoteName, accidental: Accidental) {
        self.entries[letter.index()] = Some(accidental);
    }

    pub fn get(&self, letter: NoteName) -> Option<Accidental> {
        self.entries[letter.index()]
    }

    /// What a bare letter means right now: bar first, then the key.
    pub fn implied(&self, letter: NoteName, key: &KeySignature) -> Option<Accidental> {
        self.get(letter).or_else(|| key.get(letter))
    }

    /// Effective accidental for a note. An explicit mark wins and is
    /// remembered for the rest of the bar.
    pub fn resolve(
        &mut self,
        letter: NoteName,
        explicit: Option<Accidental>,
        key: &KeySignature,
    ) -> Option<Accidental> {
        match explicit {
            Some(accidental) => {
                self.record(letter, accidental);
                Some(accidental)
            }
            None => self.implied(letter, key),
        }
    }
}
