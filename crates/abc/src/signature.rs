//! Key signatures.
//!
//! Every key is reduced to a position on the circle of fifths: the spelled
//! tonic's own position plus the mode's offset from major. That is the same
//! as looking up the relative major (Dorian two semitones below the tonic,
//! Mixolydian seven below) and reusing its table. Theoretical keys that land
//! past seven sharps or flats (`G#`, `Fb`) fall back to the conventional
//! major on the same chromatic index.

use serde::{Deserialize, Serialize};

use crate::ast::{Accidental, Key, Mode, NoteName};
use crate::parser::key::parse_key_field;

const SHARP_ORDER: [NoteName; 7] = [
    NoteName::F,
    NoteName::C,
    NoteName::G,
    NoteName::D,
    NoteName::A,
    NoteName::E,
    NoteName::B,
];

const FLAT_ORDER: [NoteName; 7] = [
    NoteName::B,
    NoteName::E,
    NoteName::A,
    NoteName::D,
    NoteName::G,
    NoteName::C,
    NoteName::F,
];

/// Circle-of-fifths position of the usual major key on each chromatic index:
/// C Db D Eb E F F# G Ab A Bb B
const MAJOR_FIFTHS_BY_SEMITONE: [i8; 12] = [0, -5, 2, -3, 4, -1, 6, 1, -4, 3, -2, 5];

/// Letter to implied accidental, for the seven natural letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySignature {
    accidentals: [Option<Accidental>; 7],
}

impl KeySignature {
    /// No sharps or flats
    pub fn empty() -> Self {
        Self::default()
    }

    /// Positive counts are sharps, negative counts flats. Clamped to seven.
    pub fn from_fifths(fifths: i8) -> Self {
        let mut accidentals = [None; 7];
        let count = usize::from(fifths.unsigned_abs().min(7));
        let (order, accidental) = if fifths >= 0 {
            (&SHARP_ORDER, Accidental::Sharp)
        } else {
            (&FLAT_ORDER, Accidental::Flat)
        };
        for letter in &order[..count] {
            accidentals[letter.index()] = Some(accidental);
        }
        KeySignature { accidentals }
    }

    /// Signature for a parsed key. Unrecognized modes get no accidentals.
    pub fn for_key(key: &Key) -> Self {
        match key.mode {
            Some(mode) => Self::from_fifths(key_fifths(key.root, key.accidental, mode)),
            None => Self::empty(),
        }
    }

    /// Signature for a key name such as `D`, `Am`, `EDor` or `Bb mix`.
    /// Anything unrecognized resolves to the empty signature.
    pub fn for_key_name(name: &str) -> Self {
        parse_key_field(name)
            .key
            .map(|key| Self::for_key(&key))
            .unwrap_or_default()
    }

    pub fn get(&self, letter: NoteName) -> Option<Accidental> {
        self.accidentals[letter.index()]
    }

    /// Semitone offset the signature applies to a bare letter
    pub fn offset(&self, letter: NoteName) -> i8 {
        self.get(letter).map_or(0, |a| a.to_semitone_offset())
    }

    /// Sharps as a positive count, flats as a negative one
    pub fn fifths(&self) -> i8 {
        self.accidentals
            .iter()
            .flatten()
            .map(|a| a.to_semitone_offset())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.accidentals.iter().all(Option::is_none)
    }

    /// Letters carrying an accidental, in C..B order
    pub fn entries(&self) -> impl Iterator<Item = (NoteName, Accidental)> + '_ {
        NoteName::all()
            .into_iter()
            .filter_map(|letter| self.get(letter).map(|a| (letter, a)))
    }
}

/// Circle-of-fifths position of a tonic and mode.
pub fn key_fifths(root: NoteName, accidental: Option<Accidental>, mode: Mode) -> i8 {
    let accidental = accidental.map_or(0, |a| a.to_semitone_offset());
    let spelled = root.fifths() + 7 * accidental + mode.fifths_offset();
    if (-7..=7).contains(&spelled) {
        return spelled;
    }

    let relative_major =
        root.to_semitone() + accidental - mode.semitones_above_relative_major();
    MAJOR_FIFTHS_BY_SEMITONE[relative_major.rem_euclid(12) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(name: &str) -> Vec<(NoteName, Accidental)> {
        KeySignature::for_key_name(name).entries().collect()
    }

    #[test]
    fn test_sharp_majors() {
        assert_eq!(KeySignature::for_key_name("C").fifths(), 0);
        assert_eq!(KeySignature::for_key_name("G").fifths(), 1);
        assert_eq!(
            entries("D"),
            vec![(NoteName::C, Accidental::Sharp), (NoteName::F, Accidental::Sharp)]
        );
        assert_eq!(KeySignature::for_key_name("A").fifths(), 3);
        assert_eq!(KeySignature::for_key_name("E").fifths(), 4);
        assert_eq!(KeySignature::for_key_name("B").fifths(), 5);
        assert_eq!(KeySignature::for_key_name("F#").fifths(), 6);
        assert_eq!(KeySignature::for_key_name("C#").fifths(), 7);
    }

    #[test]
    fn test_flat_majors() {
        assert_eq!(entries("F"), vec![(NoteName::B, Accidental::Flat)]);
        assert_eq!(
            entries("Bb"),
            vec![(NoteName::E, Accidental::Flat), (NoteName::B, Accidental::Flat)]
        );
        assert_eq!(KeySignature::for_key_name("Eb").fifths(), -3);
        assert_eq!(KeySignature::for_key_name("Ab").fifths(), -4);
        assert_eq!(KeySignature::for_key_name("Db").fifths(), -5);
        assert_eq!(KeySignature::for_key_name("Gb").fifths(), -6);
    }

    #[test]
    fn test_minors_use_relative_major() {
        assert_eq!(KeySignature::for_key_name("Am"), KeySignature::for_key_name("C"));
        assert_eq!(KeySignature::for_key_name("Em"), KeySignature::for_key_name("G"));
        assert_eq!(KeySignature::for_key_name("Bm"), KeySignature::for_key_name("D"));
        assert_eq!(KeySignature::for_key_name("F#m"), KeySignature::for_key_name("A"));
        assert_eq!(KeySignature::for_key_name("C#m"), KeySignature::for_key_name("E"));
        assert_eq!(KeySignature::for_key_name("G#m"), KeySignature::for_key_name("B"));
        assert_eq!(KeySignature::for_key_name("Dm"), KeySignature::for_key_name("F"));
        assert_eq!(KeySignature::for_key_name("Gm"), KeySignature::for_key_name("Bb"));
        assert_eq!(KeySignature::for_key_name("Cm"), KeySignature::for_key_name("Eb"));
        assert_eq!(KeySignature::for_key_name("Fm"), KeySignature::for_key_name("Ab"));
    }

    #[test]
    fn test_common_modal_keys() {
        assert_eq!(entries("DDor"), vec![]);
        assert_eq!(
            entries("EDor"),
            vec![(NoteName::C, Accidental::Sharp), (NoteName::F, Accidental::Sharp)]
        );
        assert_eq!(entries("ADor"), vec![(NoteName::F, Accidental::Sharp)]);
        assert_eq!(entries("GDor"), vec![(NoteName::B, Accidental::Flat)]);
        assert_eq!(entries("DMix"), vec![(NoteName::F, Accidental::Sharp)]);
        assert_eq!(entries("GMix"), vec![]);
        assert_eq!(
            entries("AMix"),
            vec![(NoteName::C, Accidental::Sharp), (NoteName::F, Accidental::Sharp)]
        );
    }

    #[test]
    fn test_modes_match_relative_major_shift() {
        for root in NoteName::all() {
            let tonic = root.to_semitone();
            let dorian = KeySignature::for_key(&Key::new(root, None, Mode::Dorian));
            let mixolydian = KeySignature::for_key(&Key::new(root, None, Mode::Mixolydian));

            assert_eq!(
                dorian.fifths(),
                MAJOR_FIFTHS_BY_SEMITONE[(tonic - 2).rem_euclid(12) as usize],
                "{:?} dorian",
                root
            );
            assert_eq!(
                mixolydian.fifths(),
                MAJOR_FIFTHS_BY_SEMITONE[(tonic - 7).rem_euclid(12) as usize],
                "{:?} mixolydian",
                root
            );
        }
    }

    #[test]
    fn test_theoretical_keys_fall_back() {
        // G# major would need eight sharps; it reads as Ab major
        assert_eq!(KeySignature::for_key_name("G#"), KeySignature::for_key_name("Ab"));
        assert_eq!(KeySignature::for_key_name("D#"), KeySignature::for_key_name("Eb"));
    }

    #[test]
    fn test_unknown_keys_are_empty() {
        assert!(KeySignature::for_key_name("HP").is_empty());
        assert!(KeySignature::for_key_name("none").is_empty());
        assert!(KeySignature::for_key_name("D xyz").is_empty());
        assert!(KeySignature::for_key_name("").is_empty());
    }

    #[test]
    fn test_offsets() {
        let sig = KeySignature::for_key_name("Bb");
        assert_eq!(sig.offset(NoteName::B), -1);
        assert_eq!(sig.offset(NoteName::C), 0);
    }
}
