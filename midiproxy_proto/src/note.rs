use core::fmt;

use serde::{Deserialize, Serialize};

/// Pitch class names, indexed by `note_number % 12`.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A MIDI note number, always in `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Note(u8);

impl Note {
    pub const MAX: u8 = 127;

    /// Returns `None` if `note_number` doesn't fit in 7 bits.
    #[inline(always)]
    pub const fn new(note_number: u8) -> Option<Self> {
        if note_number <= Self::MAX {
            Some(Self(note_number))
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The pitch class of this note, e.g. `"C#"`.
    #[inline(always)]
    pub const fn name(self) -> &'static str {
        NOTE_NAMES[(self.0 % 12) as usize]
    }

    /// The octave of this note, where note `60` is in octave `4`.
    ///
    /// Uses plain floor division, so notes `120..=127` report octave `9`, even
    /// though that octave is incomplete.
    #[inline(always)]
    pub const fn octave(self) -> i8 {
        // note_number / 12 is at most 10, the cast can't wrap
        (self.0 / 12) as i8 - 1
    }
}

impl TryFrom<u8> for Note {
    type Error = u8;

    /// On failure, the rejected value is returned.
    #[inline(always)]
    fn try_from(note_number: u8) -> Result<Self, Self::Error> {
        Self::new(note_number).ok_or(note_number)
    }
}

impl From<Note> for u8 {
    #[inline(always)]
    fn from(note: Note) -> Self {
        note.get()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_pitch() {
        let a4 = Note::new(69).unwrap();
        assert_eq!(a4.name(), "A");
        assert_eq!(a4.octave(), 4);
        assert_eq!(a4.to_string(), "A4");
    }

    #[test]
    fn lowest_note() {
        let c = Note::new(0).unwrap();
        assert_eq!(c.name(), "C");
        assert_eq!(c.octave(), -1);
        assert_eq!(c.to_string(), "C-1");
    }

    #[test]
    fn top_octave_uses_floor_division() {
        let g = Note::new(127).unwrap();
        assert_eq!(g.name(), "G");
        assert_eq!(g.octave(), 9);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(Note::new(128), None);
        assert_eq!(Note::try_from(200), Err(200));
    }

    #[test]
    fn serde_goes_through_validation() {
        let bytes = postcard::to_stdvec(&Note::new(60).unwrap()).unwrap();
        assert_eq!(postcard::from_bytes::<Note>(&bytes).unwrap().get(), 60);

        let bytes = postcard::to_stdvec(&200u8).unwrap();
        assert!(postcard::from_bytes::<Note>(&bytes).is_err());
    }

    proptest::proptest! {
        #[test]
        fn pitch_class_cycles(v in 0u8..=127) {
            let note = Note::new(v).unwrap();
            proptest::prop_assert_eq!(note.get(), v);
            proptest::prop_assert_eq!(note.name(), NOTE_NAMES[usize::from(v % 12)]);
            proptest::prop_assert_eq!(i16::from(note.octave()), i16::from(v / 12) - 1);
        }
    }
}
