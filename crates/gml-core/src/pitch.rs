//! Pitch numbers, note names and frequencies
//!
//! A [`Pitch`] is a MIDI-style semitone number in 0..=127. Note names are
//! `<Letter>[#]<octave>` with sharps only, so each of the 128 pitches has
//! exactly one name and names round-trip through [`Pitch`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TheoryError};

/// Pitch-class names, C = 0
pub const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Concert pitch for A4
pub const A4_FREQUENCY: f64 = 440.0;
const A4_PITCH: f64 = 69.0;

/// A semitone number in 0..=127 (MIDI note number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pitch(u8);

impl Pitch {
    pub const MIN: Pitch = Pitch(0);
    pub const MAX: Pitch = Pitch(127);

    /// Checked constructor; anything outside 0..=127 is out of range.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=127).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TheoryError::OutOfRange(value))
        }
    }

    /// For compile-time tables. Caller keeps `value <= 127`.
    pub(crate) const fn from_raw(value: u8) -> Self {
        Self(value)
    }

    /// Parse `<Letter>[#]<octave>`, e.g. `C4`, `F#-1`, `A#9`.
    ///
    /// The whole string has to match. Flats and `E#`/`B#` are not note names.
    pub fn parse(name: &str) -> Result<Self> {
        let malformed = || TheoryError::MalformedNote(name.to_string());

        let class_len = if name.get(1..2) == Some("#") { 2 } else { 1 };
        let class = name.get(..class_len).ok_or_else(malformed)?;
        let pitch_class = NOTE_NAMES
            .iter()
            .position(|n| *n == class)
            .ok_or_else(malformed)? as i64;

        let octave_str = &name[class_len..];
        let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        // digits only, so a failed parse is an overflow
        let octave: i64 = octave_str.parse().map_err(|_| {
            TheoryError::OutOfRange(if octave_str.starts_with('-') { i64::MIN } else { i64::MAX })
        })?;

        let value = octave
            .saturating_add(1)
            .saturating_mul(12)
            .saturating_add(pitch_class);
        Self::new(value)
    }

    /// Nearest pitch to a frequency in Hz (A4 = 440).
    pub fn from_frequency(freq: f64) -> Result<Self> {
        if !freq.is_finite() || freq <= 0.0 {
            return Err(TheoryError::InvalidFrequency(freq));
        }
        let exact = 12.0 * (freq / A4_FREQUENCY).log2() + A4_PITCH;
        // half rounds up
        Self::new((exact + 0.5).floor() as i64)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn pitch_class(self) -> u8 {
        self.0 % 12
    }

    /// Octave number; C4 = 60
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    pub fn name(self) -> String {
        format!("{}{}", NOTE_NAMES[self.pitch_class() as usize], self.octave())
    }

    /// Equal-tempered frequency in Hz
    pub fn frequency(self) -> f64 {
        A4_FREQUENCY * 2.0_f64.powf((self.0 as f64 - A4_PITCH) / 12.0)
    }

    /// Move by `semitones`, failing if the result leaves 0..=127.
    pub fn transpose(self, semitones: i64) -> Result<Self> {
        Self::new(self.0 as i64 + semitones)
    }

    /// Unsigned distance between two pitches, mod 12.
    pub fn interval_class(self, other: Pitch) -> u8 {
        self.0.abs_diff(other.0) % 12
    }

    /// Unsigned distance in semitones.
    pub fn distance(self, other: Pitch) -> u8 {
        self.0.abs_diff(other.0)
    }
}

impl TryFrom<u8> for Pitch {
    type Error = TheoryError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value as i64)
    }
}

impl From<Pitch> for u8 {
    fn from(pitch: Pitch) -> u8 {
        pitch.0
    }
}

impl FromStr for Pitch {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NOTE_NAMES[self.pitch_class() as usize], self.octave())
    }
}

// ============================================================================
// Free-function API
// ============================================================================

pub fn name_to_pitch(name: &str) -> Result<Pitch> {
    Pitch::parse(name)
}

pub fn pitch_to_name(pitch: i64) -> Result<String> {
    Pitch::new(pitch).map(Pitch::name)
}

pub fn pitch_to_frequency(pitch: Pitch) -> f64 {
    pitch.frequency()
}

pub fn frequency_to_pitch(freq: f64) -> Result<Pitch> {
    Pitch::from_frequency(freq)
}

pub fn note_to_frequency(name: &str) -> Result<f64> {
    Pitch::parse(name).map(Pitch::frequency)
}

pub fn frequency_to_note(freq: f64) -> Result<String> {
    Pitch::from_frequency(freq).map(Pitch::name)
}

/// Parse a list of note names, failing on the first bad one.
pub fn parse_notes<S: AsRef<str>>(names: &[S]) -> Result<Vec<Pitch>> {
    names.iter().map(|n| Pitch::parse(n.as_ref())).collect()
}
