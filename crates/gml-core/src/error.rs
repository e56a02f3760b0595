//! Error types for gml-core

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TheoryError {
    #[error("Malformed note name: {0:?}")]
    MalformedNote(String),
    #[error("Pitch out of range: {0}")]
    OutOfRange(i64),
    #[error("Frequency must be positive: {0}")]
    InvalidFrequency(f64),
    #[error("Unknown scale: {0}")]
    UnknownScale(String),
    #[error("Unknown chord: {0}")]
    UnknownChord(String),
    #[error("Chord analysis needs at least 2 notes, got {0}")]
    TooFewNotes(usize),
    #[error("Destination chord is empty")]
    EmptyChord,
    #[error("Species must be 1-5, got {0}")]
    InvalidSpecies(u8),
    #[error("Pattern already registered: {0}")]
    DuplicatePattern(String),
    #[error("Invalid pattern {name}: {reason}")]
    InvalidPattern { name: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, TheoryError>;
