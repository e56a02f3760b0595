//! Chord analysis: name a set of notes by matching root offsets

use serde::Serialize;

use crate::error::{Result, TheoryError};
use crate::pitch::{parse_notes, Pitch};
use crate::tables::PatternTables;

/// Outcome of [`analyze_chord`]. Serializes as `{root, type, notes}` or
/// `{root, type: "unknown", intervals}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordAnalysis {
    /// Lowest note
    pub root: String,
    /// Registered chord name, or `"unknown"`
    #[serde(rename = "type")]
    pub chord_type: String,
    #[serde(flatten)]
    pub outcome: ChordMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChordMatch {
    /// A registered chord matched exactly. `notes` are the input names as given.
    Known { notes: Vec<String> },
    /// Nothing matched; offsets of every note from the root, ascending.
    Unknown { intervals: Vec<u8> },
}

pub const UNKNOWN_CHORD: &str = "unknown";

impl ChordAnalysis {
    pub fn chord_type(&self) -> &str {
        &self.chord_type
    }

    pub fn is_known(&self) -> bool {
        matches!(self.outcome, ChordMatch::Known { .. })
    }
}

/// Offsets of each pitch from the lowest, ascending. Duplicates are kept.
pub fn root_offsets(pitches: &[Pitch]) -> Option<(Pitch, Vec<u8>)> {
    let mut sorted = pitches.to_vec();
    sorted.sort();
    let root = *sorted.first()?;
    let offsets = sorted.iter().map(|p| p.value() - root.value()).collect();
    Some((root, offsets))
}

/// Name a chord from at least two note names.
///
/// The lowest note is taken as the root. Its offset vector is compared
/// against every registered chord of the same length, in table order; the
/// first exact match wins. An unmatched chord is an `Unknown` result, not an
/// error. Any unparseable name fails the whole call.
pub fn analyze_chord<S: AsRef<str>>(tables: &PatternTables, notes: &[S]) -> Result<ChordAnalysis> {
    if notes.len() < 2 {
        return Err(TheoryError::TooFewNotes(notes.len()));
    }

    let pitches = parse_notes(notes)?;
    let Some((root, intervals)) = root_offsets(&pitches) else {
        return Err(TheoryError::TooFewNotes(0));
    };

    let (chord_type, outcome) = match tables.chords().iter().find(|c| c.semitones == intervals) {
        Some(chord) => (
            chord.name.clone(),
            ChordMatch::Known {
                notes: notes.iter().map(|n| n.as_ref().to_string()).collect(),
            },
        ),
        None => (UNKNOWN_CHORD.to_string(), ChordMatch::Unknown { intervals }),
    };

    Ok(ChordAnalysis {
        root: root.name(),
        chord_type,
        outcome,
    })
}
