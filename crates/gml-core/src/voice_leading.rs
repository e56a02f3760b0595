//! Voice leading: parallel-motion check and nearest-note suggestions

use serde::Serialize;

use crate::counterpoint::Rule;
use crate::error::{Result, TheoryError};
use crate::knowledge::Book;
use crate::pitch::{parse_notes, Pitch};

/// Interval class of a perfect fifth
const FIFTH: u8 = 7;
/// Interval class of a unison/octave
const OCTAVE: u8 = 0;

/// A forbidden parallel between two voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelMotion {
    Fifths,
    Octaves,
}

impl ParallelMotion {
    pub fn rule(self) -> Rule {
        match self {
            Self::Fifths => Rule::ParallelFifths,
            Self::Octaves => Rule::ParallelOctaves,
        }
    }
}

/// Compare the interval class between two voices at the start and at the
/// end of a move.
///
/// Only the interval class counts. Direction of motion is ignored, so a
/// fifth that becomes a twelfth by contrary motion is still reported.
pub fn check_parallel_motion(
    v1_start: Pitch,
    v1_end: Pitch,
    v2_start: Pitch,
    v2_end: Pitch,
) -> Option<ParallelMotion> {
    let start = v1_start.interval_class(v2_start);
    let end = v1_end.interval_class(v2_end);

    match (start, end) {
        (FIFTH, FIFTH) => Some(ParallelMotion::Fifths),
        (OCTAVE, OCTAVE) => Some(ParallelMotion::Octaves),
        _ => None,
    }
}

/// Nearest destination pitch for each source pitch, in source order.
///
/// Ties go to whichever candidate appears first in `to`. The same
/// destination pitch may be picked for several sources.
pub fn nearest_voices(from: &[Pitch], to: &[Pitch]) -> Result<Vec<Pitch>> {
    let Some((&first, rest)) = to.split_first() else {
        return Err(TheoryError::EmptyChord);
    };

    Ok(from
        .iter()
        .map(|&source| {
            rest.iter().fold(first, |best, &candidate| {
                if candidate.distance(source) < best.distance(source) { candidate } else { best }
            })
        })
        .collect())
}

/// A suggested move from one chord to the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceLeading {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub method: &'static str,
    pub book: Book,
}

/// Closest-note voice leading between two chords given as note names.
pub fn suggest_voice_leading<S: AsRef<str>>(
    from: &[S],
    to: &[S],
    book: Option<Book>,
) -> Result<VoiceLeading> {
    let sources = parse_notes(from)?;
    let targets = parse_notes(to)?;
    let chosen = nearest_voices(&sources, &targets)?;

    Ok(VoiceLeading {
        from: from.iter().map(|n| n.as_ref().to_string()).collect(),
        to: chosen.into_iter().map(Pitch::name).collect(),
        method: "closest",
        book: book.unwrap_or(Book::Schoenberg),
    })
}
