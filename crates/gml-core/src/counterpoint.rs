//! Species counterpoint validation (Fux)
//!
//! Walks the cantus firmus and the added voice position by position. At
//! each position:
//! 1. first species only: a dissonant interval class between the voices is
//!    reported as `dissonance_on_strong_beat`;
//! 2. from the second position on: parallel fifths/octaves against the
//!    previous position (see [`check_parallel_motion`]).
//!
//! Violations come out in position order, dissonance before parallels at
//! the same position. Species 2-5 only get the parallel check.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TheoryError};
use crate::knowledge::Book;
use crate::pitch::{parse_notes, Pitch};
use crate::voice_leading::check_parallel_motion;

/// Minor/major second, tritone, minor/major seventh; the fourth (5) counts
/// as dissonant against the bass.
pub const DISSONANT_CLASSES: [u8; 6] = [1, 2, 5, 6, 10, 11];

/// Fux's five species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    #[default]
    NoteAgainstNote,
    TwoAgainstOne,
    FourAgainstOne,
    Syncopation,
    Florid,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Self::NoteAgainstNote,
        Self::TwoAgainstOne,
        Self::FourAgainstOne,
        Self::Syncopation,
        Self::Florid,
    ];

    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1..=5 => Ok(Self::ALL[number as usize - 1]),
            _ => Err(TheoryError::InvalidSpecies(number)),
        }
    }

    pub fn number(self) -> u8 {
        Self::ALL.iter().position(|&s| s == self).map_or(1, |i| i as u8 + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NoteAgainstNote => "note_against_note",
            Self::TwoAgainstOne => "two_against_one",
            Self::FourAgainstOne => "four_against_one",
            Self::Syncopation => "syncopation",
            Self::Florid => "florid",
        }
    }
}

/// Rule identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    DissonanceOnStrongBeat,
    ParallelFifths,
    ParallelOctaves,
}

/// Coarser grouping of rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    Dissonance,
    ParallelOctavesOrFifths,
}

impl Rule {
    pub fn id(self) -> &'static str {
        match self {
            Self::DissonanceOnStrongBeat => "dissonance_on_strong_beat",
            Self::ParallelFifths => "parallel_fifths",
            Self::ParallelOctaves => "parallel_octaves",
        }
    }

    pub fn family(self) -> RuleFamily {
        match self {
            Self::DissonanceOnStrongBeat => RuleFamily::Dissonance,
            Self::ParallelFifths | Self::ParallelOctaves => RuleFamily::ParallelOctavesOrFifths,
        }
    }
}

impl RuleFamily {
    pub fn id(self) -> &'static str {
        match self {
            Self::Dissonance => "dissonance",
            Self::ParallelOctavesOrFifths => "parallel_octaves_or_fifths",
        }
    }
}

/// A rule broken at a position (0-based, the measure index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub position: usize,
    pub rule: Rule,
    /// Always `rule.family()`
    pub family: RuleFamily,
    pub source: Book,
}

impl Violation {
    pub fn new(position: usize, rule: Rule, source: Book) -> Self {
        Self {
            position,
            rule,
            family: rule.family(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl Validation {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}

/// Validate two pitch lines. Positions past the shorter line are ignored.
pub fn validate_pitches(cantus: &[Pitch], counterpoint: &[Pitch], species: Species) -> Validation {
    let mut violations = Vec::new();
    let len = cantus.len().min(counterpoint.len());

    for i in 0..len {
        let interval = cantus[i].interval_class(counterpoint[i]);
        if species == Species::NoteAgainstNote && DISSONANT_CLASSES.contains(&interval) {
            violations.push(Violation::new(i, Rule::DissonanceOnStrongBeat, Book::Fux));
        }

        if i > 0 {
            if let Some(parallel) =
                check_parallel_motion(cantus[i - 1], cantus[i], counterpoint[i - 1], counterpoint[i])
            {
                violations.push(Violation::new(i, parallel.rule(), Book::Fux));
            }
        }
    }

    Validation::from_violations(violations)
}

/// Validate two lines given as note names. Any bad name fails the call.
pub fn validate_counterpoint<S: AsRef<str>>(
    cantus: &[S],
    counterpoint: &[S],
    species: Species,
) -> Result<Validation> {
    let cantus = parse_notes(cantus)?;
    let counterpoint = parse_notes(counterpoint)?;
    Ok(validate_pitches(&cantus, &counterpoint, species))
}
