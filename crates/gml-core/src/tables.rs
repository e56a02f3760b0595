//! Scale and chord pattern tables

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TheoryError};
use crate::pitch::Pitch;

// ============================================================================
// Built-in Scale and Chord Types
// ============================================================================

/// Built-in scale/mode types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    Chromatic,
}

impl ScaleMode {
    /// Registration order of the built-in table
    pub const ALL: [ScaleMode; 13] = [
        Self::Major,
        Self::Minor,
        Self::Dorian,
        Self::Phrygian,
        Self::Lydian,
        Self::Mixolydian,
        Self::Locrian,
        Self::HarmonicMinor,
        Self::MelodicMinor,
        Self::PentatonicMajor,
        Self::PentatonicMinor,
        Self::Blues,
        Self::Chromatic,
    ];

    /// Semitone steps walked upward from the root
    pub fn steps(&self) -> &'static [u8] {
        match self {
            Self::Major => &[2, 2, 1, 2, 2, 2, 1],
            Self::Minor => &[2, 1, 2, 2, 1, 2, 2],
            Self::Dorian => &[2, 1, 2, 2, 2, 1, 2],
            Self::Phrygian => &[1, 2, 2, 2, 1, 2, 2],
            Self::Lydian => &[2, 2, 2, 1, 2, 2, 1],
            Self::Mixolydian => &[2, 2, 1, 2, 2, 1, 2],
            Self::Locrian => &[1, 2, 2, 1, 2, 2, 2],
            Self::HarmonicMinor => &[2, 1, 2, 2, 1, 3, 1],
            Self::MelodicMinor => &[2, 1, 2, 2, 2, 2, 1],
            Self::PentatonicMajor => &[2, 2, 3, 2, 3],
            Self::PentatonicMinor => &[3, 2, 2, 3, 2],
            Self::Blues => &[3, 2, 1, 1, 3, 2],
            Self::Chromatic => &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        }
    }

    /// Table key
    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Dorian => "dorian",
            Self::Phrygian => "phrygian",
            Self::Lydian => "lydian",
            Self::Mixolydian => "mixolydian",
            Self::Locrian => "locrian",
            Self::HarmonicMinor => "harmonic_minor",
            Self::MelodicMinor => "melodic_minor",
            Self::PentatonicMajor => "pentatonic_major",
            Self::PentatonicMinor => "pentatonic_minor",
            Self::Blues => "blues",
            Self::Chromatic => "chromatic",
        }
    }
}

/// Built-in chord qualities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Major7,
    Minor7,
    Dominant7,
    HalfDiminished7,
    Diminished7,
    Major9,
    Minor9,
    Dominant9,
    Major11,
    Minor11,
    Dominant11,
    Major13,
    Dominant13,
}

impl ChordQuality {
    /// Registration order of the built-in table. Analysis takes the first
    /// match in this order.
    pub const ALL: [ChordQuality; 19] = [
        Self::Major,
        Self::Minor,
        Self::Diminished,
        Self::Augmented,
        Self::Sus2,
        Self::Sus4,
        Self::Major7,
        Self::Minor7,
        Self::Dominant7,
        Self::HalfDiminished7,
        Self::Diminished7,
        Self::Major9,
        Self::Minor9,
        Self::Dominant9,
        Self::Major11,
        Self::Minor11,
        Self::Dominant11,
        Self::Major13,
        Self::Dominant13,
    ];

    /// Get chord intervals from root
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::Augmented => &[0, 4, 8],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
            Self::Major7 => &[0, 4, 7, 11],
            Self::Minor7 => &[0, 3, 7, 10],
            Self::Dominant7 => &[0, 4, 7, 10],
            Self::HalfDiminished7 => &[0, 3, 6, 10],
            Self::Diminished7 => &[0, 3, 6, 9],
            Self::Major9 => &[0, 4, 7, 11, 14],
            Self::Minor9 => &[0, 3, 7, 10, 14],
            Self::Dominant9 => &[0, 4, 7, 10, 14],
            Self::Major11 => &[0, 4, 7, 11, 14, 17],
            Self::Minor11 => &[0, 3, 7, 10, 14, 17],
            Self::Dominant11 => &[0, 4, 7, 10, 14, 17],
            Self::Major13 => &[0, 4, 7, 11, 14, 17, 21],
            Self::Dominant13 => &[0, 4, 7, 10, 14, 17, 21],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Diminished => "dim",
            Self::Augmented => "aug",
            Self::Sus2 => "sus2",
            Self::Sus4 => "sus4",
            Self::Major7 => "maj7",
            Self::Minor7 => "min7",
            Self::Dominant7 => "dom7",
            Self::HalfDiminished7 => "min7b5",
            Self::Diminished7 => "dim7",
            Self::Major9 => "maj9",
            Self::Minor9 => "min9",
            Self::Dominant9 => "dom9",
            Self::Major11 => "maj11",
            Self::Minor11 => "min11",
            Self::Dominant11 => "dom11",
            Self::Major13 => "maj13",
            Self::Dominant13 => "dom13",
        }
    }
}

// ============================================================================
// Pattern Tables
// ============================================================================

/// A named interval pattern: steps for scales, root offsets for chords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPattern {
    pub name: String,
    pub semitones: Vec<u8>,
}

impl IntervalPattern {
    pub fn new(name: &str, semitones: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            semitones: semitones.to_vec(),
        }
    }
}

/// Scale and chord registries. Built once, then shared by reference.
///
/// Iteration order is registration order: built-ins first, then anything
/// added with [`PatternTables::with_scale`] / [`PatternTables::with_chord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternTables {
    scales: Vec<IntervalPattern>,
    chords: Vec<IntervalPattern>,
}

impl Default for PatternTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternTables {
    /// The built-in scale and chord tables
    pub fn standard() -> Self {
        Self {
            scales: ScaleMode::ALL
                .iter()
                .map(|s| IntervalPattern::new(s.name(), s.steps()))
                .collect(),
            chords: ChordQuality::ALL
                .iter()
                .map(|c| IntervalPattern::new(c.name(), c.intervals()))
                .collect(),
        }
    }

    /// Register an extra scale. Steps must be non-empty and non-zero.
    pub fn with_scale(mut self, name: &str, steps: &[u8]) -> Result<Self> {
        if self.scale(name).is_some() {
            return Err(TheoryError::DuplicatePattern(name.to_string()));
        }
        if steps.is_empty() || steps.contains(&0) {
            return Err(TheoryError::InvalidPattern {
                name: name.to_string(),
                reason: "scale steps must be non-empty and non-zero",
            });
        }
        self.scales.push(IntervalPattern::new(name, steps));
        Ok(self)
    }

    /// Register an extra chord. Offsets start at 0, strictly ascend, and
    /// must not duplicate another chord's offsets.
    pub fn with_chord(mut self, name: &str, offsets: &[u8]) -> Result<Self> {
        if self.chord(name).is_some() {
            return Err(TheoryError::DuplicatePattern(name.to_string()));
        }
        if offsets.first() != Some(&0) || !offsets.windows(2).all(|w| w[0] < w[1]) {
            return Err(TheoryError::InvalidPattern {
                name: name.to_string(),
                reason: "chord offsets must start at 0 and strictly ascend",
            });
        }
        if self.chords.iter().any(|c| c.semitones == offsets) {
            return Err(TheoryError::InvalidPattern {
                name: name.to_string(),
                reason: "offsets already registered under another name",
            });
        }
        self.chords.push(IntervalPattern::new(name, offsets));
        Ok(self)
    }

    pub fn scales(&self) -> &[IntervalPattern] {
        &self.scales
    }

    pub fn chords(&self) -> &[IntervalPattern] {
        &self.chords
    }

    pub fn scale(&self, name: &str) -> Option<&IntervalPattern> {
        self.scales.iter().find(|s| s.name == name)
    }

    pub fn chord(&self, name: &str) -> Option<&IntervalPattern> {
        self.chords.iter().find(|c| c.name == name)
    }

    /// Walk upward from `root` by each step of the pattern. Stops at the
    /// first step that would pass pitch 127.
    pub fn scale_pitches(&self, root: Pitch, pattern: &str) -> Result<Vec<Pitch>> {
        let scale = self
            .scale(pattern)
            .ok_or_else(|| TheoryError::UnknownScale(pattern.to_string()))?;

        let mut pitches = vec![root];
        let mut current = root;
        for &step in &scale.semitones {
            let Ok(next) = current.transpose(step as i64) else { break };
            pitches.push(next);
            current = next;
        }
        Ok(pitches)
    }

    /// Root plus each offset; members above 127 are dropped.
    pub fn chord_pitches(&self, root: Pitch, pattern: &str) -> Result<Vec<Pitch>> {
        let chord = self
            .chord(pattern)
            .ok_or_else(|| TheoryError::UnknownChord(pattern.to_string()))?;

        Ok(chord
            .semitones
            .iter()
            .map_while(|&offset| root.transpose(offset as i64).ok())
            .collect())
    }

    /// Scale as note names, e.g. `generate_scale("C4", "major")`.
    pub fn generate_scale(&self, root: &str, pattern: &str) -> Result<Vec<String>> {
        let root = Pitch::parse(root)?;
        Ok(self.scale_pitches(root, pattern)?.into_iter().map(Pitch::name).collect())
    }

    /// Chord as note names, e.g. `build_chord("C4", "maj7")`.
    pub fn build_chord(&self, root: &str, pattern: &str) -> Result<Vec<String>> {
        let root = Pitch::parse(root)?;
        Ok(self.chord_pitches(root, pattern)?.into_iter().map(Pitch::name).collect())
    }
}

/// Process-wide built-in tables
pub fn standard_tables() -> &'static PatternTables {
    static TABLES: OnceLock<PatternTables> = OnceLock::new();
    TABLES.get_or_init(PatternTables::standard)
}
