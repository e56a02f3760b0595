//! gml-core: Music theory primitives for the GML tools
//!
//! Pitch/name/frequency conversion, scale and chord tables, chord analysis,
//! voice leading and species counterpoint checks. Everything here is pure:
//! no I/O, no shared mutable state.

pub mod adapters;
pub mod analysis;
pub mod counterpoint;
mod error;
pub mod knowledge;
pub mod pitch;
pub mod tables;
pub mod voice_leading;

pub use analysis::{analyze_chord, ChordAnalysis, ChordMatch};
pub use counterpoint::{validate_counterpoint, validate_pitches, Rule, RuleFamily, Species, Validation, Violation};
pub use error::{Result, TheoryError};
pub use knowledge::{ask, recommend, Answer, Book, InstrumentRange, Recommendation};
pub use pitch::{
    frequency_to_note, frequency_to_pitch, name_to_pitch, note_to_frequency,
    parse_notes, pitch_to_frequency, pitch_to_name, Pitch,
};
pub use tables::{standard_tables, ChordQuality, IntervalPattern, PatternTables, ScaleMode};
pub use voice_leading::{
    check_parallel_motion, nearest_voices, suggest_voice_leading, ParallelMotion, VoiceLeading,
};
