//! Static knowledge base: the three reference books and keyword queries

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pitch::Pitch;

/// Rule sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Book {
    Fux,
    Schoenberg,
    Rimsky,
}

impl Book {
    pub const ALL: [Book; 3] = [Self::Fux, Self::Schoenberg, Self::Rimsky];

    pub fn key(self) -> &'static str {
        match self {
            Self::Fux => "fux",
            Self::Schoenberg => "schoenberg",
            Self::Rimsky => "rimsky",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.key() == key)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Fux => "Gradus ad Parnassum",
            Self::Schoenberg => "Fundamentals of Musical Composition",
            Self::Rimsky => "Principles of Orchestration",
        }
    }

    pub fn author(self) -> &'static str {
        match self {
            Self::Fux => "Johann Joseph Fux",
            Self::Schoenberg => "Arnold Schoenberg",
            Self::Rimsky => "Nikolai Rimsky-Korsakov",
        }
    }
}

// ============================================================================
// Book contents
// ============================================================================

/// Fux's counterpoint rules
pub const FORBIDDEN: [&str; 3] = ["parallel_fifths", "parallel_octaves", "hidden_fifths"];
pub const REQUIRED: [&str; 2] = ["contrary_motion_preferred", "resolve_dissonance"];

/// Schoenberg's vocabulary
pub const CONCEPTS: [(&str, &str); 3] = [
    ("motif", "smallest_musical_idea"),
    ("phrase", "musical_sentence"),
    ("developing_variation", "true"),
];

/// Playable range of an instrument, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentRange {
    pub instrument: &'static str,
    pub low: Pitch,
    pub high: Pitch,
}

impl InstrumentRange {
    pub fn contains(&self, pitch: Pitch) -> bool {
        (self.low..=self.high).contains(&pitch)
    }
}

/// Rimsky-Korsakov's string ranges
pub const RANGES: [InstrumentRange; 3] = [
    InstrumentRange { instrument: "violin", low: Pitch::from_raw(55), high: Pitch::from_raw(100) }, // G3-E7
    InstrumentRange { instrument: "viola", low: Pitch::from_raw(48), high: Pitch::from_raw(88) },   // C3-E6
    InstrumentRange { instrument: "cello", low: Pitch::from_raw(36), high: Pitch::from_raw(81) },   // C2-A5
];

pub fn instrument_range(instrument: &str) -> Option<&'static InstrumentRange> {
    RANGES.iter().find(|r| r.instrument == instrument)
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Range(InstrumentRange),
    Text(&'static str),
}

/// Keyword lookup. Only books listed in `books` answer; an empty slice
/// means all books.
///
/// - "range" plus an instrument name: that range (rimsky)
/// - "parallel" plus "fifths": the prohibition (fux)
/// - "motif": the definition (schoenberg)
pub fn ask(question: &str, books: &[Book]) -> BTreeMap<Book, Answer> {
    let question = question.to_lowercase();
    let keywords: Vec<&str> = question
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .collect();
    let has = |word: &str| keywords.contains(&word);
    let consults = |book: Book| books.is_empty() || books.contains(&book);

    let mut results = BTreeMap::new();

    if has("range") && consults(Book::Rimsky) {
        if let Some(range) = keywords.iter().find_map(|w| instrument_range(w)) {
            results.insert(Book::Rimsky, Answer::Range(*range));
        }
    }

    if has("parallel") && has("fifths") && consults(Book::Fux) {
        results.insert(
            Book::Fux,
            Answer::Text("Forbidden: parallel fifths destroy independence of voices"),
        );
    }

    if has("motif") && consults(Book::Schoenberg) {
        results.insert(Book::Schoenberg, Answer::Text(CONCEPTS[0].1));
    }

    results
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub book: Book,
    pub advice: &'static str,
}

/// Advice for a working context (`voice_leading`, `orchestration`).
pub fn recommend(context: &str) -> Vec<Recommendation> {
    match context {
        "voice_leading" => vec![
            Recommendation { book: Book::Fux, advice: "Avoid parallel fifths and octaves" },
            Recommendation {
                book: Book::Schoenberg,
                advice: "Use developing variation to maintain coherence",
            },
        ],
        "orchestration" => vec![Recommendation {
            book: Book::Rimsky,
            advice: "Consider instrument ranges and timbral combinations",
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_constants_match_names() {
        assert_eq!(RANGES[0].low.name(), "G3");
        assert_eq!(RANGES[0].high.name(), "E7");
        assert_eq!(RANGES[1].low.name(), "C3");
        assert_eq!(RANGES[1].high.name(), "E6");
        assert_eq!(RANGES[2].low.name(), "C2");
        assert_eq!(RANGES[2].high.name(), "A5");
    }

    #[test]
    fn test_ask_violin_range() {
        let answers = ask("What is the range of the violin?", &[]);
        assert_eq!(answers.get(&Book::Rimsky), Some(&Answer::Range(RANGES[0])));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn test_ask_parallel_fifths_and_motif() {
        let answers = ask("parallel fifths in a motif", &[]);
        assert!(matches!(answers.get(&Book::Fux), Some(Answer::Text(t)) if t.contains("parallel fifths")));
        assert_eq!(answers.get(&Book::Schoenberg), Some(&Answer::Text("smallest_musical_idea")));
    }

    #[test]
    fn test_book_filter() {
        let answers = ask("parallel fifths in a motif", &[Book::Schoenberg]);
        assert_eq!(answers.keys().copied().collect::<Vec<_>>(), vec![Book::Schoenberg]);
        assert!(ask("violin range", &[Book::Fux]).is_empty());
    }

    #[test]
    fn test_nothing_matches() {
        assert!(ask("how loud is a trumpet", &[]).is_empty());
        assert!(ask("cello", &[]).is_empty());
    }

    #[test]
    fn test_recommend() {
        let advice = recommend("voice_leading");
        assert_eq!(advice.iter().map(|r| r.book).collect::<Vec<_>>(), vec![Book::Fux, Book::Schoenberg]);
        assert_eq!(recommend("orchestration")[0].book, Book::Rimsky);
        assert!(recommend("mixing").is_empty());
    }

    #[test]
    fn test_range_contains() {
        let cello = instrument_range("cello").unwrap();
        assert!(cello.contains(Pitch::parse("C2").unwrap()));
        assert!(!cello.contains(Pitch::parse("B1").unwrap()));
    }

    #[test]
    fn test_book_keys() {
        for book in Book::ALL {
            assert_eq!(Book::from_key(book.key()), Some(book));
        }
        assert_eq!(Book::from_key("bach"), None);
    }
}
