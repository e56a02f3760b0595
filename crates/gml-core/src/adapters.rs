//! Conversions to and from the sibling apps' note formats
//!
//! RiffGen speaks frequencies in Hz, QuartetEngine speaks MIDI note numbers.
//! Every function maps element-wise and keeps the list length; an entry that
//! cannot be converted becomes `None`.

use crate::pitch::Pitch;

/// RiffGen frequencies -> nearest note names
pub fn from_riffgen(frequencies: &[f64]) -> Vec<Option<String>> {
    frequencies
        .iter()
        .map(|&f| Pitch::from_frequency(f).ok().map(Pitch::name))
        .collect()
}

/// QuartetEngine MIDI numbers -> note names
pub fn from_quartet(midi: &[i64]) -> Vec<Option<String>> {
    midi.iter().map(|&m| Pitch::new(m).ok().map(Pitch::name)).collect()
}

/// Note names -> RiffGen frequencies
pub fn to_riffgen<S: AsRef<str>>(notes: &[S]) -> Vec<Option<f64>> {
    notes
        .iter()
        .map(|n| Pitch::parse(n.as_ref()).ok().map(Pitch::frequency))
        .collect()
}

/// Note names -> QuartetEngine MIDI numbers
pub fn to_quartet<S: AsRef<str>>(notes: &[S]) -> Vec<Option<u8>> {
    notes
        .iter()
        .map(|n| Pitch::parse(n.as_ref()).ok().map(Pitch::value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_riffgen() {
        assert_eq!(
            from_riffgen(&[440.0, 261.63, -1.0]),
            vec![Some("A4".to_string()), Some("C4".to_string()), None]
        );
    }

    #[test]
    fn test_from_quartet() {
        assert_eq!(
            from_quartet(&[60, 128, 0]),
            vec![Some("C4".to_string()), None, Some("C-1".to_string())]
        );
    }

    #[test]
    fn test_to_formats() {
        assert_eq!(to_quartet(&["C4", "nope", "G9"]), vec![Some(60), None, Some(127)]);
        let freqs = to_riffgen(&["A4", "x"]);
        assert!((freqs[0].unwrap() - 440.0).abs() < 1e-9);
        assert_eq!(freqs[1], None);
    }
}
