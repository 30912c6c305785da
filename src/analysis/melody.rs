//! Stateless melody analyzer
//!
//! Pure functions of the input sequence: no history, no cache. Wrap in
//! `CachedAnalyzer` for memoization.

use super::predict::predict_next;
use super::stats::{analyze_intervals, compute_complexity, mean, population_variance, unique_count};
use super::traits::{MelodyAnalysis, PatternAnalyzer, Prediction};

/// Successors kept per prediction
pub const DEFAULT_TOP_K: usize = 3;

/// Confidence reported whenever a prediction has candidates
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Melody statistics and bigram next-note prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MelodyAnalyzer {
    /// Maximum candidates returned by `predict_next`
    top_k: usize,
    /// Confidence attached to non-empty predictions
    confidence: f64,
}

impl MelodyAnalyzer {
    pub fn new() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Keep at most `top_k` prediction candidates
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Confidence to report for non-empty predictions
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Default for MelodyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternAnalyzer for MelodyAnalyzer {
    fn analyze_melody(&self, notes: &[i32]) -> MelodyAnalysis {
        let (Some(&min), Some(&max)) = (notes.iter().min(), notes.iter().max()) else {
            return MelodyAnalysis::empty();
        };

        let pitches: Vec<f64> = notes.iter().map(|&n| f64::from(n)).collect();

        MelodyAnalysis {
            mean_pitch: mean(&pitches),
            std_pitch: population_variance(&pitches).sqrt(),
            pitch_range: i64::from(max) - i64::from(min),
            unique_note_count: unique_count(notes),
            interval_stats: analyze_intervals(notes),
            complexity_score: compute_complexity(notes),
        }
    }

    fn predict_next(&self, recent: &[i32]) -> Prediction {
        predict_next(recent, self.top_k, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sequence_is_sentinel() {
        let analysis = MelodyAnalyzer::new().analyze_melody(&[]);
        assert!(analysis.is_empty());
        assert_eq!(analysis, MelodyAnalysis::empty());
    }

    #[test]
    fn test_single_note() {
        let analysis = MelodyAnalyzer::new().analyze_melody(&[60]);
        assert_eq!(analysis.mean_pitch, 60.0);
        assert_eq!(analysis.std_pitch, 0.0);
        assert_eq!(analysis.pitch_range, 0);
        assert_eq!(analysis.unique_note_count, 1);
        assert!(analysis.interval_stats.is_empty());
        assert_eq!(analysis.complexity_score, 0.0);
        assert!(!analysis.is_empty());
    }

    #[test]
    fn test_c_major_arpeggio() {
        let analysis = MelodyAnalyzer::new().analyze_melody(&[60, 64, 67, 72, 67, 64, 60]);
        assert_eq!(analysis.pitch_range, 12);
        assert_eq!(analysis.unique_note_count, 4);
        assert_eq!(analysis.interval_stats.ascending_steps, 3);
        assert_eq!(analysis.interval_stats.descending_steps, 3);
        assert_eq!(analysis.interval_stats.repeated_notes, 0);
        assert_eq!(analysis.interval_stats.mean_interval, 0.0);
        assert!((analysis.mean_pitch - 64.857142857).abs() < 1e-6);
    }

    #[test]
    fn test_std_pitch_is_population() {
        let analysis = MelodyAnalyzer::new().analyze_melody(&[2, 4, 6, 8]);
        assert_eq!(analysis.std_pitch, 5.0_f64.sqrt());
    }

    #[test]
    fn test_negative_and_large_keys() {
        let analysis = MelodyAnalyzer::new().analyze_melody(&[-10, i32::MAX, 0]);
        assert_eq!(analysis.pitch_range, i64::from(i32::MAX) + 10);
        assert_eq!(analysis.unique_note_count, 3);
    }

    #[test]
    fn test_custom_top_k_and_confidence() {
        let analyzer = MelodyAnalyzer::new().with_top_k(1).with_confidence(0.9);
        let prediction = analyzer.predict_next(&[60, 62, 60, 64, 60, 62, 60]);
        assert_eq!(prediction.candidates.len(), 1);
        assert_eq!(prediction.candidates[0].note, 62);
        assert_eq!(prediction.candidates[0].probability, 1.0);
        assert_eq!(prediction.confidence, 0.9);
    }
}
