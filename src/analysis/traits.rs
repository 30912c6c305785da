//! Analysis trait definitions and result records

use serde::{Deserialize, Serialize};

/// Melody analyzer trait - allows swapping between the plain engine and
/// memoizing wrappers
///
/// Neither operation fails: too little data yields an empty record.
pub trait PatternAnalyzer {
    /// Aggregate statistics over a whole note sequence
    fn analyze_melody(&self, notes: &[i32]) -> MelodyAnalysis;

    /// Ranked next-note candidates after the last note of `recent`
    /// (chronological order, most recent note last)
    fn predict_next(&self, recent: &[i32]) -> Prediction;
}

impl<A: PatternAnalyzer + ?Sized> PatternAnalyzer for &A {
    fn analyze_melody(&self, notes: &[i32]) -> MelodyAnalysis {
        (**self).analyze_melody(notes)
    }

    fn predict_next(&self, recent: &[i32]) -> Prediction {
        (**self).predict_next(recent)
    }
}

/// Statistics for a whole note sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MelodyAnalysis {
    /// Arithmetic mean of the key numbers
    pub mean_pitch: f64,

    /// Population standard deviation of the key numbers
    pub std_pitch: f64,

    /// max - min
    pub pitch_range: i64,

    /// Count of distinct key numbers
    #[serde(rename = "unique_notes")]
    pub unique_note_count: usize,

    /// Consecutive-interval statistics
    #[serde(rename = "intervals")]
    pub interval_stats: IntervalStats,

    /// Diversity/interval-variance blend in [0, 1]
    pub complexity_score: f64,
}

impl MelodyAnalysis {
    /// The "no data" record returned for an empty sequence
    pub fn empty() -> Self {
        Self::default()
    }

    /// True for the "no data" record
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Statistics over consecutive differences of a note sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    /// Arithmetic mean of the differences
    pub mean_interval: f64,

    /// Differences > 0
    pub ascending_steps: usize,

    /// Differences < 0
    pub descending_steps: usize,

    /// Differences == 0
    pub repeated_notes: usize,
}

impl IntervalStats {
    /// Number of intervals the counts were taken over
    pub fn total_steps(&self) -> usize {
        self.ascending_steps + self.descending_steps + self.repeated_notes
    }

    /// True for the "no data" record
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A ranked next-note candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Predicted key number
    pub note: i32,

    /// Share of the emitted candidates' counts, in [0, 1]
    pub probability: f64,
}

/// Next-note prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Candidates by descending frequency
    #[serde(rename = "predictions")]
    pub candidates: Vec<Candidate>,

    /// Fixed policy value when candidates exist, 0.0 otherwise
    pub confidence: f64,
}

impl Prediction {
    /// Prediction with no candidates and zero confidence
    pub fn none() -> Self {
        Self::default()
    }

    /// True when nothing could be predicted
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Highest-ranked candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}
