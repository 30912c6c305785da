//! First-order (bigram) next-note model
//!
//! The table is rebuilt from the given window on every call; nothing
//! is learned across calls.

use super::traits::{Candidate, Prediction};
use std::collections::HashMap;

/// Successor counts per note, successors kept in first-seen order
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    transitions: HashMap<i32, Vec<(i32, u32)>>,
}

impl TransitionTable {
    /// Count every consecutive `(current, next)` pair of `notes`
    pub fn from_sequence(notes: &[i32]) -> Self {
        let mut table = Self::default();
        for pair in notes.windows(2) {
            table.record(pair[0], pair[1]);
        }
        table
    }

    fn record(&mut self, current: i32, next: i32) {
        let successors = self.transitions.entry(current).or_default();
        match successors.iter_mut().find(|(note, _)| *note == next) {
            Some((_, count)) => *count += 1,
            None => successors.push((next, 1)),
        }
    }

    /// Successors of `note` with counts, in first-seen order
    pub fn successors(&self, note: i32) -> &[(i32, u32)] {
        self.transitions
            .get(&note)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct notes with at least one recorded successor
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if no transition was recorded
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The `top_k` most frequent successors of `note`, ties in first-seen
    /// order. Probabilities are normalized over the returned set only.
    pub fn ranked(&self, note: i32, top_k: usize) -> Vec<Candidate> {
        let mut ranked = self.successors(note).to_vec();
        // stable: equal counts stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(top_k);

        let total: u64 = ranked.iter().map(|&(_, count)| u64::from(count)).sum();
        if total == 0 {
            return Vec::new();
        }

        ranked
            .into_iter()
            .map(|(note, count)| Candidate {
                note,
                probability: count as f64 / total as f64,
            })
            .collect()
    }
}

/// Predict what follows the last note of `recent`
///
/// Empty prediction when fewer than two notes or when the last note was
/// never followed by anything inside the window.
pub fn predict_next(recent: &[i32], top_k: usize, confidence: f64) -> Prediction {
    if recent.len() < 2 {
        return Prediction::none();
    }
    let last = recent[recent.len() - 1];

    let table = TransitionTable::from_sequence(recent);
    let candidates = table.ranked(last, top_k);
    if candidates.is_empty() {
        log::debug!("No recorded successor for note {}", last);
        return Prediction::none();
    }

    Prediction {
        candidates,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_accumulates_counts() {
        let table = TransitionTable::from_sequence(&[60, 62, 60, 62, 60, 64]);
        assert_eq!(table.successors(60), &[(62, 2), (64, 1)]);
        assert_eq!(table.successors(62), &[(60, 2)]);
        assert!(table.successors(64).is_empty());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ranked_ties_keep_first_seen_order() {
        // successors of 60 in order: 67, 64, 62 - all once, then 62 again
        let table = TransitionTable::from_sequence(&[60, 67, 60, 64, 60, 62, 60, 62]);
        let ranked = table.ranked(60, 3);
        let notes: Vec<i32> = ranked.iter().map(|c| c.note).collect();
        assert_eq!(notes, vec![62, 67, 64]);
    }

    #[test]
    fn test_ranked_normalizes_over_kept_set() {
        // 60 -> 61 x2, 62, 63, 64
        let table = TransitionTable::from_sequence(&[60, 61, 60, 61, 60, 62, 60, 63, 60, 64, 60]);
        let ranked = table.ranked(60, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0], Candidate { note: 61, probability: 0.5 });
        assert_eq!(ranked[1], Candidate { note: 62, probability: 0.25 });
        assert_eq!(ranked[2], Candidate { note: 63, probability: 0.25 });
    }

    #[test]
    fn test_predict_unknown_last_note() {
        let prediction = predict_next(&[60, 62, 60, 64], 3, 0.6);
        assert_eq!(prediction, Prediction::none());
    }

    #[test]
    fn test_predict_two_notes() {
        // 62 only ever appears as a successor
        assert!(predict_next(&[60, 62], 3, 0.6).is_empty());
    }

    #[test]
    fn test_predict_self_loop() {
        let prediction = predict_next(&[60, 60], 3, 0.6);
        assert_eq!(prediction.candidates, vec![Candidate { note: 60, probability: 1.0 }]);
        assert_eq!(prediction.confidence, 0.6);
    }

    #[test]
    fn test_zero_top_k_predicts_nothing() {
        let prediction = predict_next(&[60, 62, 60], 0, 0.6);
        assert_eq!(prediction, Prediction::none());
    }
}
