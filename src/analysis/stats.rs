//! Descriptive statistics over note sequences
//!
//! Differences are taken in `i64` so arbitrary `i32` key numbers
//! cannot overflow.

use super::traits::IntervalStats;
use std::collections::HashSet;

/// Interval variance that saturates the variance half of the complexity score
const INTERVAL_VARIANCE_SCALE: f64 = 100.0;

/// Arithmetic mean; 0.0 for empty input
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (denominator n); 0.0 for empty input
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Consecutive differences `notes[i + 1] - notes[i]`
pub fn intervals(notes: &[i32]) -> Vec<i64> {
    notes
        .windows(2)
        .map(|pair| i64::from(pair[1]) - i64::from(pair[0]))
        .collect()
}

/// Count of distinct key numbers
pub fn unique_count(notes: &[i32]) -> usize {
    notes.iter().collect::<HashSet<_>>().len()
}

/// Interval statistics; the empty record when fewer than two notes
pub fn analyze_intervals(notes: &[i32]) -> IntervalStats {
    if notes.len() < 2 {
        return IntervalStats::default();
    }

    let diffs = intervals(notes);
    let as_f64: Vec<f64> = diffs.iter().map(|&d| d as f64).collect();

    let mut stats = IntervalStats {
        mean_interval: mean(&as_f64),
        ..IntervalStats::default()
    };
    for d in &diffs {
        match d.signum() {
            1 => stats.ascending_steps += 1,
            -1 => stats.descending_steps += 1,
            _ => stats.repeated_notes += 1,
        }
    }
    stats
}

/// Complexity in [0, 1]: half note diversity, half capped interval variance.
/// 0.0 when fewer than two notes.
pub fn compute_complexity(notes: &[i32]) -> f64 {
    if notes.len() < 2 {
        return 0.0;
    }

    let unique_ratio = unique_count(notes) as f64 / notes.len() as f64;
    let diffs: Vec<f64> = intervals(notes).into_iter().map(|d| d as f64).collect();
    let interval_variance = population_variance(&diffs);

    0.5 * unique_ratio + 0.5 * (interval_variance / INTERVAL_VARIANCE_SCALE).min(1.0)
}
