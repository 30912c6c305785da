//! Melody analysis layer
//!
//! This module provides melody statistics and next-note prediction through
//! a trait-based abstraction. `MelodyAnalyzer` is the stateless engine;
//! `CachedAnalyzer` adds optional memoization on top of any analyzer.

mod cached;
mod melody;
mod predict;
mod stats;
mod traits;

pub use cached::{CachedAnalyzer, SequenceKey, DEFAULT_CACHE_CAPACITY};
pub use melody::{MelodyAnalyzer, DEFAULT_CONFIDENCE, DEFAULT_TOP_K};
pub use predict::TransitionTable;
pub use stats::{analyze_intervals, compute_complexity, intervals};
pub use traits::{Candidate, IntervalStats, MelodyAnalysis, PatternAnalyzer, Prediction};
