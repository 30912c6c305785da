//! Piano Analytics - melody statistics and next-note prediction
//!
//! This library analyzes sequences of played piano keys: interval and
//! complexity statistics over a whole melody, and a bigram model that
//! ranks likely next notes from a user's recent playing.

pub mod analysis;
pub mod model;
pub mod pipeline;
pub mod store;

pub use analysis::{CachedAnalyzer, MelodyAnalyzer, PatternAnalyzer};
pub use pipeline::{AnalyticsConfig, AnalyticsPipeline};
