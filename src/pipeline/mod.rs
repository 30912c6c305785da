//! Analytics orchestration around the melody analyzer

pub mod config;
pub mod pipeline;

pub use config::{AnalyticsConfig, DEFAULT_RECENT_WINDOW};
pub use pipeline::{AnalyticsPipeline, NoteOutcome, NoteRequest, SavedSong, UserAnalytics};
