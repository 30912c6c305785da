//! Analytics pipeline configuration

use crate::model::DEFAULT_VELOCITY;

/// Recent notes fed to the next-note predictor
pub const DEFAULT_RECENT_WINDOW: usize = 20;

/// Configuration for the analytics pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// How many of a user's most recent notes the predictor sees
    pub recent_window: usize,

    /// Velocity used for requests that omit one
    pub default_velocity: f32,

    /// Whether saved-song analyses are also written to the analytics cache
    pub cache_song_analysis: bool,
}

impl AnalyticsConfig {
    /// Create a configuration with the default window and caching enabled
    pub fn new() -> Self {
        Self {
            recent_window: DEFAULT_RECENT_WINDOW,
            default_velocity: DEFAULT_VELOCITY,
            cache_song_analysis: true,
        }
    }

    /// Set the predictor window
    pub fn with_recent_window(mut self, window: usize) -> Self {
        self.recent_window = window;
        self
    }

    /// Set the fallback velocity
    pub fn with_default_velocity(mut self, velocity: f32) -> Self {
        self.default_velocity = velocity;
        self
    }

    /// Enable or disable the analytics cache row on song save
    pub fn with_song_analysis_cache(mut self, enable: bool) -> Self {
        self.cache_song_analysis = enable;
        self
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::new()
    }
}
