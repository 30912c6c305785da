//! Analytics orchestration: note processing, song saving, user reports

use super::config::AnalyticsConfig;
use crate::analysis::{MelodyAnalysis, PatternAnalyzer, Prediction};
use crate::model::{now_millis, NoteEvent, Song, ANALYSIS_METADATA_KEY};
use crate::store::{NoteStore, SongId};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Analysis type recorded in the analytics cache on song save
pub const SONG_ANALYSIS_TYPE: &str = "song_analysis";

/// A note as submitted by a caller; missing fields get defaults
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRequest {
    pub user_id: String,
    pub key_number: i32,
    pub velocity: Option<f32>,
    pub timestamp: Option<i64>,
}

/// Result of processing one played note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteOutcome {
    pub key_number: i32,
    pub frequency_hz: f32,
    #[serde(rename = "ml_prediction")]
    pub prediction: Prediction,
    pub recent_notes_count: usize,
    /// RFC 3339 processing time
    pub processed_at: String,
}

/// Result of saving a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSong {
    pub song_id: SongId,
    pub analysis: MelodyAnalysis,
}

/// Whole-history report for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub user_id: String,
    pub total_notes_played: usize,
    pub songs_saved: usize,
    pub overall_analysis: MelodyAnalysis,
}

/// Main analytics pipeline
///
/// Owns its analyzer and store, so independent pipelines never share state.
pub struct AnalyticsPipeline<A: PatternAnalyzer, S: NoteStore> {
    config: AnalyticsConfig,
    analyzer: A,
    store: S,
}

impl<A: PatternAnalyzer, S: NoteStore> AnalyticsPipeline<A, S> {
    /// Create a new analytics pipeline
    pub fn new(config: AnalyticsConfig, analyzer: A, store: S) -> Self {
        Self {
            config,
            analyzer,
            store,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, e.g. to snapshot it
    pub fn into_store(self) -> S {
        self.store
    }

    /// Fill in defaults for a caller-submitted note
    pub fn event_from_request(&self, request: NoteRequest) -> NoteEvent {
        NoteEvent {
            user_id: request.user_id,
            key_number: request.key_number,
            velocity: request.velocity.unwrap_or(self.config.default_velocity),
            timestamp: request.timestamp.unwrap_or_else(now_millis),
        }
    }

    /// Record a played note and predict what the user plays next
    pub fn process_note(&mut self, event: NoteEvent) -> Result<NoteOutcome> {
        let key_number = event.key_number;
        let frequency_hz = event.frequency_hz();
        let user_id = event.user_id.clone();

        self.store
            .record_note(event)
            .with_context(|| format!("Failed to record note {} for {}", key_number, user_id))?;

        let recent = self.store.recent_notes(&user_id, self.config.recent_window);
        let prediction = self.analyzer.predict_next(&recent);

        log::debug!(
            "{}: key {} ({:.1} Hz), {} recent notes, {} candidates",
            user_id,
            key_number,
            frequency_hz,
            recent.len(),
            prediction.candidates.len()
        );

        Ok(NoteOutcome {
            key_number,
            frequency_hz,
            prediction,
            recent_notes_count: recent.len(),
            processed_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Analyze a song, embed the analysis in its metadata and save it
    pub fn save_song(&mut self, mut song: Song) -> Result<SavedSong> {
        log::info!(
            "Saving song '{}' for {} ({} notes)",
            song.song_name,
            song.user_id,
            song.notes.len()
        );

        let analysis = self.analyzer.analyze_melody(&song.notes);
        let blob = serde_json::to_value(&analysis).context("Failed to serialize analysis")?;

        song.metadata
            .insert(ANALYSIS_METADATA_KEY.to_string(), blob.clone());
        let user_id = song.user_id.clone();

        let song_id = self
            .store
            .save_song(song)
            .with_context(|| format!("Failed to save song for {}", user_id))?;

        if self.config.cache_song_analysis {
            self.store
                .cache_analysis(&user_id, SONG_ANALYSIS_TYPE, blob)
                .context("Failed to cache song analysis")?;
        }

        Ok(SavedSong { song_id, analysis })
    }

    /// Analyze everything a user has played so far
    pub fn user_analytics(&self, user_id: &str) -> UserAnalytics {
        let notes = self.store.all_notes(user_id);
        let songs_saved = self.store.song_count(user_id);

        log::info!(
            "Analytics for {}: {} notes, {} songs",
            user_id,
            notes.len(),
            songs_saved
        );

        UserAnalytics {
            user_id: user_id.to_string(),
            total_notes_played: notes.len(),
            songs_saved,
            overall_analysis: self.analyzer.analyze_melody(&notes),
        }
    }
}

impl<A: PatternAnalyzer + Sync, S: NoteStore> AnalyticsPipeline<A, S> {
    /// Analyze many songs in parallel; output order matches input
    pub fn analyze_batch(&self, songs: &[Song]) -> Vec<MelodyAnalysis> {
        log::info!("Analyzing {} songs", songs.len());
        // borrow only the analyzer so the store need not be Sync
        let analyzer = &self.analyzer;
        songs
            .par_iter()
            .map(|song| analyzer.analyze_melody(&song.notes))
            .collect()
    }
}
