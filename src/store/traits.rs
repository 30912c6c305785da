//! Storage contract used by the analytics pipeline

use super::StoreError;
use crate::model::{NoteEvent, Song};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier assigned to a saved song, sequential from 1
pub type SongId = u64;

/// Per-user note and song storage
///
/// Note sequences come back in chronological order, most recent last.
pub trait NoteStore {
    /// Record a played note, creating the user on first sight
    fn record_note(&mut self, event: NoteEvent) -> Result<(), StoreError>;

    /// The `limit` most recent key numbers for `user_id`, oldest first
    fn recent_notes(&self, user_id: &str, limit: usize) -> Vec<i32>;

    /// Every key number for `user_id`, oldest first
    fn all_notes(&self, user_id: &str) -> Vec<i32>;

    /// Persist a song and return its id
    fn save_song(&mut self, song: Song) -> Result<SongId, StoreError>;

    /// Saved song by id
    fn song(&self, song_id: SongId) -> Option<&Song>;

    /// Number of songs saved by `user_id`
    fn song_count(&self, user_id: &str) -> usize;

    /// Store a computed result as an opaque blob
    fn cache_analysis(
        &mut self,
        user_id: &str,
        analysis_type: &str,
        results: Value,
    ) -> Result<(), StoreError>;

    /// Cached results for `user_id`, oldest first
    fn cached_analyses(&self, user_id: &str) -> Vec<&CachedAnalysis>;
}

/// An analytics cache row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub user_id: String,
    pub analysis_type: String,
    pub results: Value,
    /// RFC 3339 timestamp of insertion
    pub updated_at: String,
}
