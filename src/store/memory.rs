//! In-memory note store with JSON snapshots
//!
//! Snapshots are a convenience for the CLI: written in one go with no
//! journaling, so a crash mid-write can lose the file.

use super::traits::{CachedAnalysis, NoteStore, SongId};
use super::StoreError;
use crate::model::{NoteEvent, Song, UserHistory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// HashMap-backed store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    /// Note history per user
    users: HashMap<String, UserHistory>,

    /// Saved songs by id
    songs: BTreeMap<SongId, Song>,

    /// Last assigned song id
    last_song_id: SongId,

    /// Analytics cache rows in insertion order
    analytics: Vec<CachedAnalysis>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot; a missing file yields an empty store
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("No snapshot at {:?}, starting empty", path);
            return Ok(Self::new());
        }

        let data = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let store: MemoryStore =
            serde_json::from_str(&data).map_err(|e| StoreError::json(path, e))?;

        log::info!(
            "Loaded snapshot: {} users, {} songs",
            store.user_count(),
            store.songs.len()
        );
        Ok(store)
    }

    /// Write a snapshot, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let data = serde_json::to_string_pretty(self).map_err(|e| StoreError::json(path, e))?;
        fs::write(path, data).map_err(|e| StoreError::io(path, e))?;

        log::debug!("Snapshot written to {:?}", path);
        Ok(())
    }

    /// Number of users seen
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// History for a user, if any notes were recorded
    pub fn history(&self, user_id: &str) -> Option<&UserHistory> {
        self.users.get(user_id)
    }
}

impl NoteStore for MemoryStore {
    fn record_note(&mut self, event: NoteEvent) -> Result<(), StoreError> {
        if event.user_id.is_empty() {
            return Err(StoreError::InvalidEvent("empty user_id".to_string()));
        }
        if !event.velocity.is_finite() {
            return Err(StoreError::InvalidEvent(format!(
                "non-finite velocity for key {}",
                event.key_number
            )));
        }

        if !self.users.contains_key(&event.user_id) {
            log::debug!("New user: {}", event.user_id);
        }
        self.users
            .entry(event.user_id.clone())
            .or_default()
            .push(event);
        Ok(())
    }

    fn recent_notes(&self, user_id: &str, limit: usize) -> Vec<i32> {
        self.users
            .get(user_id)
            .map(|h| h.recent(limit))
            .unwrap_or_default()
    }

    fn all_notes(&self, user_id: &str) -> Vec<i32> {
        self.users
            .get(user_id)
            .map(UserHistory::all_ascending)
            .unwrap_or_default()
    }

    fn save_song(&mut self, song: Song) -> Result<SongId, StoreError> {
        if song.user_id.is_empty() {
            return Err(StoreError::InvalidEvent("song without user_id".to_string()));
        }

        self.users.entry(song.user_id.clone()).or_default();
        self.last_song_id += 1;
        let id = self.last_song_id;
        self.songs.insert(id, song);
        Ok(id)
    }

    fn song(&self, song_id: SongId) -> Option<&Song> {
        self.songs.get(&song_id)
    }

    fn song_count(&self, user_id: &str) -> usize {
        self.songs.values().filter(|s| s.user_id == user_id).count()
    }

    fn cache_analysis(
        &mut self,
        user_id: &str,
        analysis_type: &str,
        results: Value,
    ) -> Result<(), StoreError> {
        self.analytics.push(CachedAnalysis {
            user_id: user_id.to_string(),
            analysis_type: analysis_type.to_string(),
            results,
            updated_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    fn cached_analyses(&self, user_id: &str) -> Vec<&CachedAnalysis> {
        self.analytics
            .iter()
            .filter(|row| row.user_id == user_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_creation() {
        let store = MemoryStore::new();
        assert_eq!(store.user_count(), 0);
        assert!(store.all_notes("nobody").is_empty());
        assert_eq!(store.song_count("nobody"), 0);
    }

    #[test]
    fn test_record_and_read_notes() {
        let mut store = MemoryStore::new();
        for (i, key) in [60, 62, 64, 65].into_iter().enumerate() {
            store
                .record_note(NoteEvent::new("alice", key, 0.8, i as i64))
                .unwrap();
        }
        store.record_note(NoteEvent::new("bob", 40, 0.8, 0)).unwrap();

        assert_eq!(store.user_count(), 2);
        assert_eq!(store.all_notes("alice"), vec![60, 62, 64, 65]);
        assert_eq!(store.recent_notes("alice", 3), vec![62, 64, 65]);
        assert_eq!(store.all_notes("bob"), vec![40]);
    }

    #[test]
    fn test_reject_empty_user() {
        let mut store = MemoryStore::new();
        let err = store.record_note(NoteEvent::new("", 60, 0.8, 0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEvent(_)));
    }

    #[test]
    fn test_song_ids_are_sequential() {
        let mut store = MemoryStore::new();
        let first = store.save_song(Song::new("u", "a", vec![60])).unwrap();
        let second = store.save_song(Song::new("u", "b", vec![62])).unwrap();
        store.save_song(Song::new("v", "c", vec![64])).unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(store.song_count("u"), 2);
        assert_eq!(store.song(2).unwrap().song_name, "b");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("store.json");

        let mut store = MemoryStore::new();
        store.record_note(NoteEvent::new("u", 60, 0.8, 1)).unwrap();
        store.save_song(Song::new("u", "tune", vec![60, 62])).unwrap();
        store
            .cache_analysis("u", "song_analysis", serde_json::json!({"x": 1}))
            .unwrap();
        store.save(&path).unwrap();

        let mut loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.all_notes("u"), vec![60]);
        assert_eq!(loaded.song_count("u"), 1);
        assert_eq!(loaded.cached_analyses("u").len(), 1);

        // id sequence continues after reload
        let next = loaded.save_song(Song::new("u", "again", vec![])).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = MemoryStore::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_load_corrupt_snapshot_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            MemoryStore::load(&path),
            Err(StoreError::Json { .. })
        ));
    }
}
