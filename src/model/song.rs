use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key the melody analysis is stored under
pub const ANALYSIS_METADATA_KEY: &str = "ml_analysis";

/// A named note sequence saved by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Owner of the song
    pub user_id: String,

    /// Display name
    pub song_name: String,

    /// Key numbers in play order
    pub notes: Vec<i32>,

    /// Free-form caller metadata (analysis gets embedded here on save)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Song {
    /// Create a song with empty metadata
    pub fn new(user_id: impl Into<String>, song_name: impl Into<String>, notes: Vec<i32>) -> Self {
        Self {
            user_id: user_id.into(),
            song_name: song_name.into(),
            notes,
            metadata: Map::new(),
        }
    }

    /// Analysis blob previously embedded by a save, if any
    pub fn embedded_analysis(&self) -> Option<&Value> {
        self.metadata.get(ANALYSIS_METADATA_KEY)
    }
}
