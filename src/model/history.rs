use super::NoteEvent;
use serde::{Deserialize, Serialize};

/// Note events played by one user
///
/// Events may arrive out of order; they are kept sorted by timestamp on
/// insert, with arrival order preserved for equal timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<NoteEvent>", into = "Vec<NoteEvent>")]
pub struct UserHistory {
    events: Vec<NoteEvent>,
}

impl From<Vec<NoteEvent>> for UserHistory {
    fn from(mut events: Vec<NoteEvent>) -> Self {
        // stable: equal timestamps keep their stored order
        events.sort_by_key(|e| e.timestamp);
        Self { events }
    }
}

impl From<UserHistory> for Vec<NoteEvent> {
    fn from(history: UserHistory) -> Self {
        history.events
    }
}

impl UserHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event after every event with the same or an earlier timestamp
    pub fn push(&mut self, event: NoteEvent) {
        let at = self
            .events
            .partition_point(|e| e.timestamp <= event.timestamp);
        self.events.insert(at, event);
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if no events were recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whole history as key numbers, oldest first
    pub fn all_ascending(&self) -> Vec<i32> {
        self.events.iter().map(|e| e.key_number).collect()
    }

    /// The `limit` most recent key numbers, oldest first (most recent last)
    pub fn recent(&self, limit: usize) -> Vec<i32> {
        let start = self.events.len().saturating_sub(limit);
        self.events[start..].iter().map(|e| e.key_number).collect()
    }
}
