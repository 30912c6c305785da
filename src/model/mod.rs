//! Value types for note events, songs and per-user history
//!
//! A note sequence is a plain `&[i32]` of key numbers in play order;
//! these types carry it together with who played it and when.

mod history;
mod note;
mod song;

pub use history::UserHistory;
pub use note::{frequency_hz, now_millis, NoteEvent, DEFAULT_VELOCITY};
pub use song::{Song, ANALYSIS_METADATA_KEY};
