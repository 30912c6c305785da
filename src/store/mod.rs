//! Note and song storage
//!
//! The analytics engine itself keeps no state; this is where played notes,
//! saved songs and cached analysis blobs live between calls.

mod error;
mod memory;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use traits::{CachedAnalysis, NoteStore, SongId};
