use serde::{Deserialize, Serialize};

/// Velocity assumed when a caller does not supply one
pub const DEFAULT_VELOCITY: f32 = 0.8;

/// Key number of A4 (440 Hz)
const A4_KEY: i32 = 69;

/// A single key press played by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// User who played the note
    pub user_id: String,

    /// Key number (pitch). Usually 0-127 but not bounded
    pub key_number: i32,

    /// Key velocity in [0, 1]
    #[serde(default = "default_velocity")]
    pub velocity: f32,

    /// Milliseconds since the UNIX epoch
    pub timestamp: i64,
}

fn default_velocity() -> f32 {
    DEFAULT_VELOCITY
}

impl NoteEvent {
    /// Create an event with an explicit timestamp
    pub fn new(user_id: impl Into<String>, key_number: i32, velocity: f32, timestamp: i64) -> Self {
        Self {
            user_id: user_id.into(),
            key_number,
            velocity,
            timestamp,
        }
    }

    /// Equal-tempered frequency of this key, A4 = key 69 = 440 Hz
    pub fn frequency_hz(&self) -> f32 {
        frequency_hz(self.key_number)
    }
}

/// Equal-tempered frequency for a key number
///
/// Keys far outside the piano saturate to 0.0 or infinity.
pub fn frequency_hz(key_number: i32) -> f32 {
    let semitones = f64::from(key_number) - f64::from(A4_KEY);
    (440.0 * 2.0_f64.powf(semitones / 12.0)) as f32
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
