use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of an ambient sound.
///
/// Recordings are created as `Unknown`; an external classifier fills in
/// the final class after the capture session has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundClass {
    Wind,
    Bird,
    Rain,
    Stream,
    Leaves,
    Unknown,
}

impl SoundClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::Bird => "bird",
            Self::Rain => "rain",
            Self::Stream => "stream",
            Self::Leaves => "leaves",
            Self::Unknown => "unknown",
        }
    }
}

/// Immutable descriptor of a persisted recording.
///
/// Serializable for JSON export to downstream storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundRecording {
    pub id: Uuid,
    pub sound_class: SoundClass,
    pub duration_secs: f64,
    pub recorded_at: DateTime<Utc>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub file_path: Option<String>,
    pub confidence: f32,
}

impl SoundRecording {
    /// Creates a descriptor for a finished, not-yet-classified recording.
    pub fn unclassified(duration_secs: f64, file_path: &Path) -> Self {
        Self {
            id: Uuid::new_v4(),
            sound_class: SoundClass::Unknown,
            duration_secs,
            recorded_at: Utc::now(),
            location_name: None,
            latitude: None,
            longitude: None,
            file_path: Some(file_path.to_string_lossy().to_string()),
            confidence: 0.0,
        }
    }
}
