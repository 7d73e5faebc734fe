use crate::models::error::CaptureError;
use crate::models::recording::SoundRecording;
use crate::models::state::CaptureState;

/// Event delegate for recorder notifications.
///
/// Methods are called from the recorder's worker threads, not the UI
/// thread. Implementations should marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes, including periodic duration
    /// updates while recording.
    fn on_state_changed(&self, state: &CaptureState);

    /// Called periodically with the current audio level in [0, 1].
    fn on_level(&self, level: f32);

    /// Called when a recording survives the minimum-duration gate and its
    /// file has been finalized.
    fn on_recording_finished(&self, recording: &SoundRecording);

    /// Called when an error occurs during capture.
    fn on_error(&self, error: &CaptureError);
}
