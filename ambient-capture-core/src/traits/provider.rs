use std::sync::Arc;

use crate::models::error::CaptureError;

/// Callback invoked when an audio buffer is available.
///
/// Parameters:
/// - `samples`: Interleaved f32 samples in the input's native layout.
/// - `sample_rate`: The actual sample rate of the delivered audio.
/// - `channels`: Number of channels (1 = mono, 2 = stereo interleaved).
pub type AudioBufferCallback = Arc<dyn Fn(&[f32], f64, u16) + Send + Sync + 'static>;

/// Interface for platform-specific audio input sources.
///
/// Implemented by `CpalMicCapture` (desktop) and by scripted providers in
/// tests that simulate buffer delivery.
pub trait CaptureProvider: Send + Sync {
    /// Whether this capture source is currently available.
    fn is_available(&self) -> bool;

    /// Start capturing audio, delivering buffers via `callback`.
    ///
    /// The callback fires on a dedicated audio context — keep processing
    /// minimal. On failure, no capture resources may remain allocated.
    fn start(&mut self, callback: AudioBufferCallback) -> Result<(), CaptureError>;

    /// Stop capturing and release resources.
    fn stop(&mut self) -> Result<(), CaptureError>;
}
