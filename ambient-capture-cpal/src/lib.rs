//! # ambient-capture-cpal
//!
//! Desktop backend for ambient-capture-kit, built on cpal.
//!
//! Implements the core crate's capability traits against the host's
//! default input device:
//! - `CpalMicCapture` → `CaptureProvider`
//! - `HostMicPermission` → `PermissionProvider`
//! - `HostAudioSession` → `AudioSessionController`

pub mod mic;
pub mod permission;
pub mod session;

pub use mic::CpalMicCapture;
pub use permission::HostMicPermission;
pub use session::HostAudioSession;

use ambient_capture_core::models::config::CaptureConfig;
use ambient_capture_core::models::error::CaptureError;
use ambient_capture_core::recorder::SoundRecorder;

/// Recorder wired to the desktop backend.
pub type DesktopRecorder = SoundRecorder<CpalMicCapture, HostAudioSession, HostMicPermission>;

/// Construct a recorder for the host's default microphone.
pub fn desktop_recorder(config: CaptureConfig) -> Result<DesktopRecorder, CaptureError> {
    let mic = CpalMicCapture::with_buffer_frames(config.buffer_frames);
    SoundRecorder::new(mic, HostAudioSession::new(), HostMicPermission::new(), config)
}
