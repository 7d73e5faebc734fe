//! # ambient-capture-core
//!
//! Platform-agnostic ambient sound capture core.
//!
//! Provides permission gating, audio session lifecycle, level metering,
//! sample buffering, WAV I/O, and recording orchestration. Platform
//! backends (cpal desktop, future mobile hosts) implement the capability
//! traits and plug into the generic `SoundRecorder`.
//!
//! ## Architecture
//!
//! ```text
//! ambient-capture-core (this crate)
//! ├── traits/       ← CaptureProvider, PermissionProvider, AudioSessionController, CaptureDelegate
//! ├── models/       ← CaptureError, CaptureState, CaptureConfig, SoundRecording
//! ├── processing/   ← level meter, SampleFeed, WAV header generation
//! ├── recorder      ← SoundRecorder (generic orchestrator)
//! └── storage/      ← WavFileWriter, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod recorder;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::CaptureConfig;
pub use models::diagnostics::CaptureDiagnostics;
pub use models::error::CaptureError;
pub use models::recording::{SoundClass, SoundRecording};
pub use models::state::CaptureState;
pub use processing::sample_feed::SampleFeed;
pub use recorder::SoundRecorder;
pub use storage::metadata::RecordingMetadata;
pub use storage::wav_writer::WavFileWriter;
pub use traits::delegate::CaptureDelegate;
pub use traits::permission::{PermissionProvider, PermissionStatus};
pub use traits::provider::{AudioBufferCallback, CaptureProvider};
pub use traits::session::AudioSessionController;
