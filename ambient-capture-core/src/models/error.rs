use thiserror::Error;

/// Errors that can occur while recording ambient sound.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("a recording session is already open")]
    AlreadyRecording,

    #[error("audio engine creation failed: {0}")]
    EngineCreationFailed(String),

    #[error("audio input unavailable")]
    InputUnavailable,

    #[error("audio session configuration failed: {0}")]
    SessionConfigurationFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
